//! Record store boundary
//!
//! A store yields chats and, per chat, the raw records to decode. The
//! decoder only ever sees [`NodeRecord::payload`]; the other fields pass
//! through to presentation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::StoreResult;

pub mod sqlite;

pub use sqlite::SqliteStore;

/// A chat as listed by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSummary {
    /// Chat identifier.
    pub id: String,
    /// Chat topic, when one was set.
    pub topic: Option<String>,
}

/// One stored record of a chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    /// Record identifier.
    pub id: String,
    /// Raw binary payload.
    pub payload: Vec<u8>,
    /// Author identifier, if recorded.
    pub author: Option<String>,
    /// Creation time in 100-ns ticks (see [`crate::time`]).
    pub created_at: i64,
}

/// Read-only access to chats and their records.
pub trait RecordStore {
    /// Chats that are not deleted, newest first.
    fn list_chats(&self) -> StoreResult<Vec<ChatSummary>>;

    /// Whether a non-deleted chat with this id exists. Ids match
    /// case-insensitively.
    fn chat_exists(&self, chat_id: &str) -> StoreResult<bool>;

    /// Records of a chat ordered by creation time.
    fn chat_records(&self, chat_id: &str) -> StoreResult<Vec<NodeRecord>>;
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    chats: Vec<ChatSummary>,
    records: HashMap<String, Vec<NodeRecord>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chat. Chats added later list first.
    pub fn add_chat(&mut self, id: impl Into<String>, topic: Option<&str>) {
        self.chats.insert(
            0,
            ChatSummary {
                id: id.into(),
                topic: topic.map(str::to_string),
            },
        );
    }

    /// Append a record to a chat.
    pub fn add_record(&mut self, chat_id: &str, record: NodeRecord) {
        self.records
            .entry(chat_id.to_ascii_lowercase())
            .or_default()
            .push(record);
    }
}

impl RecordStore for MemoryStore {
    fn list_chats(&self) -> StoreResult<Vec<ChatSummary>> {
        Ok(self.chats.clone())
    }

    fn chat_exists(&self, chat_id: &str) -> StoreResult<bool> {
        Ok(self
            .chats
            .iter()
            .any(|chat| chat.id.eq_ignore_ascii_case(chat_id)))
    }

    fn chat_records(&self, chat_id: &str) -> StoreResult<Vec<NodeRecord>> {
        let mut records = self
            .records
            .get(&chat_id.to_ascii_lowercase())
            .cloned()
            .unwrap_or_default();
        records.sort_by_key(|record| record.created_at);
        Ok(records)
    }
}
