//! Per-record inspection
//!
//! Decodes every record of a chat into a report. Decode faults stay inside
//! the report of the record that caused them; store faults propagate.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{ChatlogError, Result, StoreError};
use crate::payload::{PayloadDecode, decode_payload};
use crate::store::{NodeRecord, RecordStore};
use crate::time::ticks_to_datetime;

/// Decoded view of one stored record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordReport {
    /// Record identifier.
    pub id: String,
    /// Author identifier, if recorded.
    pub author: Option<String>,
    /// Raw creation time in 100-ns ticks.
    pub created_at: i64,
    /// Creation time, when the tick count is in range.
    pub time: Option<DateTime<Utc>>,
    /// Raw payload length in bytes.
    pub payload_length: usize,
    /// Decoded payload.
    #[serde(flatten)]
    pub decoded: PayloadDecode,
}

impl RecordReport {
    /// Decode a single record.
    pub fn from_record(record: &NodeRecord) -> Self {
        let decoded = decode_payload(&record.payload);
        if !decoded.is_complete() {
            tracing::debug!("Record {} decoded with errors", record.id);
        }

        Self {
            id: record.id.clone(),
            author: record.author.clone(),
            created_at: record.created_at,
            time: ticks_to_datetime(record.created_at),
            payload_length: record.payload.len(),
            decoded,
        }
    }
}

/// All records of one chat, decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatTranscript {
    /// Chat identifier as requested.
    pub chat_id: String,
    /// Reports in record order.
    pub records: Vec<RecordReport>,
}

impl ChatTranscript {
    /// Records whose payload did not decode completely.
    pub fn failures(&self) -> impl Iterator<Item = &RecordReport> {
        self.records
            .iter()
            .filter(|report| !report.decoded.is_complete())
    }
}

/// Decode a batch of records in order.
pub fn inspect_records(records: &[NodeRecord]) -> Vec<RecordReport> {
    records.iter().map(RecordReport::from_record).collect()
}

/// Decode every record of `chat_id`.
///
/// Fails with [`StoreError::ChatNotFound`] when the chat does not exist;
/// other store failures propagate unchanged.
pub fn inspect_chat(store: &dyn RecordStore, chat_id: &str) -> Result<ChatTranscript> {
    if !store.chat_exists(chat_id)? {
        return Err(ChatlogError::Store(StoreError::ChatNotFound(chat_id.to_string())));
    }

    let records = store.chat_records(chat_id)?;
    tracing::debug!("Inspecting {} records of chat {}", records.len(), chat_id);

    Ok(ChatTranscript {
        chat_id: chat_id.to_string(),
        records: inspect_records(&records),
    })
}
