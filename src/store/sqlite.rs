//! SQLite chat database
//!
//! Reads the `Chats` and `Nodes` tables written by the chat application. The
//! connection is opened read-only and never writes.

use rusqlite::{Connection, OpenFlags, params};
use std::path::Path;

use super::{ChatSummary, NodeRecord, RecordStore};
use crate::error::{StoreError, StoreResult};

const LIST_CHATS: &str =
    "SELECT Id, Topic FROM Chats WHERE IsDeleted = 0 ORDER BY CreatedAt DESC";

const CHAT_EXISTS: &str =
    "SELECT COUNT(*) FROM Chats WHERE Id = ?1 COLLATE NOCASE AND IsDeleted = 0";

const CHAT_RECORDS: &str = "SELECT Id, Payload, Author, CreatedAt FROM Nodes \
     WHERE ChatContextId = ?1 COLLATE NOCASE ORDER BY CreatedAt";

const CHAT_RECORDS_LIVE: &str = "SELECT Id, Payload, Author, CreatedAt FROM Nodes \
     WHERE ChatContextId = ?1 COLLATE NOCASE AND IsDeleted = 0 ORDER BY CreatedAt";

/// Read-only store over a chat database file.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    hide_deleted_nodes: bool,
}

impl SqliteStore {
    /// Open `path` read-only.
    ///
    /// With `hide_deleted_nodes`, soft-deleted records are left out of
    /// [`RecordStore::chat_records`].
    pub fn open(path: impl AsRef<Path>, hide_deleted_nodes: bool) -> StoreResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        // A read-only open succeeds lazily; touch the schema so a file that
        // is not a database fails here.
        conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })
        .map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!("Opened chat database {:?}", path);

        Ok(Self {
            conn,
            hide_deleted_nodes,
        })
    }
}

impl RecordStore for SqliteStore {
    fn list_chats(&self) -> StoreResult<Vec<ChatSummary>> {
        let mut stmt = self.conn.prepare(LIST_CHATS)?;
        let chats = stmt
            .query_map([], |row| {
                Ok(ChatSummary {
                    id: row.get(0)?,
                    topic: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(chats)
    }

    fn chat_exists(&self, chat_id: &str) -> StoreResult<bool> {
        let count: i64 = self
            .conn
            .query_row(CHAT_EXISTS, params![chat_id], |row| row.get(0))?;
        Ok(count > 0)
    }

    fn chat_records(&self, chat_id: &str) -> StoreResult<Vec<NodeRecord>> {
        let sql = if self.hide_deleted_nodes {
            CHAT_RECORDS_LIVE
        } else {
            CHAT_RECORDS
        };

        let mut stmt = self.conn.prepare(sql)?;
        let records = stmt
            .query_map(params![chat_id], |row| {
                Ok(NodeRecord {
                    id: row.get(0)?,
                    payload: row.get::<_, Option<Vec<u8>>>(1)?.unwrap_or_default(),
                    author: row.get(2)?,
                    created_at: row.get::<_, Option<i64>>(3)?.unwrap_or_default(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Loaded {} records for chat {}", records.len(), chat_id);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use std::path::PathBuf;

    fn fixture(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("chat.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE Chats (Id TEXT PRIMARY KEY, Topic TEXT, CreatedAt INTEGER, IsDeleted INTEGER);
             CREATE TABLE Nodes (ChatContextId TEXT, Id TEXT, Payload BLOB, Author TEXT, CreatedAt INTEGER, IsDeleted INTEGER);
             INSERT INTO Chats VALUES ('aaaa', 'First', 1, 0);
             INSERT INTO Chats VALUES ('bbbb', NULL, 2, 0);
             INSERT INTO Chats VALUES ('gone', 'Deleted', 3, 1);
             INSERT INTO Nodes VALUES ('aaaa', 'n2', X'01', 'assistant', 20, 0);
             INSERT INTO Nodes VALUES ('aaaa', 'n1', X'02', 'user', 10, 0);
             INSERT INTO Nodes VALUES ('aaaa', 'n3', NULL, NULL, 30, 1);",
        )
        .unwrap();
        path
    }

    #[test]
    fn lists_live_chats_newest_first() {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(fixture(&dir), false).unwrap();

        let chats = store.list_chats().unwrap();
        assert_eq!(chats.len(), 2);
        assert_eq!(chats[0].id, "bbbb");
        assert_eq!(chats[0].topic, None);
        assert_eq!(chats[1].topic.as_deref(), Some("First"));
    }

    #[test]
    fn chat_lookup_ignores_case_and_deleted_chats() {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(fixture(&dir), false).unwrap();

        assert!(store.chat_exists("AAAA").unwrap());
        assert!(!store.chat_exists("gone").unwrap());
        assert!(!store.chat_exists("missing").unwrap());
    }

    #[test]
    fn records_are_ordered_and_optionally_filtered() {
        let dir = TempDir::new().unwrap();
        let path = fixture(&dir);

        let all = SqliteStore::open(&path, false).unwrap().chat_records("aaaa").unwrap();
        let ids: Vec<_> = all.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["n1", "n2", "n3"]);
        assert_eq!(all[0].payload, vec![0x02]);
        assert_eq!(all[0].author.as_deref(), Some("user"));
        assert!(all[2].payload.is_empty());

        let live = SqliteStore::open(&path, true).unwrap().chat_records("aaaa").unwrap();
        assert_eq!(live.len(), 2);
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let dir = TempDir::new().unwrap();
        let err = SqliteStore::open(dir.path().join("absent.db"), false).unwrap_err();
        assert!(matches!(err, StoreError::Open { .. }));
    }

    #[test]
    fn non_database_file_is_an_open_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"this is not a database file at all, just some text").unwrap();
        let err = SqliteStore::open(&path, false).unwrap_err();
        assert!(matches!(err, StoreError::Open { .. }));
    }
}
