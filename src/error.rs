//! Error types for chat log inspection
//!
//! Domain errors use thiserror. Decode-level errors are caught at the
//! per-record boundary and kept in the record's report; store and
//! configuration errors propagate to the caller as [`ChatlogError`].

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error
#[derive(Debug, Error)]
pub enum ChatlogError {
    /// Record store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Binary format errors reported by the MessagePack boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// No bytes to decode
    #[error("empty payload")]
    Empty,

    /// A complete value was decoded but bytes remain after it
    #[error("extra data: {remaining} bytes remain after the first value ({consumed} bytes consumed)")]
    TrailingData {
        /// Bytes consumed by the first value
        consumed: usize,
        /// Bytes left undecoded
        remaining: usize,
    },

    /// The bytes do not form a valid value
    #[error("malformed data at offset {offset}: {detail}")]
    Malformed {
        /// Byte offset where the failing value started
        offset: usize,
        /// Description reported by the decoder
        detail: String,
    },
}

impl CodecError {
    /// Whether this error only signals concatenated values
    pub fn is_trailing_data(&self) -> bool {
        matches!(self, CodecError::TrailingData { .. })
    }
}

/// Convenience result alias for codec operations
pub type CodecResult<T> = std::result::Result<T, CodecError>;

/// A payload that could not be fully decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to decode payload of {length} bytes after {decoded} value(s): {source}")]
pub struct PayloadError {
    /// Length of the raw payload in bytes
    pub length: usize,
    /// Number of values decoded before the failure
    pub decoded: usize,
    /// Underlying codec error
    #[source]
    pub source: CodecError,
}

/// Record store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing database could not be opened
    #[error("cannot open database {path}: {source}")]
    Open {
        /// Database path
        path: PathBuf,
        /// Driver error
        #[source]
        source: rusqlite::Error,
    },

    /// Chat not present (or soft-deleted)
    #[error("Chat '{0}' not found")]
    ChatNotFound(String),

    /// Query failed
    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

/// Convenience result alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type using ChatlogError
pub type Result<T> = std::result::Result<T, ChatlogError>;
