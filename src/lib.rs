//! Chatlog – an inspector for MessagePack-encoded chat histories
//!
//! This crate reads chat records from the chat application's SQLite store and
//! decodes their binary payloads:
//! - Tagged-union messages `[tag, body]` whose bodies may be written either as
//!   integer-keyed mappings or as positional sequences
//! - Recursive decoding of assistant spans, nested function calls and results
//! - Recovery of payloads that hold several concatenated values
//! - Per-record fault isolation, with text and JSON presentation

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// MessagePack boundary: single-value and streaming decode
pub mod codec;

/// Inspector configuration
pub mod config;

/// Error types
pub mod error;

/// Per-record inspection of a chat
pub mod inspect;

/// Message schema, node tree and recursive decoder
pub mod message;

/// Per-payload pipeline with streaming recovery
pub mod payload;

/// Text and JSON output
pub mod render;

/// Record store boundary and SQLite backend
pub mod store;

/// Tick timestamp conversion
pub mod time;

/// Generic decoded values
pub mod value;

// Re-export key types for convenience
pub use config::{InspectorConfig, OutputFormat};
pub use error::{ChatlogError, CodecError, PayloadError, Result, StoreError};
pub use inspect::{ChatTranscript, RecordReport, inspect_chat, inspect_records};
pub use message::{ChatNode, MessageKind, decode};
pub use payload::{DecodeMode, PayloadDecode, decode_payload};
pub use store::{ChatSummary, MemoryStore, NodeRecord, RecordStore, SqliteStore};
pub use value::{Key, Value};

/// Current version of chatlog
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
