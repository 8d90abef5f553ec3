//! Chat message model and decoder
//!
//! A stored chat message is a tagged union `[tag, body]`. Bodies, spans,
//! and function-call records may each be written either as an integer-keyed
//! mapping or as a positional sequence. This module turns either form into
//! the same normalized [`ChatNode`] tree.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use serde_json::{Map, Value as Json};

use crate::value::Value;

pub mod decode;
pub mod fields;
pub mod schema;
pub mod tagged;

pub use decode::{decode, decode_variant};
pub use fields::{BodyShape, FieldView};
pub use schema::{Field, MessageKind};
pub use tagged::TaggedUnion;

/// Normalized result of decoding one top-level value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatNode {
    /// System prompt.
    System {
        /// Prompt text.
        text: String,
    },
    /// Assistant reply made of ordered spans.
    Assistant(AssistantMessage),
    /// User prompt.
    User {
        /// Prompt text.
        prompt: String,
    },
    /// Action notice.
    Action {
        /// Action content text.
        content: String,
    },
    /// Standalone function-call record.
    FunctionCall(FunctionCallRecord),
    /// Known tag whose body has a shape the schema does not describe.
    Unrecognized {
        /// Variant selected by the tag.
        kind: MessageKind,
        /// Body as decoded.
        body: Value,
    },
    /// Tagged union with a tag outside the schema.
    UnknownTag {
        /// Raw tag.
        tag: i64,
        /// Body as decoded.
        body: Value,
    },
    /// Value that is not a tagged union at all.
    UnknownShape {
        /// Value as decoded.
        value: Value,
    },
}

/// Assistant reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssistantMessage {
    /// Spans in display order.
    pub spans: Vec<Span>,
    /// When generation started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<FixedOffset>>,
    /// When generation finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<FixedOffset>>,
    /// Token accounting reported by the model provider.
    pub usage: TokenUsage,
}

/// Token counters attached to an assistant reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TokenUsage {
    /// Prompt tokens.
    pub input: i64,
    /// Completion tokens.
    pub output: i64,
    /// Total as reported (the producer stores it as a float).
    pub total: f64,
}

impl TokenUsage {
    /// Whether any counter is set.
    pub fn is_empty(&self) -> bool {
        self.input == 0 && self.output == 0 && self.total == 0.0
    }
}

/// One span of an assistant reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Span {
    /// Markdown content, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Reasoning output, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    /// Function calls issued within this span, in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub function_calls: Vec<FunctionCallRecord>,
    /// Entries kept verbatim because their shape was not understood.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unrecognized: Vec<Value>,
}

/// Function-call record: calls and results are independent lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FunctionCallRecord {
    /// Display content attached to the record, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Calls in order.
    pub calls: Vec<CallEntry>,
    /// Results in order.
    pub results: Vec<ResultEntry>,
}

/// A single tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CallEntry {
    /// Function name.
    pub name: String,
    /// Arguments keyed by parameter name, in stored order.
    pub arguments: Map<String, Json>,
}

/// A single tool result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEntry {
    /// Result value, usually text.
    pub value: Value,
}
