//! Recursive decoder from generic values to [`ChatNode`] trees.
//!
//! Pure functions of their input. Shapes the schema does not describe
//! degrade to generic nodes carrying the raw value instead of failing.

use serde_json::{Map, Value as Json};

use super::fields::{BodyShape, FieldView};
use super::schema::{ASSISTANT_MIN_POSITIONAL_LEN, Field, MessageKind};
use super::tagged::TaggedUnion;
use super::{AssistantMessage, CallEntry, ChatNode, FunctionCallRecord, ResultEntry, Span, TokenUsage};
use crate::value::Value;

/// Decode one top-level value.
pub fn decode(value: &Value) -> ChatNode {
    match TaggedUnion::parse(value) {
        Some(union) => decode_variant(union.tag, union.body),
        None => ChatNode::UnknownShape {
            value: value.clone(),
        },
    }
}

/// Decode a union body for an explicit tag.
pub fn decode_variant(tag: i64, body: &Value) -> ChatNode {
    let Some(kind) = MessageKind::from_tag(tag) else {
        return ChatNode::UnknownTag {
            tag,
            body: body.clone(),
        };
    };

    let decoded = match kind {
        MessageKind::System => prompt_text(body, Field::SystemText).map(|text| ChatNode::System { text }),
        MessageKind::User => prompt_text(body, Field::UserPrompt).map(|prompt| ChatNode::User { prompt }),
        MessageKind::Action => action_content(body).map(|content| ChatNode::Action { content }),
        MessageKind::Assistant => assistant(body).map(ChatNode::Assistant),
        MessageKind::FunctionCall => function_call(body).map(ChatNode::FunctionCall),
    };

    decoded.unwrap_or_else(|| ChatNode::Unrecognized {
        kind,
        body: body.clone(),
    })
}

/// System and user bodies: a bare string, or a record whose field 0 is the text.
fn prompt_text(body: &Value, field: Field) -> Option<String> {
    if let Value::String(text) = body {
        return Some(text.clone());
    }
    FieldView::structured(body).map(|view| view.text(field))
}

fn action_content(body: &Value) -> Option<String> {
    let view = FieldView::new(body);
    match view.shape() {
        BodyShape::Mapping => Some(view.text(Field::ActionContent)),
        _ => None,
    }
}

fn assistant(body: &Value) -> Option<AssistantMessage> {
    let view = FieldView::structured(body)?;
    if view.shape() == BodyShape::Sequence && view.len() < ASSISTANT_MIN_POSITIONAL_LEN {
        return None;
    }

    Some(AssistantMessage {
        spans: view.items(Field::AssistantSpans).iter().map(span).collect(),
        created_at: view.date_time(Field::AssistantCreatedAt),
        finished_at: view.date_time(Field::AssistantFinishedAt),
        usage: TokenUsage {
            input: view.integer(Field::AssistantInputTokens),
            output: view.integer(Field::AssistantOutputTokens),
            total: view.float(Field::AssistantTotalTokens),
        },
    })
}

fn span(entry: &Value) -> Span {
    let Some(view) = FieldView::structured(entry) else {
        return Span {
            unrecognized: vec![entry.clone()],
            ..Span::default()
        };
    };

    let mut span = Span {
        content: view.optional_text(Field::SpanContent),
        reasoning: view.optional_text(Field::SpanReasoning),
        ..Span::default()
    };

    for nested in view.items(Field::SpanFunctionCalls) {
        match nested_function_call(nested) {
            Some(record) => span.function_calls.push(record),
            None => span.unrecognized.push(nested.clone()),
        }
    }

    span
}

/// A span entry is a function call only when it is a union tagged as one
/// with a structured body.
fn nested_function_call(entry: &Value) -> Option<FunctionCallRecord> {
    let union = TaggedUnion::parse(entry)?;
    if union.kind() != Some(MessageKind::FunctionCall) {
        tracing::debug!("Span entry tagged {} is not a function call, keeping it as-is", union.tag);
        return None;
    }
    function_call(union.body)
}

fn function_call(body: &Value) -> Option<FunctionCallRecord> {
    let view = FieldView::structured(body)?;
    Some(FunctionCallRecord {
        content: view.optional_text(Field::FunctionCallContent),
        calls: view.items(Field::FunctionCallCalls).iter().map(call_entry).collect(),
        results: view
            .items(Field::FunctionCallResults)
            .iter()
            .map(result_entry)
            .collect(),
    })
}

fn call_entry(entry: &Value) -> CallEntry {
    let view = FieldView::new(entry);
    CallEntry {
        name: view.text(Field::CallName),
        arguments: arguments(view.get(Field::CallArguments)),
    }
}

fn arguments(value: &Value) -> Map<String, Json> {
    match value {
        Value::Map(entries) => entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_json()))
            .collect(),
        Value::Nil => Map::new(),
        other => {
            let mut wrapped = Map::new();
            wrapped.insert("value".to_string(), other.to_json());
            wrapped
        }
    }
}

fn result_entry(entry: &Value) -> ResultEntry {
    let value = match FieldView::structured(entry) {
        Some(view) => view.get(Field::ResultValue).clone(),
        None => entry.clone(),
    };
    ResultEntry { value }
}
