//! Chat message schema table
//!
//! Single source of truth for variant tags and field indices. A field index
//! is the mapping key when a record is written as a mapping and the position
//! when it is written as a sequence. Decoding code reads fields only through
//! [`Field`] so no index is spelled out anywhere else.

use serde::Serialize;
use std::fmt;

use crate::value::Value;

/// Message variant, selected by the union tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// System prompt.
    System,
    /// Assistant reply.
    Assistant,
    /// User prompt.
    User,
    /// Action notice.
    Action,
    /// Tool invocation record.
    FunctionCall,
}

/// One entry of the variant table.
#[derive(Debug, Clone, Copy)]
pub struct VariantSpec {
    /// Union tag.
    pub tag: i64,
    /// Variant.
    pub kind: MessageKind,
    /// Display name.
    pub name: &'static str,
}

/// Variant table.
pub static VARIANTS: &[VariantSpec] = &[
    VariantSpec {
        tag: 0,
        kind: MessageKind::System,
        name: "System",
    },
    VariantSpec {
        tag: 1,
        kind: MessageKind::Assistant,
        name: "Assistant",
    },
    VariantSpec {
        tag: 2,
        kind: MessageKind::User,
        name: "User",
    },
    VariantSpec {
        tag: 3,
        kind: MessageKind::Action,
        name: "Action",
    },
    VariantSpec {
        tag: 4,
        kind: MessageKind::FunctionCall,
        name: "FunctionCall",
    },
];

impl MessageKind {
    /// Look up the variant for a union tag.
    pub fn from_tag(tag: i64) -> Option<Self> {
        VARIANTS
            .iter()
            .find(|variant| variant.tag == tag)
            .map(|variant| variant.kind)
    }

    fn spec(self) -> &'static VariantSpec {
        &VARIANTS[self as usize]
    }

    /// Union tag for this variant.
    pub fn tag(self) -> i64 {
        self.spec().tag
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        self.spec().name
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value substituted for a missing field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    /// Empty text.
    Text,
    /// Empty sequence.
    List,
    /// Empty mapping.
    Map,
    /// Integer zero.
    Zero,
    /// Float zero.
    FloatZero,
    /// Nil; the field is optional.
    Absent,
}

static EMPTY_TEXT: Value = Value::String(String::new());
static EMPTY_LIST: Value = Value::Array(Vec::new());
static EMPTY_MAP: Value = Value::Map(Vec::new());
static ZERO: Value = Value::Integer(0);
static FLOAT_ZERO: Value = Value::Float(0.0);
static NIL: Value = Value::Nil;

impl FieldDefault {
    /// The default as a value.
    pub fn value(self) -> &'static Value {
        match self {
            FieldDefault::Text => &EMPTY_TEXT,
            FieldDefault::List => &EMPTY_LIST,
            FieldDefault::Map => &EMPTY_MAP,
            FieldDefault::Zero => &ZERO,
            FieldDefault::FloatZero => &FLOAT_ZERO,
            FieldDefault::Absent => &NIL,
        }
    }
}

/// Logical fields read by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// System prompt text.
    SystemText,
    /// User prompt text.
    UserPrompt,
    /// Action content text.
    ActionContent,
    /// Assistant creation time.
    AssistantCreatedAt,
    /// Assistant completion time.
    AssistantFinishedAt,
    /// Assistant span list.
    AssistantSpans,
    /// Assistant input token count.
    AssistantInputTokens,
    /// Assistant output token count.
    AssistantOutputTokens,
    /// Assistant total token count.
    AssistantTotalTokens,
    /// Span markdown content.
    SpanContent,
    /// Span nested function-call unions.
    SpanFunctionCalls,
    /// Span reasoning output.
    SpanReasoning,
    /// Function-call display content.
    FunctionCallContent,
    /// Function-call call list.
    FunctionCallCalls,
    /// Function-call result list.
    FunctionCallResults,
    /// Call function name.
    CallName,
    /// Call argument mapping.
    CallArguments,
    /// Result value.
    ResultValue,
}

/// One entry of the field table.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Logical field.
    pub field: Field,
    /// Mapping key or sequence position.
    pub index: usize,
    /// Field name as the producer calls it.
    pub name: &'static str,
    /// Value used when the field is missing.
    pub default: FieldDefault,
}

const fn spec(field: Field, index: usize, name: &'static str, default: FieldDefault) -> FieldSpec {
    FieldSpec {
        field,
        index,
        name,
        default,
    }
}

/// Field table, in [`Field`] declaration order.
pub static FIELDS: &[FieldSpec] = &[
    spec(Field::SystemText, 0, "SystemPrompt", FieldDefault::Text),
    spec(Field::UserPrompt, 0, "UserPrompt", FieldDefault::Text),
    spec(Field::ActionContent, 2, "Content", FieldDefault::Text),
    spec(Field::AssistantCreatedAt, 2, "CreatedAt", FieldDefault::Absent),
    spec(Field::AssistantFinishedAt, 3, "FinishedAt", FieldDefault::Absent),
    spec(Field::AssistantSpans, 5, "Spans", FieldDefault::List),
    spec(Field::AssistantInputTokens, 6, "InputTokenCount", FieldDefault::Zero),
    spec(Field::AssistantOutputTokens, 7, "OutputTokenCount", FieldDefault::Zero),
    spec(Field::AssistantTotalTokens, 8, "TotalTokenCount", FieldDefault::FloatZero),
    spec(Field::SpanContent, 0, "Content", FieldDefault::Text),
    spec(Field::SpanFunctionCalls, 1, "FunctionCalls", FieldDefault::List),
    spec(Field::SpanReasoning, 4, "ReasoningOutput", FieldDefault::Text),
    spec(Field::FunctionCallContent, 3, "Content", FieldDefault::Text),
    spec(Field::FunctionCallCalls, 6, "Calls", FieldDefault::List),
    spec(Field::FunctionCallResults, 7, "Results", FieldDefault::List),
    spec(Field::CallName, 0, "Name", FieldDefault::Text),
    spec(Field::CallArguments, 1, "Arguments", FieldDefault::Map),
    spec(Field::ResultValue, 0, "Result", FieldDefault::Text),
];

/// Minimum length of a positional assistant body (the span list sits at
/// position 5).
pub const ASSISTANT_MIN_POSITIONAL_LEN: usize = 6;

impl Field {
    /// Table entry for this field.
    pub fn spec(self) -> &'static FieldSpec {
        &FIELDS[self as usize]
    }

    /// Mapping key or sequence position.
    pub fn index(self) -> usize {
        self.spec().index
    }

    /// Value used when the field is missing.
    pub fn default_value(self) -> &'static Value {
        self.spec().default.value()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spec().name)
    }
}
