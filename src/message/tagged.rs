//! `[tag, body]` union envelope.

use super::schema::MessageKind;
use crate::value::Value;

/// A two-element sequence whose first element is an integer tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaggedUnion<'a> {
    /// Variant tag.
    pub tag: i64,
    /// Variant body, mapping or sequence depending on the writer.
    pub body: &'a Value,
}

impl<'a> TaggedUnion<'a> {
    /// Split `value` into tag and body, or `None` if it is not shaped like a
    /// tagged union.
    pub fn parse(value: &'a Value) -> Option<Self> {
        match value.as_array()? {
            [tag, body] => Some(Self {
                tag: tag.as_i64()?,
                body,
            }),
            _ => None,
        }
    }

    /// Variant selected by the tag, if the schema knows it.
    pub fn kind(&self) -> Option<MessageKind> {
        MessageKind::from_tag(self.tag)
    }
}
