//! Field access over mapping- or sequence-encoded records.
//!
//! The producer may write a record as a sparse mapping keyed by field index
//! (default-valued fields omitted) or as a dense sequence with nils in unused
//! positions. [`field`] hides that difference; every schema-aware read goes
//! through it.

use chrono::{DateTime, FixedOffset};

use super::schema::Field;
use crate::value::{Key, Value};

/// Physical shape of a record body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyShape {
    /// Integer-keyed mapping.
    Mapping,
    /// Positional sequence.
    Sequence,
    /// Anything else.
    Other,
}

/// Read the field at `index`, falling back to `default`.
///
/// Mappings use `index` as a key and fall back when it is absent. Sequences
/// use `index` as a position and fall back when it is out of range or nil.
/// Other shapes always yield `default`.
pub fn field<'a>(body: &'a Value, index: usize, default: &'a Value) -> &'a Value {
    match body {
        Value::Map(entries) => entries
            .iter()
            .find(|(key, _)| matches!(key, Key::Int(k) if *k == index as i128))
            .map(|(_, value)| value)
            .unwrap_or(default),
        Value::Array(items) => match items.get(index) {
            None | Some(Value::Nil) => default,
            Some(value) => value,
        },
        _ => default,
    }
}

/// Schema-aware view over a record body.
#[derive(Debug, Clone, Copy)]
pub struct FieldView<'a> {
    body: &'a Value,
}

impl<'a> FieldView<'a> {
    /// View any value; non-record shapes read as all defaults.
    pub fn new(body: &'a Value) -> Self {
        Self { body }
    }

    /// View `body` only if it is a mapping or a sequence.
    pub fn structured(body: &'a Value) -> Option<Self> {
        let view = Self::new(body);
        match view.shape() {
            BodyShape::Mapping | BodyShape::Sequence => Some(view),
            BodyShape::Other => None,
        }
    }

    /// Physical shape of the body.
    pub fn shape(&self) -> BodyShape {
        match self.body {
            Value::Map(_) => BodyShape::Mapping,
            Value::Array(_) => BodyShape::Sequence,
            _ => BodyShape::Other,
        }
    }

    /// Number of entries or positions.
    pub fn len(&self) -> usize {
        match self.body {
            Value::Map(entries) => entries.len(),
            Value::Array(items) => items.len(),
            _ => 0,
        }
    }

    /// Whether the body has no entries or positions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw value of a schema field, or its declared default.
    pub fn get(&self, field: Field) -> &'a Value {
        let spec = field.spec();
        self::field(self.body, spec.index, spec.default.value())
    }

    /// Field as text; nil reads as empty and non-text values use their
    /// display form.
    pub fn text(&self, field: Field) -> String {
        match self.get(field) {
            Value::String(text) => text.clone(),
            other => other.display_text(),
        }
    }

    /// Field as text, `None` when empty.
    pub fn optional_text(&self, field: Field) -> Option<String> {
        let text = self.text(field);
        if text.is_empty() { None } else { Some(text) }
    }

    /// Field as a sequence; anything else reads as empty.
    pub fn items(&self, field: Field) -> &'a [Value] {
        match self.get(field) {
            Value::Array(items) => items,
            other => {
                tracing::debug!("{} is not a list, reading it as empty: {}", field, other.display_text());
                &[]
            }
        }
    }

    /// Field as an integer.
    pub fn integer(&self, field: Field) -> i64 {
        self.get(field)
            .as_i64()
            .or_else(|| field.default_value().as_i64())
            .unwrap_or_default()
    }

    /// Field as a float.
    pub fn float(&self, field: Field) -> f64 {
        self.get(field)
            .as_f64()
            .or_else(|| field.default_value().as_f64())
            .unwrap_or_default()
    }

    /// Field as a date-time.
    pub fn date_time(&self, field: Field) -> Option<DateTime<FixedOffset>> {
        self.get(field).as_date_time()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::String(s.into())
    }

    #[test]
    fn mapping_uses_key_and_default_when_absent() {
        let body = Value::Map(vec![(Key::Int(2), text("two"))]);
        let fallback = text("fallback");
        assert_eq!(field(&body, 2, &fallback), &text("two"));
        assert_eq!(field(&body, 0, &fallback), &fallback);
    }

    #[test]
    fn mapping_ignores_text_keys() {
        let body = Value::Map(vec![(Key::Str("0".into()), text("zero"))]);
        assert_eq!(field(&body, 0, &Value::Nil), &Value::Nil);
    }

    #[test]
    fn sequence_uses_position_and_default_for_nil_or_range() {
        let body = Value::Array(vec![text("a"), Value::Nil]);
        let fallback = text("fallback");
        assert_eq!(field(&body, 0, &fallback), &text("a"));
        assert_eq!(field(&body, 1, &fallback), &fallback);
        assert_eq!(field(&body, 7, &fallback), &fallback);
    }

    #[test]
    fn scalars_always_default() {
        let fallback = text("fallback");
        assert_eq!(field(&text("body"), 0, &fallback), &fallback);
        assert_eq!(field(&Value::Integer(3), 0, &fallback), &fallback);
    }

    #[test]
    fn view_reads_schema_defaults() {
        let body = Value::Map(Vec::new());
        let view = FieldView::new(&body);
        assert_eq!(view.text(Field::SpanContent), "");
        assert!(view.items(Field::SpanFunctionCalls).is_empty());
        assert_eq!(view.integer(Field::AssistantInputTokens), 0);
        assert_eq!(view.float(Field::AssistantTotalTokens), 0.0);
        assert_eq!(view.optional_text(Field::SpanReasoning), None);
        assert!(view.date_time(Field::AssistantCreatedAt).is_none());
    }

    #[test]
    fn non_list_items_read_as_empty() {
        let body = Value::Map(vec![(Key::Int(5), text("not a list"))]);
        let view = FieldView::new(&body);
        assert!(view.items(Field::AssistantSpans).is_empty());
    }

    #[test]
    fn structured_rejects_scalars() {
        assert!(FieldView::structured(&text("x")).is_none());
        assert!(FieldView::structured(&Value::Nil).is_none());
        assert_eq!(
            FieldView::structured(&Value::Array(vec![])).map(|v| v.shape()),
            Some(BodyShape::Sequence)
        );
    }
}
