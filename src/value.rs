//! Generic decoded values
//!
//! `Value` is the closed intermediate representation produced by the binary
//! format boundary before any schema interpretation. Structured records show
//! up here either as an integer-keyed [`Value::Map`] or as a positional
//! [`Value::Array`]; the message layer reconciles the two.

use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value as Json, json};
use std::fmt;

/// MessagePack extension type reserved for timestamps
pub const TIMESTAMP_EXT_TYPE: i8 = -1;

/// A decoded MessagePack value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Nil.
    Nil,
    /// Boolean.
    Boolean(bool),
    /// Integer covering the full signed and unsigned 64-bit range.
    Integer(i128),
    /// 32- or 64-bit float, widened.
    Float(f64),
    /// UTF-8 text. Invalid sequences are replaced during decoding.
    String(String),
    /// Raw byte string.
    Binary(Vec<u8>),
    /// Ordered sequence.
    Array(Vec<Value>),
    /// Mapping with entry order preserved.
    Map(Vec<(Key, Value)>),
    /// Timestamp extension value.
    Timestamp(DateTime<Utc>),
    /// Any other extension value.
    Ext {
        /// Application-defined extension type.
        type_id: i8,
        /// Extension payload.
        data: Vec<u8>,
    },
}

/// Mapping key. Keys of other kinds are folded into [`Key::Str`] using their
/// textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// Integer key; schema field indices use this form.
    Int(i128),
    /// Text key.
    Str(String),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(n) => write!(f, "{}", n),
            Key::Str(s) => write!(f, "{}", s),
        }
    }
}

impl Value {
    /// Borrow the text of a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(text) => Some(text),
            _ => None,
        }
    }

    /// Interpret the value as an `i64`, if it is an integer in range.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    /// Interpret the value as a float, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Borrow the elements of a sequence.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow the entries of a mapping.
    pub fn as_map(&self) -> Option<&[(Key, Value)]> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Whether this is nil.
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Interpret the value as a date-time.
    ///
    /// Accepts a bare timestamp (UTC) or the `[timestamp, offset_minutes]`
    /// pair written for offset-aware date-times, where the timestamp holds the
    /// local wall-clock reading.
    pub fn as_date_time(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Value::Timestamp(ts) => Some(ts.with_timezone(&FixedOffset::east_opt(0)?)),
            Value::Array(items) if items.len() == 2 => {
                let Value::Timestamp(local) = &items[0] else {
                    return None;
                };
                let minutes = items[1].as_i64()?;
                let offset = FixedOffset::east_opt(i32::try_from(minutes.checked_mul(60)?).ok()?)?;
                let instant = local.checked_sub_signed(Duration::seconds(minutes * 60))?;
                Some(instant.with_timezone(&offset))
            }
            _ => None,
        }
    }

    /// Text used when a value is shown as-is: strings verbatim, everything
    /// else in compact JSON form.
    pub fn display_text(&self) -> String {
        match self {
            Value::String(text) => text.clone(),
            Value::Nil => String::new(),
            other => other.to_json().to_string(),
        }
    }

    /// Convert into a JSON value for presentation.
    pub fn to_json(&self) -> Json {
        match self {
            Value::Nil => Json::Null,
            Value::Boolean(flag) => Json::Bool(*flag),
            Value::Integer(n) => {
                if let Ok(small) = i64::try_from(*n) {
                    Json::from(small)
                } else if let Ok(large) = u64::try_from(*n) {
                    Json::from(large)
                } else {
                    Json::String(n.to_string())
                }
            }
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::String(text) => Json::String(text.clone()),
            Value::Binary(bytes) => json!({ "$binary": hex(bytes) }),
            Value::Array(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(entries) => {
                let mut obj = Map::new();
                for (key, value) in entries {
                    obj.insert(key.to_string(), value.to_json());
                }
                Json::Object(obj)
            }
            Value::Timestamp(ts) => Json::String(ts.to_rfc3339()),
            Value::Ext { type_id, data } => json!({ "$ext": type_id, "data": hex(data) }),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(text) => write!(f, "{}", text),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<rmpv::Value> for Value {
    fn from(value: rmpv::Value) -> Self {
        match value {
            rmpv::Value::Nil => Value::Nil,
            rmpv::Value::Boolean(flag) => Value::Boolean(flag),
            rmpv::Value::Integer(n) => Value::Integer(integer_to_i128(&n)),
            rmpv::Value::F32(f) => Value::Float(f64::from(f)),
            rmpv::Value::F64(f) => Value::Float(f),
            rmpv::Value::String(text) => Value::String(match text.as_str() {
                Some(valid) => valid.to_string(),
                None => String::from_utf8_lossy(text.as_bytes()).into_owned(),
            }),
            rmpv::Value::Binary(bytes) => Value::Binary(bytes),
            rmpv::Value::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            rmpv::Value::Map(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key_from(key), Value::from(value)))
                    .collect(),
            ),
            rmpv::Value::Ext(type_id, data) => {
                if type_id == TIMESTAMP_EXT_TYPE {
                    if let Some(ts) = decode_timestamp(&data) {
                        return Value::Timestamp(ts);
                    }
                }
                Value::Ext { type_id, data }
            }
        }
    }
}

fn integer_to_i128(n: &rmpv::Integer) -> i128 {
    match n.as_i64() {
        Some(signed) => i128::from(signed),
        None => n.as_u64().map(i128::from).unwrap_or_default(),
    }
}

fn key_from(key: rmpv::Value) -> Key {
    match Value::from(key) {
        Value::Integer(n) => Key::Int(n),
        Value::String(text) => Key::Str(text),
        other => Key::Str(other.to_json().to_string()),
    }
}

/// Decode the 32-, 64- and 96-bit timestamp extension layouts.
fn decode_timestamp(data: &[u8]) -> Option<DateTime<Utc>> {
    match data.len() {
        4 => {
            let secs = u32::from_be_bytes(<[u8; 4]>::try_from(data).ok()?);
            DateTime::<Utc>::from_timestamp(i64::from(secs), 0)
        }
        8 => {
            let raw = u64::from_be_bytes(<[u8; 8]>::try_from(data).ok()?);
            let nanos = (raw >> 34) as u32;
            let secs = (raw & 0x3_ffff_ffff) as i64;
            DateTime::<Utc>::from_timestamp(secs, nanos)
        }
        12 => {
            let nanos = u32::from_be_bytes(<[u8; 4]>::try_from(&data[..4]).ok()?);
            let secs = i64::from_be_bytes(<[u8; 8]>::try_from(&data[4..]).ok()?);
            DateTime::<Utc>::from_timestamp(secs, nanos)
        }
        _ => None,
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_maps_with_mixed_keys() {
        let raw = rmpv::Value::Map(vec![
            (rmpv::Value::from(5), rmpv::Value::from("spans")),
            (rmpv::Value::from("q"), rmpv::Value::from("weather")),
            (rmpv::Value::Boolean(true), rmpv::Value::Nil),
        ]);

        let value = Value::from(raw);
        let entries = value.as_map().expect("map");
        assert_eq!(entries[0].0, Key::Int(5));
        assert_eq!(entries[1].0, Key::Str("q".into()));
        assert_eq!(entries[2].0, Key::Str("true".into()));
        assert!(entries[2].1.is_nil());
    }

    #[test]
    fn keeps_full_unsigned_range() {
        let value = Value::from(rmpv::Value::from(u64::MAX));
        assert_eq!(value, Value::Integer(i128::from(u64::MAX)));
        assert_eq!(value.as_i64(), None);
        assert_eq!(value.to_json(), json!(u64::MAX));
    }

    #[test]
    fn decodes_timestamp_extension() {
        let raw = rmpv::Value::Ext(-1, 1_700_000_000u32.to_be_bytes().to_vec());
        let value = Value::from(raw);
        let Value::Timestamp(ts) = value else {
            panic!("expected timestamp, got {:?}", value);
        };
        assert_eq!(ts.timestamp(), 1_700_000_000);
    }

    #[test]
    fn keeps_unknown_extensions() {
        let value = Value::from(rmpv::Value::Ext(7, vec![0xab, 0x01]));
        assert_eq!(
            value,
            Value::Ext {
                type_id: 7,
                data: vec![0xab, 0x01]
            }
        );
        assert_eq!(value.to_json(), json!({"$ext": 7, "data": "ab01"}));
    }

    #[test]
    fn offset_date_time_subtracts_offset() {
        let local = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        let value = Value::Array(vec![Value::Timestamp(local), Value::Integer(480)]);

        let dt = value.as_date_time().expect("date-time");
        assert_eq!(dt.offset().local_minus_utc(), 480 * 60);
        assert_eq!(dt.timestamp(), 1_700_000_000 - 480 * 60);
    }

    #[test]
    fn display_leaves_strings_verbatim() {
        assert_eq!(Value::String("héllo".into()).to_string(), "héllo");
        let nested = Value::Array(vec![Value::String("a".into()), Value::Integer(1)]);
        assert_eq!(nested.to_string(), r#"["a",1]"#);
        assert_eq!(Value::Nil.display_text(), "");
    }
}
