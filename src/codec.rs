//! MessagePack boundary
//!
//! Two primitives: decode exactly one value from a payload, or walk a payload
//! as a lazy sequence of concatenated values. Errors are reported as
//! structured [`CodecError`] kinds so callers can tell "more values follow"
//! apart from corrupt input without inspecting messages.

use std::iter::FusedIterator;

use crate::error::{CodecError, CodecResult};
use crate::value::Value;

/// Decode a payload that must hold exactly one value.
///
/// Returns [`CodecError::TrailingData`] when a complete value is followed by
/// more bytes.
pub fn decode_one(bytes: &[u8]) -> CodecResult<Value> {
    if bytes.is_empty() {
        return Err(CodecError::Empty);
    }

    let (value, consumed) = read_at(bytes, 0)?;
    if consumed < bytes.len() {
        return Err(CodecError::TrailingData {
            consumed,
            remaining: bytes.len() - consumed,
        });
    }

    Ok(value)
}

/// Walk a payload as a sequence of concatenated values.
///
/// Every call scans from the start of `bytes`.
pub fn decode_stream(bytes: &[u8]) -> ValueStream<'_> {
    ValueStream {
        bytes,
        offset: 0,
        failed: false,
    }
}

/// Lazy iterator over the values concatenated in a payload.
///
/// Yields one `Ok` per complete value in payload order. On the first malformed
/// value it yields that error once and then ends.
#[derive(Debug, Clone)]
pub struct ValueStream<'a> {
    bytes: &'a [u8],
    offset: usize,
    failed: bool,
}

impl Iterator for ValueStream<'_> {
    type Item = CodecResult<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.bytes.len() {
            return None;
        }

        match read_at(self.bytes, self.offset) {
            Ok((value, consumed)) => {
                self.offset += consumed;
                Some(Ok(value))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for ValueStream<'_> {}

/// Read one value starting at `offset`, returning it with its encoded length.
fn read_at(bytes: &[u8], offset: usize) -> CodecResult<(Value, usize)> {
    let mut cursor = &bytes[offset..];
    let available = cursor.len();

    match rmpv::decode::read_value(&mut cursor) {
        Ok(raw) => Ok((Value::from(raw), available - cursor.len())),
        Err(err) => Err(CodecError::Malformed {
            offset,
            detail: err.to_string(),
        }),
    }
}
