//! Per-payload decode pipeline
//!
//! A payload normally holds one tagged union. When the single-value decode
//! reports trailing bytes, the payload is re-read as a stream of concatenated
//! values and each one is decoded on its own. Nodes recovered before a
//! malformed value are kept alongside the failure.

use serde::Serialize;

use crate::codec::{decode_one, decode_stream};
use crate::error::{CodecError, PayloadError};
use crate::message::{ChatNode, decode};

/// How the nodes of a payload were obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodeMode {
    /// One value, no trailing bytes
    Single,
    /// Payload re-read as concatenated values
    Recovered {
        /// Values decoded by the streaming pass
        values: usize,
    },
}

/// Result of decoding one raw payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayloadDecode {
    /// Decoded nodes in payload order
    pub nodes: Vec<ChatNode>,
    /// Decode path taken
    pub mode: DecodeMode,
    /// Failure that stopped decoding, if any
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_failure"
    )]
    pub failure: Option<PayloadError>,
}

impl PayloadDecode {
    /// Whether every byte of the payload was decoded
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

fn serialize_failure<S>(failure: &Option<PayloadError>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    #[derive(Serialize)]
    struct FailureView {
        error: String,
        length: usize,
        decoded: usize,
    }

    failure
        .as_ref()
        .map(|err| FailureView {
            error: err.source.to_string(),
            length: err.length,
            decoded: err.decoded,
        })
        .serialize(serializer)
}

/// Decode a raw payload into chat nodes.
///
/// Never fails as a whole: binary faults are carried in
/// [`PayloadDecode::failure`] next to whatever was decoded before them.
pub fn decode_payload(bytes: &[u8]) -> PayloadDecode {
    match decode_one(bytes) {
        Ok(value) => PayloadDecode {
            nodes: vec![decode(&value)],
            mode: DecodeMode::Single,
            failure: None,
        },
        Err(CodecError::TrailingData {
            consumed,
            remaining,
        }) => {
            tracing::debug!(
                "Payload of {} bytes has {} trailing bytes after the first value ({} consumed), reading as a stream",
                bytes.len(),
                remaining,
                consumed
            );
            recover(bytes)
        }
        Err(source) => {
            let failure = PayloadError {
                length: bytes.len(),
                decoded: 0,
                source,
            };
            tracing::warn!("{}", failure);
            PayloadDecode {
                nodes: Vec::new(),
                mode: DecodeMode::Single,
                failure: Some(failure),
            }
        }
    }
}

/// Streaming pass over concatenated values.
fn recover(bytes: &[u8]) -> PayloadDecode {
    let mut nodes = Vec::new();
    let mut failure = None;

    for item in decode_stream(bytes) {
        match item {
            Ok(value) => nodes.push(decode(&value)),
            Err(source) => {
                let err = PayloadError {
                    length: bytes.len(),
                    decoded: nodes.len(),
                    source,
                };
                tracing::warn!("{}", err);
                failure = Some(err);
            }
        }
    }

    PayloadDecode {
        mode: DecodeMode::Recovered {
            values: nodes.len(),
        },
        nodes,
        failure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmpv::Value as Raw;

    fn encode(value: &Raw) -> Vec<u8> {
        let mut buf = Vec::new();
        rmpv::encode::write_value(&mut buf, value).unwrap();
        buf
    }

    fn union(tag: i64, body: Raw) -> Raw {
        Raw::Array(vec![Raw::from(tag), body])
    }

    #[test]
    fn single_value_skips_recovery() {
        let bytes = encode(&union(0, Raw::from("server ready")));
        let decoded = decode_payload(&bytes);

        assert_eq!(decoded.mode, DecodeMode::Single);
        assert!(decoded.is_complete());
        assert_eq!(
            decoded.nodes,
            vec![ChatNode::System {
                text: "server ready".into()
            }]
        );
    }

    #[test]
    fn concatenated_values_are_recovered_in_order() {
        let mut bytes = encode(&union(2, Raw::from("hello")));
        bytes.extend(encode(&union(3, Raw::Map(vec![(Raw::from(2), Raw::from("Thinking"))]))));

        let decoded = decode_payload(&bytes);
        assert_eq!(decoded.mode, DecodeMode::Recovered { values: 2 });
        assert!(decoded.is_complete());
        assert_eq!(
            decoded.nodes,
            vec![
                ChatNode::User {
                    prompt: "hello".into()
                },
                ChatNode::Action {
                    content: "Thinking".into()
                },
            ]
        );
    }

    #[test]
    fn empty_payload_reports_zero_length() {
        let decoded = decode_payload(&[]);
        assert!(decoded.nodes.is_empty());
        let failure = decoded.failure.unwrap();
        assert_eq!(failure.length, 0);
        assert_eq!(failure.source, CodecError::Empty);
    }

    #[test]
    fn corrupt_payload_fails_without_nodes() {
        let decoded = decode_payload(&[0x92, 0x01]);
        assert!(decoded.nodes.is_empty());
        assert_eq!(decoded.mode, DecodeMode::Single);
        let failure = decoded.failure.unwrap();
        assert_eq!(failure.length, 2);
        assert!(matches!(failure.source, CodecError::Malformed { .. }));
    }

    #[test]
    fn partial_recovery_keeps_nodes_before_the_fault() {
        let mut bytes = encode(&union(0, Raw::from("kept")));
        bytes.extend_from_slice(&[0x92, 0x01]);

        let decoded = decode_payload(&bytes);
        assert_eq!(decoded.mode, DecodeMode::Recovered { values: 1 });
        assert_eq!(decoded.nodes.len(), 1);
        let failure = decoded.failure.unwrap();
        assert_eq!(failure.length, bytes.len());
        assert_eq!(failure.decoded, 1);
    }

    #[test]
    fn failure_serializes_as_message() {
        let decoded = decode_payload(&[]);
        let json = serde_json::to_value(&decoded).unwrap();
        assert_eq!(json["failure"]["length"], 0);
        assert_eq!(json["failure"]["error"], "empty payload");
        assert_eq!(json["mode"]["kind"], "single");
    }
}
