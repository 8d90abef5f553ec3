use chatlog::error::CodecError;
use chatlog::message::ChatNode;
use chatlog::payload::{DecodeMode, decode_payload};
use proptest::prelude::*;
use rmpv::Value as Raw;

fn encode(value: &Raw) -> Vec<u8> {
    let mut buf = Vec::new();
    rmpv::encode::write_value(&mut buf, value).unwrap();
    buf
}

fn union(tag: i64, body: Raw) -> Raw {
    Raw::Array(vec![Raw::from(tag), body])
}

fn user(prompt: &str) -> Raw {
    union(2, Raw::from(prompt))
}

fn assistant(content: &str) -> Raw {
    let span = Raw::Map(vec![(Raw::from(0), Raw::from(content))]);
    union(1, Raw::Map(vec![(Raw::from(5), Raw::Array(vec![span]))]))
}

proptest! {
    #[test]
    fn concatenated_values_match_standalone_decodes(
        prompt in "\\PC{0,30}",
        reply in "\\PC{1,30}",
    ) {
        let first = encode(&user(&prompt));
        let second = encode(&assistant(&reply));
        let mut bytes = first.clone();
        bytes.extend_from_slice(&second);

        let combined = decode_payload(&bytes);
        prop_assert_eq!(combined.mode, DecodeMode::Recovered { values: 2 });
        prop_assert!(combined.is_complete());

        let mut expected = decode_payload(&first).nodes;
        expected.extend(decode_payload(&second).nodes);
        prop_assert_eq!(combined.nodes, expected);
    }

    #[test]
    fn single_values_never_take_the_recovery_path(prompt in "\\PC{0,30}") {
        let decoded = decode_payload(&encode(&user(&prompt)));
        prop_assert_eq!(decoded.mode, DecodeMode::Single);
        prop_assert_eq!(decoded.nodes.len(), 1);
    }
}

#[test]
fn three_appended_messages_keep_payload_order() {
    let mut bytes = encode(&user("first"));
    bytes.extend(encode(&union(3, Raw::Map(vec![(Raw::from(2), Raw::from("second"))]))));
    bytes.extend(encode(&union(0, Raw::from("third"))));

    let decoded = decode_payload(&bytes);
    assert_eq!(decoded.mode, DecodeMode::Recovered { values: 3 });
    assert_eq!(
        decoded.nodes,
        vec![
            ChatNode::User {
                prompt: "first".into()
            },
            ChatNode::Action {
                content: "second".into()
            },
            ChatNode::System {
                text: "third".into()
            },
        ]
    );
}

#[test]
fn truncated_tail_keeps_recovered_nodes_and_reports_length() {
    let mut bytes = encode(&user("kept"));
    bytes.extend(encode(&user("also kept")));
    let full = encode(&assistant("lost"));
    bytes.extend_from_slice(&full[..full.len() - 2]);

    let decoded = decode_payload(&bytes);
    assert_eq!(decoded.nodes.len(), 2);
    let failure = decoded.failure.expect("failure reported");
    assert_eq!(failure.length, bytes.len());
    assert_eq!(failure.decoded, 2);
    assert!(matches!(failure.source, CodecError::Malformed { .. }));
}

#[test]
fn empty_payload_is_a_reported_failure() {
    let decoded = decode_payload(&[]);
    assert!(decoded.nodes.is_empty());
    let failure = decoded.failure.expect("failure reported");
    assert_eq!(failure.length, 0);
    assert!(failure.to_string().contains("0 bytes"));
}
