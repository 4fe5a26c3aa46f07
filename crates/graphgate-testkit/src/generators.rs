//! Proptest generators for property-based testing.

use std::collections::BTreeMap;

use base64::Engine;
use proptest::prelude::*;

use graphgate_core::{Identity, WireMessage, OWNED_SIGIL};

const ENGINE: base64::engine::GeneralPurpose = base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Generate a well-formed identity: 1..=48 random bytes in the graph's
/// URL-safe encoding.
pub fn identity() -> impl Strategy<Value = Identity> {
    prop::collection::vec(any::<u8>(), 1..=48).prop_map(|bytes| Identity::new(ENGINE.encode(bytes)))
}

/// Generate an arbitrary key string, well-formed or not.
pub fn raw_key() -> impl Strategy<Value = String> {
    "[ -~]{0,64}".prop_map(String::from)
}

/// Generate a soul in an identity's owned namespace.
pub fn owned_soul() -> impl Strategy<Value = String> {
    (identity(), "[a-z][a-z0-9/-]{0,24}")
        .prop_map(|(id, suffix)| format!("{OWNED_SIGIL}{id}.{suffix}"))
}

/// Generate a soul outside any owned namespace.
pub fn public_soul() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9/-]{0,24}".prop_map(String::from)
}

/// Generate a small node value.
pub fn node_value() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        any::<i64>().prop_map(|n| serde_json::json!({ "n": n })),
        "[a-z]{0,16}".prop_map(|s| serde_json::json!({ "s": s })),
        Just(serde_json::json!({})),
    ]
}

/// Generate a write message over 1..=4 souls drawn from a strategy.
pub fn write_message(
    soul: impl Strategy<Value = String>,
) -> impl Strategy<Value = WireMessage> {
    (
        prop::collection::btree_map(soul, node_value(), 1..=4),
        "[a-z0-9]{4,12}",
    )
        .prop_map(|(put, id)| WireMessage {
            id: Some(id),
            put: Some(put),
            ..WireMessage::default()
        })
}

/// Generate a non-write message (read or ack).
pub fn non_write_message() -> impl Strategy<Value = WireMessage> {
    prop_oneof![
        public_soul().prop_map(|soul| WireMessage {
            id: Some("r1".into()),
            get: Some(serde_json::json!({ "#": soul })),
            ..WireMessage::default()
        }),
        Just(WireMessage {
            ack_for: Some("w1".into()),
            ok: Some(serde_json::json!(true)),
            ..WireMessage::default()
        }),
    ]
}
