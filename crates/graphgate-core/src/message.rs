//! Graph wire message types.
//!
//! The synchronization protocol exchanges free-form JSON envelopes. This
//! module maps the wire's terse field names (`#`, `@`, `put`, `pub`) onto
//! a typed envelope so the rest of the gateway never touches raw JSON keys.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Header key under which peers commonly place a bearer credential.
pub const TOKEN_HEADER: &str = "token";

/// Header key for HTTP-style authorization values.
pub const AUTHORIZATION_HEADER: &str = "authorization";

/// A write/read envelope as it appears on the wire.
///
/// A message carrying a `put` map is a write and is subject to
/// authorization. A message without `put` (reads, acks, handshakes) is
/// never gated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    /// Correlation id of this message.
    #[serde(rename = "#", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Correlation id of the message this one acknowledges.
    #[serde(rename = "@", default, skip_serializing_if = "Option::is_none")]
    pub ack_for: Option<String>,

    /// Write payload: soul -> node data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<BTreeMap<String, serde_json::Value>>,

    /// Read request payload. Opaque to the gateway.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<serde_json::Value>,

    /// Success indicator on acks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ok: Option<serde_json::Value>,

    /// Error text on acks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,

    /// Free-form transport headers. May carry a bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,

    /// Identity hint set by the writing peer's user session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<IdentityHint>,

    /// Identity hint set by a forwarding peer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<IdentityHint>,

    /// Top-level public key hint.
    #[serde(rename = "pub", default, skip_serializing_if = "Option::is_none")]
    pub pub_key: Option<String>,
}

/// An identity hint as peers encode it: either a bare key string or an
/// object carrying a `pub` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdentityHint {
    /// `{ "pub": "<key>" }`
    Keyed {
        /// The hinted public key.
        #[serde(rename = "pub")]
        pub_key: String,
    },
    /// A bare key string.
    Plain(String),
}

impl IdentityHint {
    /// The hinted key, whichever encoding was used.
    pub fn key(&self) -> &str {
        match self {
            IdentityHint::Keyed { pub_key } => pub_key,
            IdentityHint::Plain(key) => key,
        }
    }
}

impl WireMessage {
    /// Create an empty message with a correlation id.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Whether this message carries a write payload.
    ///
    /// Messages without a non-empty `put` map are non-authorizable
    /// content and pass through the gate untouched.
    pub fn has_put(&self) -> bool {
        self.put.as_ref().is_some_and(|put| !put.is_empty())
    }

    /// Iterate the souls named by the write payload.
    pub fn souls(&self) -> impl Iterator<Item = &str> {
        self.put
            .iter()
            .flat_map(|put| put.keys())
            .map(String::as_str)
    }

    /// Look up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        let headers = self.headers.as_ref()?;
        headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Extract the first bearer credential from the message headers.
    ///
    /// Accepts either a raw `token` header or an `authorization` header
    /// with a `Bearer ` prefix.
    pub fn bearer(&self) -> Option<&str> {
        self.credentials().next()
    }

    /// Iterate every candidate credential the message carries: the
    /// `token` header, then the `authorization` header, each with any
    /// `Bearer ` prefix stripped.
    ///
    /// Callers matching a specific credential must check every
    /// candidate; a peer may carry an unrelated value in one header and
    /// the matching credential in the other.
    pub fn credentials(&self) -> impl Iterator<Item = &str> {
        [TOKEN_HEADER, AUTHORIZATION_HEADER]
            .into_iter()
            .filter_map(|name| self.header(name))
            .map(strip_bearer)
    }

    /// Set a header, creating the header map if needed.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
    }

    /// Build a rejection acknowledgment for this message.
    ///
    /// The ack carries the original correlation id so the writing peer's
    /// call resolves with an explicit failure instead of hanging, and an
    /// `err` text distinguishable from a transport error.
    pub fn rejection(&self, reason: impl Into<String>) -> WireMessage {
        WireMessage {
            ack_for: self.id.clone(),
            err: Some(reason.into()),
            ..WireMessage::default()
        }
    }

    /// Parse a message from its JSON wire form.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| CoreError::MalformedMessage(e.to_string()))
    }

    /// Encode the message to its JSON wire form.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| CoreError::MalformedMessage(e.to_string()))
    }
}

fn strip_bearer(value: &str) -> &str {
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .unwrap_or(value)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put_message(soul: &str) -> WireMessage {
        let mut put = BTreeMap::new();
        put.insert(soul.to_string(), serde_json::json!({"name": "alice"}));
        WireMessage {
            id: Some("msg-1".into()),
            put: Some(put),
            ..WireMessage::default()
        }
    }

    #[test]
    fn test_has_put() {
        assert!(put_message("~abc.x").has_put());
        assert!(!WireMessage::default().has_put());

        // An empty put map is not a write.
        let empty = WireMessage {
            put: Some(BTreeMap::new()),
            ..WireMessage::default()
        };
        assert!(!empty.has_put());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut msg = WireMessage::default();
        msg.set_header("Token", "abc");
        assert_eq!(msg.header("token"), Some("abc"));
        assert_eq!(msg.header("TOKEN"), Some("abc"));
        assert_eq!(msg.header("missing"), None);
    }

    #[test]
    fn test_bearer_strips_prefix() {
        let mut msg = WireMessage::default();
        msg.set_header("authorization", "Bearer secret-value");
        assert_eq!(msg.bearer(), Some("secret-value"));

        let mut raw = WireMessage::default();
        raw.set_header("token", "plain-token");
        assert_eq!(raw.bearer(), Some("plain-token"));
    }

    #[test]
    fn test_credentials_yields_every_candidate() {
        let mut msg = WireMessage::default();
        msg.set_header("token", "first-value");
        msg.set_header("authorization", "Bearer second-value");

        let candidates: Vec<&str> = msg.credentials().collect();
        assert_eq!(candidates, ["first-value", "second-value"]);
        assert_eq!(msg.bearer(), Some("first-value"));
    }

    #[test]
    fn test_rejection_carries_correlation_id() {
        let msg = put_message("~abc.x");
        let ack = msg.rejection("write not authorized");
        assert_eq!(ack.ack_for.as_deref(), Some("msg-1"));
        assert_eq!(ack.err.as_deref(), Some("write not authorized"));
        assert!(!ack.has_put());
    }

    #[test]
    fn test_wire_roundtrip_uses_terse_field_names() {
        let msg = put_message("~abc.x");
        let json = msg.to_json().unwrap();
        assert!(json.contains("\"#\":\"msg-1\""));
        assert!(json.contains("\"put\""));

        let parsed = WireMessage::from_json(&json).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn test_identity_hint_both_encodings() {
        let keyed: IdentityHint = serde_json::from_str(r#"{"pub":"k1"}"#).unwrap();
        assert_eq!(keyed.key(), "k1");

        let plain: IdentityHint = serde_json::from_str(r#""k2""#).unwrap();
        assert_eq!(plain.key(), "k2");
    }

    #[test]
    fn test_malformed_json_is_an_error_not_a_panic() {
        assert!(WireMessage::from_json("{not json").is_err());
    }
}
