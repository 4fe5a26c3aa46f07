//! Writer identities and identity extraction.
//!
//! A writer is identified by its public key in the graph's URL-safe
//! base64-like encoding. Extraction scans the write payload for an
//! owned-namespace soul first, then falls back to the message's
//! identity hints. All key-format sniffing lives here; call sites
//! consume only the extractor's output.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::encoding::{chain_hex_to_graph_key, graph_key_to_chain_hex};
use crate::error::Result;
use crate::message::WireMessage;

/// Sigil marking a soul as belonging to an identity's owned namespace.
pub const OWNED_SIGIL: char = '~';

/// Delimiter separating a key from auxiliary data encoded after it.
pub const AUX_DELIMITER: char = '.';

/// A writer's public key in the graph's URL-safe encoding.
///
/// The string is kept as presented on the wire; normalization (sigil
/// stripping, auxiliary-data truncation) happens only when converting
/// to the chain-side hex form.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity(String);

impl Identity {
    /// Wrap a raw key string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key string as presented on the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The key with the ownership sigil stripped and auxiliary data
    /// discarded.
    pub fn normalized(&self) -> &str {
        let key = self.0.strip_prefix(OWNED_SIGIL).unwrap_or(&self.0);
        key.split(AUX_DELIMITER).next().unwrap_or(key)
    }

    /// Convert to the fixed-width hex form used by on-chain registries.
    ///
    /// Fails on malformed input; callers treat failure as "no identity",
    /// never as a crash.
    pub fn to_chain_hex(&self) -> Result<String> {
        graph_key_to_chain_hex(&self.0)
    }

    /// Reconstruct an identity from its chain-side hex form.
    pub fn from_chain_hex(hex_key: &str) -> Result<Self> {
        chain_hex_to_graph_key(hex_key).map(Self)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short: String = self.0.chars().take(12).collect();
        write!(f, "Identity({short}..)")
    }
}

impl From<&str> for Identity {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Extract the candidate writer identity from a message.
///
/// Scan order:
/// 1. A soul in the write payload beginning with the owned-namespace
///    sigil; the identity is the substring between the sigil and the
///    first auxiliary-data delimiter.
/// 2. The `user` identity hint.
/// 3. The `from` identity hint.
/// 4. The top-level `pub` field.
///
/// Returns `None` when no candidate is present. A null identity means
/// "cannot authorize", never "no check needed".
pub fn extract_identity(msg: &WireMessage) -> Option<Identity> {
    for soul in msg.souls() {
        if let Some(rest) = soul.strip_prefix(OWNED_SIGIL) {
            let key = rest.split(AUX_DELIMITER).next().unwrap_or(rest);
            if !key.is_empty() {
                return Some(Identity::new(key));
            }
        }
    }

    for hint in [&msg.user, &msg.from] {
        if let Some(hint) = hint {
            let key = hint.key();
            if !key.is_empty() {
                return Some(Identity::new(key));
            }
        }
    }

    msg.pub_key
        .as_deref()
        .filter(|key| !key.is_empty())
        .map(Identity::new)
}
