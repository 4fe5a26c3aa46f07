//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: realistic writer
//! identities backed by real keypairs, and message builders.

use std::collections::BTreeMap;
use std::time::Duration;

use base64::Engine;
use ed25519_dalek::SigningKey;

use graphgate_core::{Identity, WireMessage, OWNED_SIGIL};
use graphgate_tokens::TokenService;

const ENGINE: base64::engine::GeneralPurpose = base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// A test fixture representing one writer: a keypair whose public key
/// is encoded in the graph's URL-safe alphabet.
pub struct TestFixture {
    signing_key: SigningKey,
}

impl TestFixture {
    /// Create a fixture with a random keypair.
    pub fn new() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut rand::thread_rng()),
        }
    }

    /// Create with a deterministic keypair from a seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    /// The writer's identity in graph encoding.
    pub fn identity(&self) -> Identity {
        let bytes = self.signing_key.verifying_key().to_bytes();
        Identity::new(ENGINE.encode(bytes))
    }

    /// The identity in the chain-side hex encoding.
    pub fn chain_hex(&self) -> String {
        self.identity()
            .to_chain_hex()
            .expect("fixture identities are always chain-encodable")
    }

    /// A soul in this writer's owned namespace.
    pub fn owned_soul(&self, suffix: &str) -> String {
        format!("{}{}.{}", OWNED_SIGIL, self.identity(), suffix)
    }

    /// A write into this writer's owned namespace.
    pub fn owned_write(&self, suffix: &str, value: serde_json::Value) -> WireMessage {
        let mut put = BTreeMap::new();
        put.insert(self.owned_soul(suffix), value);
        WireMessage {
            id: Some(next_message_id()),
            put: Some(put),
            ..WireMessage::default()
        }
    }

    /// Issue a token for this writer from the given service.
    pub fn token(&self, service: &TokenService, ttl: Duration) -> String {
        service
            .issue(self.identity().as_str(), "test session", ttl, false)
            .expect("token issuance in fixtures")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A write to a soul outside any owned namespace, with no identity
/// hints.
pub fn anonymous_write(soul: &str, value: serde_json::Value) -> WireMessage {
    let mut put = BTreeMap::new();
    put.insert(soul.to_string(), value);
    WireMessage {
        id: Some(next_message_id()),
        put: Some(put),
        ..WireMessage::default()
    }
}

/// Create multiple fixtures for multi-writer tests.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            seed[1] = 0xA5;
            TestFixture::with_seed(seed)
        })
        .collect()
}

fn next_message_id() -> String {
    use rand::Rng;
    let n: u64 = rand::thread_rng().gen();
    format!("m{n:016x}")
}
