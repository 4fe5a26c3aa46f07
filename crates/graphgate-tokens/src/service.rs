//! Token issuance and verification.
//!
//! Tokens are compact bearer credentials: the claims JSON, base64url
//! encoded, joined by a dot to a base64url HMAC-SHA256 over the same
//! bytes. No per-token store is needed for validation; tokens may be
//! obtained out-of-band (login flows) and presented later as headers
//! on writes.

use std::collections::BTreeSet;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::Engine;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use tracing::debug;

use crate::claims::{Claims, PERMISSION_CHAIN_VERIFIED, PERMISSION_USER};
use crate::error::{Result, TokenError};

type HmacSha256 = Hmac<Sha256>;

const ENGINE: base64::engine::GeneralPurpose = base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Issues and verifies signed bearer tokens with a service-wide secret.
pub struct TokenService {
    secret: Vec<u8>,
}

impl TokenService {
    /// Create a service around a signing secret.
    ///
    /// An empty secret is a configuration defect and fails here, at
    /// startup, rather than surfacing per-write.
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        Ok(Self { secret })
    }

    /// Issue a token for `subject`.
    ///
    /// The permission set always includes the base `user` permission;
    /// `chain-verified` is included only when the caller asserts prior
    /// chain verification.
    pub fn issue(
        &self,
        subject: &str,
        name: &str,
        ttl: Duration,
        chain_verified: bool,
    ) -> Result<String> {
        self.issue_with_permissions(subject, name, ttl, [], chain_verified)
    }

    /// Issue a token carrying extra permissions on top of the base set.
    pub fn issue_with_permissions(
        &self,
        subject: &str,
        name: &str,
        ttl: Duration,
        extra: impl IntoIterator<Item = String>,
        chain_verified: bool,
    ) -> Result<String> {
        let issued_at = now_millis();

        let mut permissions: BTreeSet<String> = extra.into_iter().collect();
        permissions.insert(PERMISSION_USER.to_string());
        if chain_verified {
            permissions.insert(PERMISSION_CHAIN_VERIFIED.to_string());
        }

        let claims = Claims {
            subject: subject.to_string(),
            token_id: Some(new_token_id(subject, issued_at)),
            name: name.to_string(),
            issued_at,
            expires_at: issued_at + ttl.as_millis() as i64,
            permissions,
            chain_verified,
        };

        self.encode(&claims)
    }

    /// Verify a presented token.
    ///
    /// Returns the claims iff the signature verifies and the token has
    /// not expired. Any defect yields `None`.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        self.verify_at(token, now_millis())
    }

    /// Verify against an explicit clock. Exposed for deterministic
    /// expiry tests.
    pub fn verify_at(&self, token: &str, now: i64) -> Option<Claims> {
        let (payload_b64, mac_b64) = token.split_once('.')?;
        let payload = ENGINE.decode(payload_b64).ok()?;
        let mac = ENGINE.decode(mac_b64).ok()?;

        let mut hmac = HmacSha256::new_from_slice(&self.secret).ok()?;
        hmac.update(&payload);
        if hmac.verify_slice(&mac).is_err() {
            debug!("token rejected: bad signature");
            return None;
        }

        let claims: Claims = serde_json::from_slice(&payload).ok()?;
        if claims.is_expired(now) {
            debug!(subject = %claims.subject, "token rejected: expired");
            return None;
        }
        Some(claims)
    }

    fn encode(&self, claims: &Claims) -> Result<String> {
        let payload =
            serde_json::to_vec(claims).map_err(|e| TokenError::Serialization(e.to_string()))?;

        let mut hmac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|_| TokenError::EmptySecret)?;
        hmac.update(&payload);
        let mac = hmac.finalize().into_bytes();

        Ok(format!(
            "{}.{}",
            ENGINE.encode(payload),
            ENGINE.encode(mac)
        ))
    }
}

/// Derive a unique token id from the subject, issuance time, and a
/// random nonce.
fn new_token_id(subject: &str, issued_at: i64) -> String {
    let mut nonce = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut nonce);

    let mut hasher = blake3::Hasher::new();
    hasher.update(subject.as_bytes());
    hasher.update(&issued_at.to_le_bytes());
    hasher.update(&nonce);
    hasher.finalize().to_hex()[..32].to_string()
}

/// Current time as Unix milliseconds.
fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
