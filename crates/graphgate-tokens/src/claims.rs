//! Token claims.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Base permission present in every issued token.
pub const PERMISSION_USER: &str = "user";

/// Permission asserting the subject passed on-chain verification.
///
/// Only the resolver sets this, and only after a chain-tier success;
/// login-flow callers must not fabricate it.
pub const PERMISSION_CHAIN_VERIFIED: &str = "chain-verified";

/// The signed claim set carried by a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The identity the token was issued to.
    pub subject: String,

    /// Unique id of this token, for listing and revocation bookkeeping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,

    /// Human-readable label chosen at issuance.
    pub name: String,

    /// Issuance time, Unix milliseconds.
    pub issued_at: i64,

    /// Expiry time, Unix milliseconds. A token is valid strictly
    /// before this instant.
    pub expires_at: i64,

    /// Granted permission set.
    pub permissions: BTreeSet<String>,

    /// Whether the subject was chain-verified at issuance.
    pub chain_verified: bool,
}

impl Claims {
    /// Whether the token has expired at `now` (Unix milliseconds).
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }

    /// Whether the claim set includes a permission.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}
