//! The pre-authorization cache.
//!
//! A short-lived allow-list keyed by identity, fed by successful chain
//! verifications and administrative force-grants. Expired entries are
//! evicted lazily on lookup; a periodic [`PreAuthCache::sweep`] is
//! available for memory hygiene under heavy one-shot traffic but is
//! not required for correctness.

use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use graphgate_core::Identity;

/// A time-bounded cached allow decision for one identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreAuthorization {
    /// The authorized identity.
    pub identity: Identity,
    /// When the grant was recorded, Unix milliseconds.
    pub authorized_at: i64,
    /// When it lapses. Valid strictly before this instant.
    pub expires_at: i64,
}

impl PreAuthorization {
    /// Whether the grant is live at `now` (Unix milliseconds).
    pub fn is_valid(&self, now: i64) -> bool {
        now < self.expires_at
    }
}

/// Mutable shared state of the gateway: the identity allow-list.
///
/// Owned by the resolver and injected by reference, never a module
/// singleton, so separate gateway instances cannot cross-contaminate.
/// Concurrent grants for the same identity are idempotent: last write
/// wins, TTLs are independent, not additive.
#[derive(Default)]
pub struct PreAuthCache {
    entries: RwLock<HashMap<Identity, PreAuthorization>>,
}

impl PreAuthCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `identity` holds a live grant. Evicts on read if the
    /// entry has lapsed.
    pub async fn is_valid(&self, identity: &Identity) -> bool {
        self.is_valid_at(identity, now_millis()).await
    }

    /// [`Self::is_valid`] against an explicit clock, for deterministic
    /// boundary tests.
    pub async fn is_valid_at(&self, identity: &Identity, now: i64) -> bool {
        self.get_at(identity, now).await.is_some()
    }

    /// The live grant for `identity`, if any. Evicts a lapsed entry.
    pub async fn get(&self, identity: &Identity) -> Option<PreAuthorization> {
        self.get_at(identity, now_millis()).await
    }

    async fn get_at(&self, identity: &Identity, now: i64) -> Option<PreAuthorization> {
        let mut entries = self.entries.write().await;
        match entries.get(identity) {
            Some(entry) if entry.is_valid(now) => Some(entry.clone()),
            Some(_) => {
                debug!(identity = %identity, "evicting expired pre-authorization");
                entries.remove(identity);
                None
            }
            None => None,
        }
    }

    /// Record a grant for `identity`, replacing any existing one.
    pub async fn grant(&self, identity: &Identity, ttl: Duration) -> PreAuthorization {
        self.grant_at(identity, ttl, now_millis()).await
    }

    /// [`Self::grant`] against an explicit clock.
    pub async fn grant_at(
        &self,
        identity: &Identity,
        ttl: Duration,
        now: i64,
    ) -> PreAuthorization {
        let entry = PreAuthorization {
            identity: identity.clone(),
            authorized_at: now,
            expires_at: now + ttl.as_millis() as i64,
        };
        self.entries
            .write()
            .await
            .insert(identity.clone(), entry.clone());
        debug!(identity = %identity, expires_at = entry.expires_at, "pre-authorization granted");
        entry
    }

    /// Record a grant on administrative authority, bypassing any
    /// verification. Callers must have already matched the system
    /// secret.
    pub async fn force_grant(&self, identity: &Identity, ttl: Duration) -> PreAuthorization {
        info!(identity = %identity, ttl_ms = ttl.as_millis() as u64, "forced pre-authorization");
        self.grant(identity, ttl).await
    }

    /// Drop every lapsed entry. Returns how many were removed.
    pub async fn sweep(&self) -> usize {
        self.sweep_at(now_millis()).await
    }

    /// [`Self::sweep`] against an explicit clock.
    pub async fn sweep_at(&self, now: i64) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_valid(now));
        before - entries.len()
    }

    /// Number of entries currently held, live or lapsed.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// Current time as Unix milliseconds.
fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
