//! Registry client abstraction.
//!
//! The client trait isolates the chain verifier from how a membership
//! query is actually performed. Production uses the JSON-RPC client in
//! [`crate::rpc`]; tests use the in-memory registry below.

use async_trait::async_trait;

use crate::endpoint::RegistryEndpoint;
use crate::error::Result;

/// Queries an on-chain registry for membership.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Whether `hex_identity` is a current member of the registry at
    /// `endpoint`. The identity is in the chain-side `0x`-hex encoding.
    async fn is_member_authorized(
        &self,
        endpoint: &RegistryEndpoint,
        hex_identity: &str,
    ) -> Result<bool>;
}

/// A simple in-memory registry for testing.
///
/// Supports latency and failure injection so timeout and fail-closed
/// behavior can be exercised without a network.
pub mod memory {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::sync::RwLock;

    use super::*;
    use crate::error::RegistryError;

    /// In-memory registry implementation.
    #[derive(Default)]
    pub struct MemoryRegistry {
        /// (contract address, hex identity) pairs that are members.
        members: RwLock<HashSet<(String, String)>>,
        /// Artificial delay applied to every query.
        latency: RwLock<Option<Duration>>,
        /// When set, every query fails with this message.
        failure: RwLock<Option<String>>,
        /// Total number of queries served (including failures).
        calls: AtomicUsize,
    }

    impl MemoryRegistry {
        /// Create an empty registry.
        pub fn new() -> Self {
            Self::default()
        }

        /// Register `hex_identity` as a member of the given contract.
        pub async fn add_member(&self, contract_address: &str, hex_identity: &str) {
            self.members
                .write()
                .await
                .insert((contract_address.to_string(), hex_identity.to_string()));
        }

        /// Remove a member.
        pub async fn remove_member(&self, contract_address: &str, hex_identity: &str) {
            self.members
                .write()
                .await
                .remove(&(contract_address.to_string(), hex_identity.to_string()));
        }

        /// Delay every subsequent query by `latency`.
        pub async fn set_latency(&self, latency: Duration) {
            *self.latency.write().await = Some(latency);
        }

        /// Make every subsequent query fail.
        pub async fn set_failure(&self, message: impl Into<String>) {
            *self.failure.write().await = Some(message.into());
        }

        /// Number of queries served so far.
        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RegistryClient for MemoryRegistry {
        async fn is_member_authorized(
            &self,
            endpoint: &RegistryEndpoint,
            hex_identity: &str,
        ) -> Result<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if let Some(latency) = *self.latency.read().await {
                tokio::time::sleep(latency).await;
            }
            if let Some(message) = self.failure.read().await.clone() {
                return Err(RegistryError::Unavailable(message));
            }

            let key = (
                endpoint.contract_address.clone(),
                hex_identity.to_string(),
            );
            Ok(self.members.read().await.contains(&key))
        }
    }
}
