//! The chain verifier adapter.
//!
//! Converts a writer identity to its chain encoding and asks each
//! configured registry endpoint for membership, bounded by a per-call
//! timeout. Every failure mode (malformed key, RPC error, timeout)
//! degrades to "not authorized": the verifier never raises into the
//! gate and never hangs it.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use graphgate_core::Identity;

use crate::client::RegistryClient;
use crate::endpoint::RegistryEndpoint;

/// Configuration for chain verification.
#[derive(Debug, Clone)]
pub struct ChainVerifierConfig {
    /// Per-endpoint query timeout. An endpoint that exceeds it counts
    /// as not authorizing the writer.
    pub query_timeout: Duration,
}

impl Default for ChainVerifierConfig {
    fn default() -> Self {
        Self {
            query_timeout: Duration::from_secs(5),
        }
    }
}

/// Timeout-bounded membership verification across registry endpoints.
///
/// Authorization is a logical OR: a writer who is a member of any one
/// endpoint is authorized.
pub struct ChainVerifier {
    client: Arc<dyn RegistryClient>,
    endpoints: Vec<RegistryEndpoint>,
    config: ChainVerifierConfig,
}

impl ChainVerifier {
    /// Create a verifier with default configuration.
    pub fn new(client: Arc<dyn RegistryClient>, endpoints: Vec<RegistryEndpoint>) -> Self {
        Self::with_config(client, endpoints, ChainVerifierConfig::default())
    }

    /// Create a verifier with explicit configuration.
    pub fn with_config(
        client: Arc<dyn RegistryClient>,
        endpoints: Vec<RegistryEndpoint>,
        config: ChainVerifierConfig,
    ) -> Self {
        Self {
            client,
            endpoints,
            config,
        }
    }

    /// The configured endpoints.
    pub fn endpoints(&self) -> &[RegistryEndpoint] {
        &self.endpoints
    }

    /// Whether any configured registry authorizes this identity.
    ///
    /// Fail closed: returns false when the identity cannot be encoded,
    /// when every endpoint denies, and when every endpoint errors or
    /// times out.
    pub async fn is_authorized(&self, identity: &Identity) -> bool {
        let hex_identity = match identity.to_chain_hex() {
            Ok(hex_identity) => hex_identity,
            Err(e) => {
                debug!(identity = %identity, error = %e, "identity not chain-encodable");
                return false;
            }
        };

        for endpoint in &self.endpoints {
            let query = self.client.is_member_authorized(endpoint, &hex_identity);
            match tokio::time::timeout(self.config.query_timeout, query).await {
                Ok(Ok(true)) => {
                    debug!(
                        identity = %identity,
                        contract = %endpoint.contract_address,
                        "chain membership confirmed"
                    );
                    return true;
                }
                Ok(Ok(false)) => {}
                Ok(Err(e)) => {
                    warn!(
                        contract = %endpoint.contract_address,
                        error = %e,
                        "registry query failed, treating as not authorized"
                    );
                }
                Err(_) => {
                    warn!(
                        contract = %endpoint.contract_address,
                        timeout_ms = self.config.query_timeout.as_millis() as u64,
                        "registry query timed out, treating as not authorized"
                    );
                }
            }
        }

        false
    }
}
