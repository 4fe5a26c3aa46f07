//! Gateway configuration.

use std::time::Duration;

use graphgate_registry::RegistryEndpoint;

use crate::error::{GatewayError, Result};

/// Configuration for the Gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// The shared administrative secret. When absent, the system tier
    /// is disabled.
    pub system_secret: Option<String>,

    /// Signing secret for the token service. Required.
    pub token_secret: String,

    /// Lifetime of tokens issued through [`crate::Gateway::issue_token`].
    pub token_ttl: Duration,

    /// On-chain verification. When absent, the chain tier is disabled.
    pub chain: Option<ChainConfig>,

    /// TTL for pre-authorizations recorded by chain write-through and
    /// the administrative surface.
    pub pre_auth_ttl: Duration,
}

/// On-chain verification settings.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Registry endpoints; membership in any one authorizes a writer.
    pub endpoints: Vec<RegistryEndpoint>,

    /// Per-endpoint query timeout.
    pub query_timeout: Duration,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
            query_timeout: Duration::from_secs(5),
        }
    }
}

impl GatewayConfig {
    /// Configuration with a token secret and defaults everywhere else.
    pub fn new(token_secret: impl Into<String>) -> Self {
        Self {
            system_secret: None,
            token_secret: token_secret.into(),
            token_ttl: Duration::from_secs(60 * 60),
            chain: None,
            pre_auth_ttl: Duration::from_secs(60 * 60),
        }
    }

    /// Set the administrative secret.
    pub fn with_system_secret(mut self, secret: impl Into<String>) -> Self {
        self.system_secret = Some(secret.into());
        self
    }

    /// Enable chain verification against the given endpoints.
    pub fn with_chain(mut self, chain: ChainConfig) -> Self {
        self.chain = Some(chain);
        self
    }

    /// Validate at startup. Configuration defects are fatal here and
    /// never surface per-write.
    pub fn validate(&self) -> Result<()> {
        if self.token_secret.is_empty() {
            return Err(GatewayError::Config("token secret must not be empty".into()));
        }
        if let Some(secret) = &self.system_secret {
            if secret.is_empty() {
                return Err(GatewayError::Config(
                    "system secret must not be empty when set".into(),
                ));
            }
        }
        if let Some(chain) = &self.chain {
            if chain.endpoints.is_empty() {
                return Err(GatewayError::Config(
                    "chain verification enabled with no registry endpoints".into(),
                ));
            }
        }
        Ok(())
    }
}
