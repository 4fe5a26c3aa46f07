//! The Gateway: unified API for write authorization.
//!
//! Wires configuration into the resolver, cache, chain verifier, and
//! token service, and exposes the gate plus the administrative
//! operations consumed by the HTTP surface and login collaborators.

use std::sync::Arc;

use tracing::info;

use graphgate_auth::{Decision, PreAuthCache, PreAuthorization, Resolver};
use graphgate_core::{Identity, WireMessage};
use graphgate_registry::{ChainVerifier, ChainVerifierConfig, EthRpcClient, RegistryClient};
use graphgate_tokens::{Claims, TokenService};

use crate::config::GatewayConfig;
use crate::error::Result;
use crate::gate::{GateAction, HookPoint, WriteGate};

/// The main Gateway struct.
///
/// One instance per relay. Holds the only mutable state in the core
/// (the pre-authorization cache); everything else is stateless per
/// call, so a single instance serves any number of concurrent checks.
pub struct Gateway {
    config: GatewayConfig,
    cache: Arc<PreAuthCache>,
    tokens: Arc<TokenService>,
    verifier: Option<Arc<ChainVerifier>>,
    gate: WriteGate,
}

impl Gateway {
    /// Create a gateway with the production JSON-RPC registry client.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        Self::with_registry_client(config, Arc::new(EthRpcClient::new()))
    }

    /// Create a gateway with an injected registry client.
    ///
    /// This is the seam tests and embedders use to supply their own
    /// chain transport.
    pub fn with_registry_client(
        config: GatewayConfig,
        registry_client: Arc<dyn RegistryClient>,
    ) -> Result<Self> {
        config.validate()?;

        let cache = Arc::new(PreAuthCache::new());
        let tokens = Arc::new(TokenService::new(config.token_secret.as_bytes().to_vec())?);

        let verifier = config.chain.as_ref().map(|chain| {
            Arc::new(ChainVerifier::with_config(
                registry_client,
                chain.endpoints.clone(),
                ChainVerifierConfig {
                    query_timeout: chain.query_timeout,
                },
            ))
        });

        let mut builder = Resolver::builder(Arc::clone(&cache));
        if let Some(secret) = &config.system_secret {
            builder = builder.with_system_secret(secret.clone());
        }
        if let Some(verifier) = &verifier {
            builder = builder.with_chain(Arc::clone(verifier), config.pre_auth_ttl);
        }
        builder = builder.with_tokens(Arc::clone(&tokens));
        let resolver = Arc::new(builder.build());

        info!(
            system_tier = config.system_secret.is_some(),
            chain_tier = verifier.is_some(),
            "gateway initialized"
        );

        Ok(Self {
            gate: WriteGate::new(resolver),
            config,
            cache,
            tokens,
            verifier,
        })
    }

    /// The write gate for hook integration.
    pub fn gate(&self) -> &WriteGate {
        &self.gate
    }

    /// The shared pre-authorization cache.
    pub fn cache(&self) -> &Arc<PreAuthCache> {
        &self.cache
    }

    /// Resolve a message to a decision.
    pub async fn authorize(&self, message: &WireMessage) -> Decision {
        self.gate.authorize(message).await
    }

    /// Check a message at a hook point. See [`WriteGate::check`].
    pub async fn check(&self, hook: HookPoint, message: &WireMessage) -> GateAction {
        self.gate.check(hook, message).await
    }

    /// Issue a bearer token for `subject` with the configured TTL.
    ///
    /// `chain_verified` must only be asserted after an actual chain
    /// verification; login flows pass false.
    pub fn issue_token(&self, subject: &str, name: &str, chain_verified: bool) -> Result<String> {
        Ok(self
            .tokens
            .issue(subject, name, self.config.token_ttl, chain_verified)?)
    }

    /// Verify a presented bearer token.
    pub fn verify_token(&self, token: &str) -> Option<Claims> {
        self.tokens.verify(token)
    }

    /// Whether `presented` is the administrative secret.
    pub fn is_system_secret(&self, presented: &str) -> bool {
        self.config
            .system_secret
            .as_deref()
            .is_some_and(|secret| secret == presented)
    }

    /// Return the live grant for `identity`, or attempt chain
    /// verification and grant on success.
    pub async fn pre_authorize(&self, identity: &Identity) -> Option<PreAuthorization> {
        if let Some(entry) = self.cache.get(identity).await {
            return Some(entry);
        }
        let verifier = self.verifier.as_ref()?;
        if verifier.is_authorized(identity).await {
            Some(self.cache.grant(identity, self.config.pre_auth_ttl).await)
        } else {
            None
        }
    }

    /// Grant on administrative authority, bypassing chain verification.
    ///
    /// Callers must have already checked [`Gateway::is_system_secret`].
    pub async fn force_pre_authorize(&self, identity: &Identity) -> PreAuthorization {
        self.cache
            .force_grant(identity, self.config.pre_auth_ttl)
            .await
    }
}
