//! The authorization resolver.
//!
//! Consults the ordered tier list and returns the first tier's
//! decision; if every tier abstains, the write is denied. Fail closed:
//! there is no path from a verification failure to an allowance.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use graphgate_core::WireMessage;
use graphgate_registry::ChainVerifier;
use graphgate_tokens::TokenService;

use crate::cache::PreAuthCache;
use crate::decision::Decision;
use crate::tier::{
    CacheTier, ChainTier, SystemSecretTier, TierEvaluator, TokenTier, WriteContext,
};

/// Default TTL for cache entries written through by chain successes.
pub const DEFAULT_WRITE_THROUGH_TTL: Duration = Duration::from_secs(60 * 60);

/// Orders the configured tiers and resolves writes against them.
pub struct Resolver {
    tiers: Vec<Box<dyn TierEvaluator>>,
}

impl Resolver {
    /// Build a resolver from an explicit tier list. The list order is
    /// the consultation order.
    pub fn new(tiers: Vec<Box<dyn TierEvaluator>>) -> Self {
        Self { tiers }
    }

    /// Start a builder around the shared pre-authorization cache.
    pub fn builder(cache: Arc<PreAuthCache>) -> ResolverBuilder {
        ResolverBuilder::new(cache)
    }

    /// Resolve a write to a single decision.
    ///
    /// The identity is extracted once; tiers that require one abstain
    /// when it is absent. First match wins.
    pub async fn authorize(&self, message: &WireMessage) -> Decision {
        let ctx = WriteContext::new(message);
        for tier in &self.tiers {
            if let Some(decision) = tier.evaluate(&ctx).await {
                debug!(tier = tier.name(), msg_id = ?message.id, "authorization tier matched");
                return decision;
            }
        }
        debug!(msg_id = ?message.id, "no authorization tier matched");
        Decision::denied()
    }
}

/// Assembles the canonical tier order from the configured trust
/// sources: system secret, cache, chain, token.
pub struct ResolverBuilder {
    cache: Arc<PreAuthCache>,
    system_secret: Option<String>,
    chain: Option<(Arc<ChainVerifier>, Duration)>,
    tokens: Option<Arc<TokenService>>,
}

impl ResolverBuilder {
    fn new(cache: Arc<PreAuthCache>) -> Self {
        Self {
            cache,
            system_secret: None,
            chain: None,
            tokens: None,
        }
    }

    /// Enable the system-secret tier.
    pub fn with_system_secret(mut self, secret: impl Into<String>) -> Self {
        self.system_secret = Some(secret.into());
        self
    }

    /// Enable the chain tier, writing successes through to the cache
    /// with the given TTL.
    pub fn with_chain(mut self, verifier: Arc<ChainVerifier>, write_through_ttl: Duration) -> Self {
        self.chain = Some((verifier, write_through_ttl));
        self
    }

    /// Enable the token tier.
    pub fn with_tokens(mut self, tokens: Arc<TokenService>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Build the resolver. The cache tier is always present; optional
    /// tiers slot into their fixed positions.
    pub fn build(self) -> Resolver {
        let mut tiers: Vec<Box<dyn TierEvaluator>> = Vec::new();
        if let Some(secret) = self.system_secret {
            tiers.push(Box::new(SystemSecretTier::new(secret)));
        }
        tiers.push(Box::new(CacheTier::new(Arc::clone(&self.cache))));
        if let Some((verifier, ttl)) = self.chain {
            tiers.push(Box::new(ChainTier::new(
                verifier,
                Arc::clone(&self.cache),
                ttl,
            )));
        }
        if let Some(tokens) = self.tokens {
            tiers.push(Box::new(TokenTier::new(tokens)));
        }
        Resolver::new(tiers)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use graphgate_core::Identity;
    use graphgate_registry::{MemoryRegistry, RegistryClient, RegistryEndpoint};

    use super::*;
    use crate::decision::Tier;

    // 3-byte identity, chain-encodable without padding.
    const KEY: &str = "AAEC";

    fn write_from(key: &str) -> WireMessage {
        let mut put = BTreeMap::new();
        put.insert(format!("~{key}.profile"), serde_json::json!({"v": 1}));
        WireMessage {
            id: Some("m1".into()),
            put: Some(put),
            ..WireMessage::default()
        }
    }

    fn anonymous_write() -> WireMessage {
        let mut put = BTreeMap::new();
        put.insert("public/notes".to_string(), serde_json::json!({"v": 1}));
        WireMessage {
            id: Some("m2".into()),
            put: Some(put),
            ..WireMessage::default()
        }
    }

    fn cache_only_resolver() -> (Resolver, Arc<PreAuthCache>) {
        let cache = Arc::new(PreAuthCache::new());
        (Resolver::builder(Arc::clone(&cache)).build(), cache)
    }

    #[tokio::test]
    async fn test_fail_closed_when_nothing_matches() {
        let (resolver, _) = cache_only_resolver();
        assert_eq!(resolver.authorize(&anonymous_write()).await, Decision::denied());
        assert_eq!(resolver.authorize(&write_from(KEY)).await, Decision::denied());
    }

    #[tokio::test]
    async fn test_system_secret_short_circuits_everything() {
        let cache = Arc::new(PreAuthCache::new());
        let tokens = Arc::new(TokenService::new(b"token-secret".to_vec()).unwrap());
        let resolver = Resolver::builder(Arc::clone(&cache))
            .with_system_secret("admin-secret")
            .with_tokens(tokens)
            .build();

        // No identity, no cache entry, no valid token: the secret alone
        // decides.
        let mut msg = anonymous_write();
        msg.set_header("token", "admin-secret");
        let decision = resolver.authorize(&msg).await;
        assert_eq!(decision.tier(), Some(Tier::System));
    }

    #[tokio::test]
    async fn test_cached_identity_is_allowed() {
        let (resolver, cache) = cache_only_resolver();
        cache
            .grant(&Identity::new(KEY), Duration::from_secs(300))
            .await;

        let decision = resolver.authorize(&write_from(KEY)).await;
        assert_eq!(decision.tier(), Some(Tier::Cache));
    }

    #[tokio::test]
    async fn test_chain_success_writes_through_to_cache() {
        let registry = Arc::new(MemoryRegistry::new());
        let identity = Identity::new(KEY);
        registry
            .add_member("0xaaaa", &identity.to_chain_hex().unwrap())
            .await;

        let verifier = Arc::new(ChainVerifier::new(
            Arc::clone(&registry) as Arc<dyn RegistryClient>,
            vec![RegistryEndpoint::new("0xaaaa", "mem://a")],
        ));

        let cache = Arc::new(PreAuthCache::new());
        let resolver = Resolver::builder(Arc::clone(&cache))
            .with_chain(verifier, Duration::from_secs(3600))
            .build();

        let first = resolver.authorize(&write_from(KEY)).await;
        assert_eq!(first.tier(), Some(Tier::Chain));
        assert_eq!(registry.call_count(), 1);
        assert!(cache.is_valid(&identity).await);

        // Second write within the TTL hits the cache, no registry RPC.
        let second = resolver.authorize(&write_from(KEY)).await;
        assert_eq!(second.tier(), Some(Tier::Cache));
        assert_eq!(registry.call_count(), 1);
    }

    #[tokio::test]
    async fn test_null_identity_skips_identity_tiers() {
        let registry = Arc::new(MemoryRegistry::new());
        let verifier = Arc::new(ChainVerifier::new(
            Arc::clone(&registry) as Arc<dyn RegistryClient>,
            vec![RegistryEndpoint::new("0xaaaa", "mem://a")],
        ));
        let tokens = Arc::new(TokenService::new(b"token-secret".to_vec()).unwrap());

        let cache = Arc::new(PreAuthCache::new());
        let resolver = Resolver::builder(cache)
            .with_chain(verifier, Duration::from_secs(3600))
            .with_tokens(Arc::clone(&tokens))
            .build();

        // Anonymous write with a valid token: tiers 2-3 are skipped and
        // the token tier matches without any registry query.
        let token = tokens
            .issue("K1", "session", Duration::from_secs(3600), false)
            .unwrap();
        let mut msg = anonymous_write();
        msg.set_header("token", token);

        let decision = resolver.authorize(&msg).await;
        assert_eq!(decision.tier(), Some(Tier::Token));
        assert_eq!(registry.call_count(), 0);
    }

    #[tokio::test]
    async fn test_chain_denial_falls_through_to_token() {
        let registry = Arc::new(MemoryRegistry::new());
        let verifier = Arc::new(ChainVerifier::new(
            registry as Arc<dyn RegistryClient>,
            vec![RegistryEndpoint::new("0xaaaa", "mem://a")],
        ));
        let tokens = Arc::new(TokenService::new(b"token-secret".to_vec()).unwrap());

        let resolver = Resolver::builder(Arc::new(PreAuthCache::new()))
            .with_chain(verifier, Duration::from_secs(3600))
            .with_tokens(Arc::clone(&tokens))
            .build();

        let token = tokens
            .issue(KEY, "session", Duration::from_secs(3600), false)
            .unwrap();
        let mut msg = write_from(KEY);
        msg.set_header("token", token);

        let decision = resolver.authorize(&msg).await;
        assert_eq!(decision.tier(), Some(Tier::Token));
    }

    #[tokio::test]
    async fn test_forced_grant_beats_chain_denial() {
        let registry = Arc::new(MemoryRegistry::new());
        let verifier = Arc::new(ChainVerifier::new(
            Arc::clone(&registry) as Arc<dyn RegistryClient>,
            vec![RegistryEndpoint::new("0xaaaa", "mem://a")],
        ));

        let cache = Arc::new(PreAuthCache::new());
        let resolver = Resolver::builder(Arc::clone(&cache))
            .with_chain(verifier, Duration::from_secs(3600))
            .build();

        cache
            .force_grant(&Identity::new(KEY), Duration::from_secs(300))
            .await;

        // The cache tier answers before the chain is ever consulted.
        let decision = resolver.authorize(&write_from(KEY)).await;
        assert_eq!(decision.tier(), Some(Tier::Cache));
        assert_eq!(registry.call_count(), 0);
    }
}
