//! Authorization tiers.
//!
//! Each trust source is one evaluator returning `Some(decision)` when
//! it can rule on the write and `None` to pass to the next tier.
//! Adding or removing a tier never touches another tier's code; the
//! resolver composes them in order.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use graphgate_core::{extract_identity, Identity, WireMessage};
use graphgate_registry::ChainVerifier;
use graphgate_tokens::TokenService;

use crate::cache::PreAuthCache;
use crate::decision::{Decision, Tier};

/// Per-write evaluation context: the message plus its extracted
/// identity, computed once.
pub struct WriteContext<'a> {
    /// The write under evaluation.
    pub message: &'a WireMessage,
    /// The candidate writer identity, if one was extractable.
    pub identity: Option<Identity>,
}

impl<'a> WriteContext<'a> {
    /// Build a context, extracting the identity from the message.
    pub fn new(message: &'a WireMessage) -> Self {
        Self {
            identity: extract_identity(message),
            message,
        }
    }
}

/// One ordered trust source consulted by the resolver.
#[async_trait]
pub trait TierEvaluator: Send + Sync {
    /// Stable name for logging.
    fn name(&self) -> &'static str;

    /// `Some(decision)` if this tier can rule on the write, `None` to
    /// fall through to the next tier.
    async fn evaluate(&self, ctx: &WriteContext<'_>) -> Option<Decision>;
}

/// Tier 1: the shared administrative secret.
///
/// Matches on the exact secret presented as a bearer-style value or
/// raw header, bypassing identity extraction entirely.
pub struct SystemSecretTier {
    secret: String,
}

impl SystemSecretTier {
    /// Create the tier around the relay's administrative secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

#[async_trait]
impl TierEvaluator for SystemSecretTier {
    fn name(&self) -> &'static str {
        "system_secret"
    }

    async fn evaluate(&self, ctx: &WriteContext<'_>) -> Option<Decision> {
        // Every candidate header value is checked: an unrelated token
        // in one header must not shadow the secret in the other.
        ctx.message
            .credentials()
            .any(|presented| presented == self.secret)
            .then(|| Decision::allowed(Tier::System))
    }
}

/// Tier 2: the pre-authorization cache.
pub struct CacheTier {
    cache: Arc<PreAuthCache>,
}

impl CacheTier {
    /// Create the tier over a shared cache.
    pub fn new(cache: Arc<PreAuthCache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl TierEvaluator for CacheTier {
    fn name(&self) -> &'static str {
        "pre_auth_cache"
    }

    async fn evaluate(&self, ctx: &WriteContext<'_>) -> Option<Decision> {
        let identity = ctx.identity.as_ref()?;
        if self.cache.is_valid(identity).await {
            Some(Decision::allowed(Tier::Cache))
        } else {
            None
        }
    }
}

/// Tier 3: on-chain membership.
///
/// On success the identity is written through to the cache so repeat
/// writes from the same peer skip the registry round trip.
pub struct ChainTier {
    verifier: Arc<ChainVerifier>,
    cache: Arc<PreAuthCache>,
    write_through_ttl: Duration,
}

impl ChainTier {
    /// Create the tier over a verifier and the shared cache.
    pub fn new(
        verifier: Arc<ChainVerifier>,
        cache: Arc<PreAuthCache>,
        write_through_ttl: Duration,
    ) -> Self {
        Self {
            verifier,
            cache,
            write_through_ttl,
        }
    }
}

#[async_trait]
impl TierEvaluator for ChainTier {
    fn name(&self) -> &'static str {
        "chain_verification"
    }

    async fn evaluate(&self, ctx: &WriteContext<'_>) -> Option<Decision> {
        let identity = ctx.identity.as_ref()?;
        if self.verifier.is_authorized(identity).await {
            self.cache.grant(identity, self.write_through_ttl).await;
            debug!(identity = %identity, "chain verification cached");
            Some(Decision::allowed(Tier::Chain))
        } else {
            None
        }
    }
}

/// Tier 4: signed bearer tokens.
pub struct TokenTier {
    tokens: Arc<TokenService>,
}

impl TokenTier {
    /// Create the tier over the token service.
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl TierEvaluator for TokenTier {
    fn name(&self) -> &'static str {
        "bearer_token"
    }

    async fn evaluate(&self, ctx: &WriteContext<'_>) -> Option<Decision> {
        for presented in ctx.message.credentials() {
            if let Some(claims) = self.tokens.verify(presented) {
                return Some(Decision::allowed_with_permissions(
                    Tier::Token,
                    claims.permissions,
                ));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn write_message(soul: &str) -> WireMessage {
        let mut put = BTreeMap::new();
        put.insert(soul.to_string(), serde_json::json!({}));
        WireMessage {
            id: Some("m1".into()),
            put: Some(put),
            ..WireMessage::default()
        }
    }

    #[tokio::test]
    async fn test_system_secret_exact_match_only() {
        let tier = SystemSecretTier::new("s3cret");

        let mut msg = write_message("~K1");
        msg.set_header("token", "s3cret");
        let ctx = WriteContext::new(&msg);
        assert_eq!(
            tier.evaluate(&ctx).await,
            Some(Decision::allowed(Tier::System))
        );

        msg.set_header("token", "s3cret2");
        let ctx = WriteContext::new(&msg);
        assert_eq!(tier.evaluate(&ctx).await, None);
    }

    #[tokio::test]
    async fn test_system_secret_via_authorization_header() {
        let tier = SystemSecretTier::new("s3cret");
        let mut msg = write_message("~K1");
        msg.set_header("authorization", "Bearer s3cret");
        let ctx = WriteContext::new(&msg);
        assert!(tier.evaluate(&ctx).await.is_some());
    }

    #[tokio::test]
    async fn test_system_secret_not_shadowed_by_token_header() {
        let tier = SystemSecretTier::new("s3cret");

        // An unrelated value in the token header must not hide the
        // secret carried in the authorization header.
        let mut msg = write_message("~K1");
        msg.set_header("token", "junk-token");
        msg.set_header("authorization", "Bearer s3cret");
        let ctx = WriteContext::new(&msg);
        assert_eq!(
            tier.evaluate(&ctx).await,
            Some(Decision::allowed(Tier::System))
        );
    }

    #[tokio::test]
    async fn test_cache_tier_requires_identity() {
        let cache = Arc::new(PreAuthCache::new());
        cache
            .grant(&Identity::new("K1"), Duration::from_secs(60))
            .await;
        let tier = CacheTier::new(cache);

        // No extractable identity: the tier abstains.
        let msg = write_message("plain-soul");
        let ctx = WriteContext::new(&msg);
        assert_eq!(tier.evaluate(&ctx).await, None);

        let msg = write_message("~K1.profile");
        let ctx = WriteContext::new(&msg);
        assert_eq!(
            tier.evaluate(&ctx).await,
            Some(Decision::allowed(Tier::Cache))
        );
    }

    #[tokio::test]
    async fn test_token_tier_attaches_permissions() {
        let tokens = Arc::new(TokenService::new(b"k".to_vec()).unwrap());
        let tier = TokenTier::new(Arc::clone(&tokens));

        let token = tokens
            .issue("K1", "session", Duration::from_secs(60), true)
            .unwrap();
        let mut msg = write_message("plain-soul");
        msg.set_header("token", token);

        let ctx = WriteContext::new(&msg);
        let decision = tier.evaluate(&ctx).await.unwrap();
        match decision {
            Decision::Allowed { tier, permissions } => {
                assert_eq!(tier, Tier::Token);
                assert!(permissions.contains("user"));
                assert!(permissions.contains("chain-verified"));
            }
            Decision::Denied { .. } => panic!("expected allowed"),
        }
    }

    #[tokio::test]
    async fn test_token_tier_checks_every_credential() {
        let tokens = Arc::new(TokenService::new(b"k".to_vec()).unwrap());
        let tier = TokenTier::new(Arc::clone(&tokens));

        let token = tokens
            .issue("K1", "session", Duration::from_secs(60), false)
            .unwrap();
        let mut msg = write_message("plain-soul");
        msg.set_header("token", "junk-token");
        msg.set_header("authorization", format!("Bearer {token}"));

        let ctx = WriteContext::new(&msg);
        assert!(tier.evaluate(&ctx).await.is_some());
    }

    #[tokio::test]
    async fn test_token_tier_abstains_on_invalid_token() {
        let tokens = Arc::new(TokenService::new(b"k".to_vec()).unwrap());
        let tier = TokenTier::new(tokens);

        let mut msg = write_message("plain-soul");
        msg.set_header("token", "garbage");
        let ctx = WriteContext::new(&msg);
        assert_eq!(tier.evaluate(&ctx).await, None);
    }
}
