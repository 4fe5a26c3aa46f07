//! # Graphgate Auth
//!
//! Authorization policy for the Graphgate gateway.
//!
//! ## Overview
//!
//! Four structurally different trust sources reconcile into one yes/no
//! decision per write:
//!
//! 1. **System secret** - the shared administrative credential
//! 2. **Pre-authorization cache** - a short-lived allow-list
//! 3. **Chain verification** - on-chain registry membership
//! 4. **Bearer token** - a signed out-of-band credential
//!
//! Each source is a [`TierEvaluator`]; the [`Resolver`] consults them
//! in that fixed order and short-circuits on the first match. If every
//! tier abstains the write is denied: there is no fail-open path.
//!
//! ## State
//!
//! The [`PreAuthCache`] is the only mutable shared state in the core.
//! It is injected into the resolver (never a module singleton) and fed
//! by chain-tier successes and administrative force-grants.
//!
//! Verification failures never surface as errors; they fold into the
//! [`Decision`], which is why this crate has no error type.

pub mod cache;
pub mod decision;
pub mod resolver;
pub mod tier;

pub use cache::{PreAuthCache, PreAuthorization};
pub use decision::{Decision, DenyReason, Tier};
pub use resolver::{Resolver, ResolverBuilder, DEFAULT_WRITE_THROUGH_TTL};
pub use tier::{
    CacheTier, ChainTier, SystemSecretTier, TierEvaluator, TokenTier, WriteContext,
};
