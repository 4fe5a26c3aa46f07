//! # Graphgate
//!
//! A write-authorization gateway for a shared, eventually-consistent
//! property graph synchronized between untrusted peers.
//!
//! ## Overview
//!
//! Anyone can attempt to write; the relay decides, per write, whether
//! the actor may commit it, without stalling the synchronization
//! pipeline it sits inside. The gateway:
//!
//! - extracts the writer's identity from the message
//! - resolves it against an ordered hierarchy of trust sources
//!   (system secret, pre-authorization cache, on-chain membership,
//!   bearer token), failing closed on any ambiguity
//! - forwards the write or suppresses it with an explicit rejection ack
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use graphgate::{Gateway, GatewayConfig, HookPoint};
//! use graphgate::core::WireMessage;
//!
//! async fn example() {
//!     let config = GatewayConfig::new("token-signing-secret")
//!         .with_system_secret("admin-secret");
//!     let gateway = Gateway::new(config).unwrap();
//!
//!     let msg = WireMessage::from_json(r##"{"#":"m1","put":{"~Key":{}}}"##).unwrap();
//!     let action = gateway.check(HookPoint::Inbound, &msg).await;
//!     if action.is_forward() {
//!         // hand the message to the next pipeline stage
//!     }
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `graphgate::core` - Wire messages, identities, key encoding
//! - `graphgate::registry` - Chain verification
//! - `graphgate::tokens` - Bearer credentials
//! - `graphgate::auth` - Cache, tiers, resolver

pub mod config;
pub mod error;
pub mod gate;
pub mod gateway;
pub mod http;

// Re-export component crates
pub use graphgate_auth as auth;
pub use graphgate_core as core;
pub use graphgate_registry as registry;
pub use graphgate_tokens as tokens;

// Re-export main types for convenience
pub use config::{ChainConfig, GatewayConfig};
pub use error::{GatewayError, Result};
pub use gate::{GateAction, HookPoint, WriteGate};
pub use gateway::Gateway;
pub use http::admin_router;

// Re-export commonly used component types
pub use graphgate_auth::{Decision, DenyReason, PreAuthCache, PreAuthorization, Resolver, Tier};
pub use graphgate_core::{extract_identity, Identity, WireMessage};
pub use graphgate_registry::{ChainVerifier, RegistryClient, RegistryEndpoint};
pub use graphgate_tokens::{Claims, TokenService};
