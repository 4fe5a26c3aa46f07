//! # Graphgate Registry
//!
//! On-chain membership verification for the Graphgate gateway.
//!
//! ## Overview
//!
//! Relays may anchor write authorization in one or more on-chain
//! registries: contracts recording which identities are current
//! members. This crate provides:
//!
//! - [`RegistryClient`] - The query seam, implemented over JSON-RPC
//!   ([`EthRpcClient`]) and in memory for tests
//! - [`ChainVerifier`] - Timeout-bounded, fail-closed membership
//!   verification across every configured endpoint
//!
//! ## Fail-closed
//!
//! A slow, unreachable, or erroring registry never authorizes a writer
//! and never hangs the caller: each query is bounded by
//! [`ChainVerifierConfig::query_timeout`] and every failure collapses
//! to `false`.

pub mod client;
pub mod endpoint;
pub mod error;
pub mod rpc;
pub mod verifier;

pub use client::{memory::MemoryRegistry, RegistryClient};
pub use endpoint::RegistryEndpoint;
pub use error::{RegistryError, Result};
pub use rpc::EthRpcClient;
pub use verifier::{ChainVerifier, ChainVerifierConfig};
