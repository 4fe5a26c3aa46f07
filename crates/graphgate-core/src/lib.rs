//! # Graphgate Core
//!
//! Pure primitives for the Graphgate write-authorization gateway:
//! wire messages, writer identities, and key-encoding conversion.
//!
//! This crate contains no I/O, no networking, no clocks. It is pure
//! computation over the graph's wire envelope.
//!
//! ## Key Types
//!
//! - [`WireMessage`] - The typed JSON envelope exchanged between peers
//! - [`Identity`] - A writer's public key in the graph's URL-safe encoding
//! - [`extract_identity`] - The single place that sniffs key formats
//!
//! ## Encoding
//!
//! On-chain registries address members by hex byte strings. See
//! [`encoding`] for the deterministic conversion between the graph's
//! URL-safe base64 alphabet and the chain's `0x`-hex form.

pub mod encoding;
pub mod error;
pub mod identity;
pub mod message;

pub use encoding::{chain_hex_to_graph_key, graph_key_to_chain_hex};
pub use error::{CoreError, Result};
pub use identity::{extract_identity, Identity, AUX_DELIMITER, OWNED_SIGIL};
pub use message::{IdentityHint, WireMessage, AUTHORIZATION_HEADER, TOKEN_HEADER};
