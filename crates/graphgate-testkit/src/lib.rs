//! # Graphgate Testkit
//!
//! Testing utilities for the Graphgate gateway.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: writer identities backed by real keypairs, encoded
//!   exactly as the graph encodes them, plus message builders
//! - **Generators**: proptest strategies for identities, souls, and
//!   wire messages
//!
//! ## Test Fixtures
//!
//! ```rust
//! use graphgate_testkit::fixtures::TestFixture;
//!
//! let writer = TestFixture::with_seed([1u8; 32]);
//! let msg = writer.owned_write("profile", serde_json::json!({"name": "alice"}));
//! assert!(msg.has_put());
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{anonymous_write, multi_party_fixtures, TestFixture};
