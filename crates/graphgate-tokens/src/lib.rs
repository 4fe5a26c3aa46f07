//! # Graphgate Tokens
//!
//! Signed bearer credentials for the Graphgate gateway.
//!
//! ## Overview
//!
//! Tokens let writers who are not (or not yet) chain-verified present a
//! credential obtained out-of-band, typically from a login or
//! registration flow, as a header on their writes. A token is
//! self-contained: claims plus
//! an HMAC-SHA256 over them, both base64url encoded.
//!
//! - [`TokenService::issue`] builds and signs a claim set
//! - [`TokenService::verify`] checks signature and expiry, returning
//!   `None` on any defect
//!
//! Revocation state lives in the graph itself and is out of scope here;
//! the [`Claims::token_id`] exists so such a layer can reference tokens.

pub mod claims;
pub mod error;
pub mod service;

pub use claims::{Claims, PERMISSION_CHAIN_VERIFIED, PERMISSION_USER};
pub use error::{Result, TokenError};
pub use service::TokenService;
