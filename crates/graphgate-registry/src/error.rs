//! Error types for the registry module.

use thiserror::Error;

/// Errors that can occur while querying a registry endpoint.
///
/// These never escape the chain verifier: every failure degrades to
/// "not authorized by this endpoint".
#[derive(Debug, Error)]
pub enum RegistryError {
    /// HTTP transport failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider returned a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The provider response did not match the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Hex decoding of call data or results failed.
    #[error("hex error: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Injected failure (test registries only).
    #[error("registry unavailable: {0}")]
    Unavailable(String),
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
