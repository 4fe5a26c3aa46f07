//! Error types for the token module.

use thiserror::Error;

/// Errors that can occur while issuing tokens.
///
/// Verification deliberately has no error channel: any defect in a
/// presented token yields `None`, never an error in the caller's
/// control flow.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The service was constructed without a signing secret.
    #[error("token signing secret must not be empty")]
    EmptySecret,

    /// Claims could not be serialized.
    #[error("claims serialization failed: {0}")]
    Serialization(String),
}

/// Result type for token operations.
pub type Result<T> = std::result::Result<T, TokenError>;
