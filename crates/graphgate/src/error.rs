//! Error types for the Gateway.

use thiserror::Error;

use graphgate_tokens::TokenError;

/// Errors that can occur while constructing or operating the gateway.
///
/// Per-write verification never produces these: denial is a decision,
/// not an error. Only programming errors (bad configuration) surface
/// here, at startup.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Token service failure.
    #[error("token error: {0}")]
    Token(#[from] TokenError),
}

/// Result type for Gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
