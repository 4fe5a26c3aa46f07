//! Error types for Graphgate Core.

use thiserror::Error;

/// Core errors that can occur while parsing messages or converting keys.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("empty identity")]
    EmptyIdentity,

    #[error("invalid key character: {0:?}")]
    InvalidKeyCharacter(char),

    #[error("base64 decode failed: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    #[error("hex decode failed: {0}")]
    HexDecode(#[from] hex::FromHexError),

    #[error("malformed message: {0}")]
    MalformedMessage(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
