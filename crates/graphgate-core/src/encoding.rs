//! Key-encoding conversion between the graph and chain alphabets.
//!
//! The graph encodes public keys in a URL-safe base64-like alphabet;
//! on-chain registries expect a `0x`-prefixed lowercase hex byte string.
//! Conversion is pure and side-effect-free, and returns an error (never
//! panics) on malformed input.

use base64::Engine;

use crate::error::{CoreError, Result};
use crate::identity::{AUX_DELIMITER, OWNED_SIGIL};

const ENGINE: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD;

/// Convert a graph-encoded key to the chain-side hex form.
///
/// Steps: strip an optional leading ownership sigil, truncate at the
/// first auxiliary-data delimiter, map the URL-safe alphabet to standard
/// base64, pad to a multiple of four characters, decode, and re-encode
/// as `0x`-prefixed lowercase hex.
pub fn graph_key_to_chain_hex(key: &str) -> Result<String> {
    let key = key.strip_prefix(OWNED_SIGIL).unwrap_or(key);
    let key = key.split(AUX_DELIMITER).next().unwrap_or(key);
    if key.is_empty() {
        return Err(CoreError::EmptyIdentity);
    }

    let mut standard = String::with_capacity(key.len() + 3);
    for c in key.chars() {
        match c {
            '-' => standard.push('+'),
            '_' => standard.push('/'),
            'A'..='Z' | 'a'..='z' | '0'..='9' | '+' | '/' => standard.push(c),
            other => return Err(CoreError::InvalidKeyCharacter(other)),
        }
    }
    while standard.len() % 4 != 0 {
        standard.push('=');
    }

    let bytes = ENGINE.decode(&standard)?;
    Ok(format!("0x{}", hex::encode(bytes)))
}

/// Inverse of [`graph_key_to_chain_hex`]: hex back to the graph's
/// URL-safe alphabet, without padding.
pub fn chain_hex_to_graph_key(hex_key: &str) -> Result<String> {
    let hex_key = hex_key.strip_prefix("0x").unwrap_or(hex_key);
    if hex_key.is_empty() {
        return Err(CoreError::EmptyIdentity);
    }

    let bytes = hex::decode(hex_key)?;
    let standard = ENGINE.encode(bytes);
    Ok(standard
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect())
}
