//! JSON-RPC registry client.
//!
//! Queries a registry contract through a standard `eth_call` against the
//! provider named by the endpoint. The membership check is a read-only
//! call to `isAuthorized(bytes)` returning a single boolean word.

use async_trait::async_trait;
use serde::Deserialize;
use sha3::{Digest, Keccak256};
use tracing::debug;

use crate::client::RegistryClient;
use crate::endpoint::RegistryEndpoint;
use crate::error::{RegistryError, Result};

/// Solidity signature of the membership query.
const MEMBERSHIP_FUNCTION: &str = "isAuthorized(bytes)";

/// JSON-RPC registry client over HTTP.
pub struct EthRpcClient {
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

impl EthRpcClient {
    /// Create a client with a fresh HTTP connection pool.
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

impl Default for EthRpcClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RegistryClient for EthRpcClient {
    async fn is_member_authorized(
        &self,
        endpoint: &RegistryEndpoint,
        hex_identity: &str,
    ) -> Result<bool> {
        let data = encode_membership_call(hex_identity)?;
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [
                { "to": endpoint.contract_address, "data": data },
                "latest",
            ],
        });

        let response: RpcResponse = self
            .http
            .post(&endpoint.provider_url)
            .json(&request)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(RegistryError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        let result = response
            .result
            .ok_or_else(|| RegistryError::InvalidResponse("missing result".into()))?;
        let authorized = decode_bool_word(&result)?;
        debug!(
            contract = %endpoint.contract_address,
            authorized,
            "registry membership query"
        );
        Ok(authorized)
    }
}

/// ABI-encode the `isAuthorized(bytes)` call for a hex identity.
///
/// Layout: 4-byte selector, 32-byte offset to the bytes argument,
/// 32-byte length, then the argument padded to a 32-byte boundary.
fn encode_membership_call(hex_identity: &str) -> Result<String> {
    let identity = hex::decode(hex_identity.strip_prefix("0x").unwrap_or(hex_identity))?;

    let mut data = Vec::with_capacity(4 + 64 + identity.len() + 32);
    data.extend_from_slice(&selector(MEMBERSHIP_FUNCTION));
    data.extend_from_slice(&abi_word(0x20));
    data.extend_from_slice(&abi_word(identity.len() as u64));
    data.extend_from_slice(&identity);
    let padding = (32 - identity.len() % 32) % 32;
    data.extend(std::iter::repeat(0u8).take(padding));

    Ok(format!("0x{}", hex::encode(data)))
}

/// First four bytes of the Keccak-256 hash of the function signature.
fn selector(signature: &str) -> [u8; 4] {
    let digest = Keccak256::digest(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

/// A 64-bit value right-aligned in a 32-byte ABI word.
fn abi_word(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Decode a returned boolean word: any non-zero byte means true.
fn decode_bool_word(result: &str) -> Result<bool> {
    let bytes = hex::decode(result.strip_prefix("0x").unwrap_or(result))?;
    Ok(bytes.iter().any(|b| *b != 0))
}
