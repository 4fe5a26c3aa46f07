//! Registry endpoint descriptors.

use serde::{Deserialize, Serialize};

/// One on-chain membership registry: a contract address and the RPC
/// provider through which it is queried.
///
/// A relay may be configured with several endpoints; a writer who is a
/// member of any one of them is authorized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEndpoint {
    /// The registry contract address (`0x`-prefixed).
    pub contract_address: String,

    /// The JSON-RPC provider URL.
    pub provider_url: String,
}

impl RegistryEndpoint {
    /// Create a new endpoint descriptor.
    pub fn new(contract_address: impl Into<String>, provider_url: impl Into<String>) -> Self {
        Self {
            contract_address: contract_address.into(),
            provider_url: provider_url.into(),
        }
    }
}
