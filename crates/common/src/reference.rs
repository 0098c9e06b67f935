use serde::{Deserialize, Serialize};
use std::fmt;

/// Network name used when a URL carries no explicit network.
pub const MAINNET: &str = "mainnet";

/// A resolved `(network, contract, token_id)` triple.
///
/// `token_id` is `None` for fungible-token references.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenReference {
    pub network: String,
    pub contract: String,
    pub token_id: Option<u64>,
}

impl TokenReference {
    pub fn new(network: impl Into<String>, contract: impl Into<String>, token_id: Option<u64>) -> Self {
        Self {
            network: network.into(),
            contract: contract.into(),
            token_id,
        }
    }

    /// Reference to a single NFT.
    pub fn nft(network: impl Into<String>, contract: impl Into<String>, token_id: u64) -> Self {
        Self::new(network, contract, Some(token_id))
    }

    /// Reference to a fungible token contract.
    pub fn fungible(network: impl Into<String>, contract: impl Into<String>) -> Self {
        Self::new(network, contract, None)
    }

    /// Network identifier understood by the metadata provider (`eth-{network}`).
    pub fn provider_network(&self) -> String {
        format!("eth-{}", self.network)
    }
}

impl fmt::Display for TokenReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.token_id {
            Some(id) => write!(f, "{}:{}/{}", self.network, self.contract, id),
            None => write!(f, "{}:{}", self.network, self.contract),
        }
    }
}
