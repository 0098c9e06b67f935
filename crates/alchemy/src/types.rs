//! Alchemy wire formats.

use nft_verify_common::{FungibleMetadata, NftMetadata, NftTokenType};
use serde::{Deserialize, Serialize};

const IPFS_GATEWAY: &str = "https://ipfs.io/ipfs/";

/// `getNFTMetadata` (NFT API v3) response, trimmed to the fields we use.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftResponse {
    pub contract: ContractInfo,
    pub token_id: String,
    pub token_type: NftTokenType,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<NftImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContractInfo {
    pub address: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftImage {
    pub cached_url: Option<String>,
    pub original_url: Option<String>,
}

impl From<NftResponse> for NftMetadata {
    fn from(response: NftResponse) -> Self {
        let media = response
            .image
            .and_then(|image| image.cached_url.or(image.original_url))
            .filter(|url| !url.is_empty())
            .map(|url| gateway_url(&url))
            .into_iter()
            .collect();

        Self {
            contract: response.contract.address,
            token_id: response.token_id,
            token_type: response.token_type,
            title: response.name,
            description: response.description,
            media,
        }
    }
}

/// Rewrite `ipfs://` URIs to an HTTP gateway so they can be displayed.
pub fn gateway_url(uri: &str) -> String {
    match uri.strip_prefix("ipfs://") {
        Some(cid) => format!("{IPFS_GATEWAY}{}", cid.trim_start_matches("ipfs/")),
        None => uri.to_string(),
    }
}

#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'static str,
    pub params: [&'a str; 1],
}

impl<'a> JsonRpcRequest<'a> {
    pub fn token_metadata(contract: &'a str) -> Self {
        Self {
            jsonrpc: "2.0",
            id: 1,
            method: "alchemy_getTokenMetadata",
            params: [contract],
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

/// `alchemy_getTokenMetadata` result.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenMetadataResult {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub decimals: Option<u8>,
    pub logo: Option<String>,
}

impl From<TokenMetadataResult> for FungibleMetadata {
    fn from(result: TokenMetadataResult) -> Self {
        Self {
            name: result.name,
            symbol: result.symbol,
            decimals: result.decimals,
            logo: result.logo,
        }
    }
}
