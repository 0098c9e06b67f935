//! Alchemy metadata provider.
//!
//! NFT metadata comes from the NFT API (`/nft/v3/{key}/getNFTMetadata`),
//! fungible-token metadata from the `alchemy_getTokenMetadata` JSON-RPC
//! method. Requests go to `https://{network}.g.alchemy.com`, where
//! `network` is the provider network id (`eth-mainnet`, `eth-goerli`, ...).

pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use nft_verify::MetadataProvider;
use nft_verify_common::{FungibleMetadata, NftMetadata};
use reqwest::StatusCode;

use crate::types::{JsonRpcRequest, JsonRpcResponse, NftResponse, TokenMetadataResult};

/// API key Alchemy accepts for unauthenticated, rate-limited access.
pub const DEMO_API_KEY: &str = "demo";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum AlchemyError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        source: reqwest::Error,
    },
    #[error("{url} returned {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },
    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("JSON-RPC response had neither result nor error")]
    EmptyRpcResponse,
}

#[derive(Debug, Clone)]
pub struct AlchemyConfig {
    /// Falls back to [`DEMO_API_KEY`] with a warning when unset.
    pub api_key: Option<String>,
    /// Base URL override. `{network}` is replaced by the provider network id.
    pub endpoint: Option<String>,
    pub timeout: Duration,
}

impl Default for AlchemyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

pub struct AlchemyClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: Option<String>,
}

impl AlchemyClient {
    pub fn new(config: AlchemyConfig) -> anyhow::Result<Self> {
        let api_key = match config.api_key.filter(|k| !k.is_empty()) {
            Some(key) => key,
            None => {
                tracing::warn!(
                    target: "nft_verify_alchemy",
                    "Alchemy API key not found, using the rate-limited demo key"
                );
                DEMO_API_KEY.to_string()
            }
        };

        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            api_key,
            endpoint: config.endpoint,
        })
    }

    /// Base URL for a provider network.
    pub fn base_url(&self, network: &str) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.replace("{network}", network).trim_end_matches('/').to_string(),
            None => format!("https://{network}.g.alchemy.com"),
        }
    }

    pub async fn get_nft_metadata(
        &self,
        network: &str,
        contract: &str,
        token_id: u64,
    ) -> Result<NftMetadata, AlchemyError> {
        let url = format!("{}/nft/v3/{}/getNFTMetadata", self.base_url(network), self.api_key);
        let token_id = token_id.to_string();

        tracing::debug!(
            target: "nft_verify_alchemy",
            network,
            contract,
            token_id = %token_id,
            "Fetching NFT metadata"
        );

        let request = self
            .http
            .get(&url)
            .query(&[("contractAddress", contract), ("tokenId", token_id.as_str())]);
        let response: NftResponse = self.send(&url, request).await?;
        Ok(response.into())
    }

    pub async fn get_token_metadata(
        &self,
        network: &str,
        contract: &str,
    ) -> Result<FungibleMetadata, AlchemyError> {
        let url = format!("{}/v2/{}", self.base_url(network), self.api_key);

        tracing::debug!(
            target: "nft_verify_alchemy",
            network,
            contract,
            "Fetching token metadata"
        );

        let request = self.http.post(&url).json(&JsonRpcRequest::token_metadata(contract));
        let response: JsonRpcResponse<TokenMetadataResult> = self.send(&url, request).await?;

        match (response.result, response.error) {
            (_, Some(error)) => Err(AlchemyError::Rpc {
                code: error.code,
                message: error.message,
            }),
            (Some(result), None) => Ok(result.into()),
            (None, None) => Err(AlchemyError::EmptyRpcResponse),
        }
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, AlchemyError> {
        // Keep the API key out of error messages.
        let redacted = url.replace(&self.api_key, "***");
        let request_err = |source| AlchemyError::Request {
            url: redacted.clone(),
            source,
        };

        let response = request.send().await.map_err(request_err)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(
                target: "nft_verify_alchemy",
                url = %redacted,
                status = %status,
                "Alchemy request failed"
            );
            return Err(AlchemyError::Status {
                url: redacted.clone(),
                status,
                body,
            });
        }
        response.json().await.map_err(request_err)
    }
}

#[async_trait]
impl MetadataProvider for AlchemyClient {
    async fn nft_metadata(
        &self,
        network: &str,
        contract: &str,
        token_id: u64,
    ) -> anyhow::Result<NftMetadata> {
        Ok(self.get_nft_metadata(network, contract, token_id).await?)
    }

    async fn token_metadata(&self, network: &str, contract: &str) -> anyhow::Result<FungibleMetadata> {
        Ok(self.get_token_metadata(network, contract).await?)
    }
}
