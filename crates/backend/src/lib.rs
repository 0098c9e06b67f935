//! JSON/HTTP client for the identity backend.
//!
//! One client serves three collaborator roles:
//!
//! - [`OwnershipRegistry`]: `POST /nfts` with `{"claims": [...]}`, answered by `{"valid": bool}`
//! - [`HistoryService`]: `GET /nfts`, the public list of verified tokens
//! - [`AddressVerifier`]: `GET /addresses/{address}` and
//!   `POST /addresses/{address}/challenge`

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nft_verify::{AddressVerifier, HistoryService, OwnershipRegistry};
use nft_verify_common::{OwnershipClaim, VerifiedToken};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use url::Url;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("invalid backend URL {0}")]
    InvalidUrl(String),
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
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub url: Url,
    pub timeout: Duration,
}

impl BackendConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Serialize)]
struct SubmitClaimsRequest<'a> {
    claims: &'a [OwnershipClaim],
}

#[derive(Deserialize)]
struct SubmitClaimsResponse {
    valid: bool,
}

#[derive(Deserialize)]
struct AddressStatusResponse {
    verified: bool,
}

#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base: Url,
    history: Arc<RwLock<Option<Vec<VerifiedToken>>>>,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> anyhow::Result<Self> {
        if config.url.cannot_be_a_base() {
            return Err(BackendError::InvalidUrl(config.url.to_string()).into());
        }
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base: config.url,
            history: Arc::new(RwLock::new(None)),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| BackendError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn add_nfts(&self, claims: &[OwnershipClaim]) -> Result<bool, BackendError> {
        let url = self.endpoint(&["nfts"])?;
        let request = self.http.post(url.clone()).json(&SubmitClaimsRequest { claims });
        let response: SubmitClaimsResponse = self.send(&url, request).await?;
        Ok(response.valid)
    }

    pub async fn public_nfts(&self) -> Result<Vec<VerifiedToken>, BackendError> {
        let url = self.endpoint(&["nfts"])?;
        let request = self.http.get(url.clone());
        self.send(&url, request).await
    }

    /// Fetch the public list and cache it for [`HistoryService::verified_tokens`].
    pub async fn refresh_history(&self) -> Result<usize, BackendError> {
        let tokens = self.public_nfts().await?;
        let count = tokens.len();
        *self.history.write().await = Some(tokens);
        tracing::debug!(
            target: "nft_verify_backend",
            count,
            "Refreshed verified token history"
        );
        Ok(count)
    }

    pub async fn address_verified(&self, address: &str) -> Result<bool, BackendError> {
        let url = self.endpoint(&["addresses", address])?;
        let request = self.http.get(url.clone());
        let response: AddressStatusResponse = self.send(&url, request).await?;
        Ok(response.verified)
    }

    pub async fn request_challenge(&self, address: &str) -> Result<(), BackendError> {
        let url = self.endpoint(&["addresses", address, "challenge"])?;
        let response = self
            .http
            .post(url.clone())
            .send()
            .await
            .map_err(|source| BackendError::Request {
                url: url.to_string(),
                source,
            })?;
        Self::check_status(&url, response).await.map(|_| ())
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        url: &Url,
        request: reqwest::RequestBuilder,
    ) -> Result<T, BackendError> {
        let request_err = |source| BackendError::Request {
            url: url.to_string(),
            source,
        };
        let response = request.send().await.map_err(request_err)?;
        let response = Self::check_status(url, response).await?;
        response.json().await.map_err(request_err)
    }

    async fn check_status(url: &Url, response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(
            target: "nft_verify_backend",
            url = %url,
            status = %status,
            "Backend request failed"
        );
        Err(BackendError::Status {
            url: url.to_string(),
            status,
            body,
        })
    }
}

#[async_trait]
impl OwnershipRegistry for BackendClient {
    async fn submit_claims(&self, claims: &[OwnershipClaim]) -> anyhow::Result<bool> {
        Ok(self.add_nfts(claims).await?)
    }
}

#[async_trait]
impl HistoryService for BackendClient {
    fn refresh(&self) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(
                target: "nft_verify_backend",
                "History refresh requested outside a tokio runtime"
            );
            return;
        };
        let client = self.clone();
        handle.spawn(async move {
            if let Err(e) = client.refresh_history().await {
                tracing::warn!(
                    target: "nft_verify_backend",
                    error = %e,
                    "Failed to refresh verified token history"
                );
            }
        });
    }

    async fn verified_tokens(&self) -> Option<Vec<VerifiedToken>> {
        self.history.read().await.clone()
    }
}

#[async_trait]
impl AddressVerifier for BackendClient {
    async fn is_verified(&self, address: &str) -> anyhow::Result<bool> {
        Ok(self.address_verified(address).await?)
    }

    async fn request_verification(&self, address: &str) -> anyhow::Result<()> {
        Ok(self.request_challenge(address).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> BackendClient {
        BackendClient::new(BackendConfig::new(Url::parse(base).unwrap())).unwrap()
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let c = client("https://backend.test/api/");
        assert_eq!(
            c.endpoint(&["addresses", "0xabc", "challenge"]).unwrap().as_str(),
            "https://backend.test/api/addresses/0xabc/challenge"
        );
        let c = client("https://backend.test/api");
        assert_eq!(c.endpoint(&["nfts"]).unwrap().as_str(), "https://backend.test/api/nfts");
    }

    #[test]
    fn test_endpoint_escapes_segments() {
        let c = client("https://backend.test/");
        assert_eq!(
            c.endpoint(&["addresses", "a/b"]).unwrap().as_str(),
            "https://backend.test/addresses/a%2Fb"
        );
    }

    #[test]
    fn test_rejects_non_base_url() {
        let url = Url::parse("mailto:someone@example.com").unwrap();
        assert!(BackendClient::new(BackendConfig::new(url)).is_err());
    }
}
