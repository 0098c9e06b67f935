//! In-memory collaborators for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use nft_verify_common::{
    FungibleMetadata, NftMetadata, NftTokenType, OwnershipClaim, VerifiedToken,
};
use tokio::sync::Semaphore;

use crate::services::{AddressVerifier, HistoryService, MetadataProvider, OwnershipRegistry};

/// Shared call log so tests can assert ordering across collaborators.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

pub fn nft(contract: &str, token_id: u64, token_type: NftTokenType) -> NftMetadata {
    NftMetadata {
        contract: contract.to_string(),
        token_id: token_id.to_string(),
        token_type,
        title: Some(format!("Token #{token_id}")),
        description: None,
        media: vec![],
    }
}

pub fn fungible(name: Option<&str>) -> FungibleMetadata {
    FungibleMetadata {
        name: name.map(str::to_string),
        symbol: name.map(|n| n.to_uppercase()),
        decimals: Some(18),
        logo: None,
    }
}

#[derive(Default)]
pub struct MockMetadata {
    pub log: CallLog,
    pub nfts: Mutex<HashMap<(String, u64), NftMetadata>>,
    pub tokens: Mutex<HashMap<String, FungibleMetadata>>,
    pub fail_with: Mutex<Option<String>>,
    /// When set, each NFT lookup for the keyed token id waits for a permit.
    pub gates: Mutex<HashMap<u64, Arc<Semaphore>>>,
}

impl MockMetadata {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    pub fn with_nft(self, nft: NftMetadata) -> Self {
        let token_id = nft.token_id.parse().unwrap();
        self.nfts
            .lock()
            .unwrap()
            .insert((nft.contract.clone(), token_id), nft);
        self
    }

    pub fn with_token(self, contract: &str, token: FungibleMetadata) -> Self {
        self.tokens.lock().unwrap().insert(contract.to_string(), token);
        self
    }

    pub fn failing(self, message: &str) -> Self {
        *self.fail_with.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn gate(&self, token_id: u64) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.gates.lock().unwrap().insert(token_id, gate.clone());
        gate
    }
}

#[async_trait]
impl MetadataProvider for MockMetadata {
    async fn nft_metadata(&self, network: &str, contract: &str, token_id: u64) -> Result<NftMetadata> {
        self.log.push(format!("nft_metadata {network} {contract} {token_id}"));
        let gate = self.gates.lock().unwrap().get(&token_id).cloned();
        if let Some(gate) = gate {
            let _permit = gate.acquire().await?;
        }
        if let Some(message) = self.fail_with.lock().unwrap().clone() {
            return Err(anyhow!(message));
        }
        self.nfts
            .lock()
            .unwrap()
            .get(&(contract.to_string(), token_id))
            .cloned()
            .ok_or_else(|| anyhow!("NFT not found"))
    }

    async fn token_metadata(&self, network: &str, contract: &str) -> Result<FungibleMetadata> {
        self.log.push(format!("token_metadata {network} {contract}"));
        if let Some(message) = self.fail_with.lock().unwrap().clone() {
            return Err(anyhow!(message));
        }
        Ok(self.tokens.lock().unwrap().get(contract).cloned().unwrap_or_default())
    }
}

pub struct MockRegistry {
    pub log: CallLog,
    pub accept: bool,
    pub error: Option<String>,
    pub claims: Mutex<Vec<OwnershipClaim>>,
}

impl MockRegistry {
    pub fn accepting(log: CallLog) -> Self {
        Self {
            log,
            accept: true,
            error: None,
            claims: Mutex::new(vec![]),
        }
    }

    pub fn rejecting(log: CallLog) -> Self {
        Self {
            accept: false,
            ..Self::accepting(log)
        }
    }

    pub fn erroring(log: CallLog, message: &str) -> Self {
        Self {
            error: Some(message.to_string()),
            ..Self::accepting(log)
        }
    }

    pub fn submitted(&self) -> Vec<OwnershipClaim> {
        self.claims.lock().unwrap().clone()
    }
}

#[async_trait]
impl OwnershipRegistry for MockRegistry {
    async fn submit_claims(&self, claims: &[OwnershipClaim]) -> Result<bool> {
        self.log.push(format!("submit_claims {}", claims.len()));
        self.claims.lock().unwrap().extend_from_slice(claims);
        match &self.error {
            Some(message) => Err(anyhow!(message.clone())),
            None => Ok(self.accept),
        }
    }
}

#[derive(Default)]
pub struct MockHistory {
    pub refreshes: AtomicUsize,
    pub tokens: Mutex<Option<Vec<VerifiedToken>>>,
}

impl MockHistory {
    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HistoryService for MockHistory {
    fn refresh(&self) {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
    }

    async fn verified_tokens(&self) -> Option<Vec<VerifiedToken>> {
        self.tokens.lock().unwrap().clone()
    }
}

#[derive(Default)]
pub struct MockVerifier {
    pub verified: Mutex<HashMap<String, bool>>,
    pub requests: Mutex<Vec<String>>,
    /// Addresses that become verified once a challenge is requested.
    pub approve_on_request: bool,
}

impl MockVerifier {
    pub fn with_verified(address: &str) -> Self {
        let verifier = Self::default();
        verifier.verified.lock().unwrap().insert(address.to_string(), true);
        verifier
    }
}

#[async_trait]
impl AddressVerifier for MockVerifier {
    async fn is_verified(&self, address: &str) -> Result<bool> {
        Ok(self.verified.lock().unwrap().get(address).copied().unwrap_or(false))
    }

    async fn request_verification(&self, address: &str) -> Result<()> {
        self.requests.lock().unwrap().push(address.to_string());
        if self.approve_on_request {
            self.verified.lock().unwrap().insert(address.to_string(), true);
        }
        Ok(())
    }
}
