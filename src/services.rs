//! Collaborator contracts the verification core depends on.
//!
//! Implementations live in adapter crates (`nft-verify-alchemy`,
//! `nft-verify-backend`) or in tests. All async methods are fallible with
//! `anyhow::Result` so adapters can attach context freely.

use anyhow::Result;
use async_trait::async_trait;
use nft_verify_common::{FungibleMetadata, NftMetadata, OwnershipClaim, VerifiedToken};

/// Token metadata lookups against an indexing API.
///
/// `network` is the provider network id (`eth-{network}`), see
/// [`nft_verify_common::TokenReference::provider_network`].
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn nft_metadata(&self, network: &str, contract: &str, token_id: u64) -> Result<NftMetadata>;

    async fn token_metadata(&self, network: &str, contract: &str) -> Result<FungibleMetadata>;
}

/// Backend that records which address owns which token.
#[async_trait]
pub trait OwnershipRegistry: Send + Sync {
    /// Returns `true` when the registry accepted every claim.
    async fn submit_claims(&self, claims: &[OwnershipClaim]) -> Result<bool>;
}

/// List of previously verified tokens.
#[async_trait]
pub trait HistoryService: Send + Sync {
    /// Recompute the list in the background. Fire-and-forget.
    fn refresh(&self);

    /// Last list fetched, `None` before the first refresh completes.
    async fn verified_tokens(&self) -> Option<Vec<VerifiedToken>>;
}

/// Proves that the user controls a wallet address.
#[async_trait]
pub trait AddressVerifier: Send + Sync {
    async fn is_verified(&self, address: &str) -> Result<bool>;

    /// Start verification, e.g. by having the wallet sign a challenge.
    async fn request_verification(&self, address: &str) -> Result<()>;
}
