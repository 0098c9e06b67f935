//! nft-verify - NFT and token ownership verification.
//!
//! Resolves pasted OpenSea/Etherscan links into token references, classifies
//! the token through an indexing API and registers the connected wallet as
//! its owner with a backend. Collaborators (metadata API, registry, history,
//! address verification, wallet) are traits in [`services`] and [`wallet`];
//! HTTP implementations live in the `nft-verify-alchemy` and
//! `nft-verify-backend` crates.

pub mod panel;
pub mod services;
pub mod session;
pub mod wallet;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types for adapter authors
pub use async_trait::async_trait;
pub use nft_verify_common as common;
pub use nft_verify_resolver as resolver;
pub use tokio;

pub use nft_verify_common::{
    classify, ClassificationError, FungibleMetadata, NftMetadata, NftTokenType, OwnershipClaim,
    TokenPreview, TokenReference, TokenStandard, VerifiedToken,
};
pub use nft_verify_resolver::{resolve, Resolution};
pub use panel::{WalletPanel, COLLECTION_HINT};
pub use services::{AddressVerifier, HistoryService, MetadataProvider, OwnershipRegistry};
pub use session::{Session, SessionError};
pub use wallet::{StaticWallet, WalletAction, WalletProvider, WalletStatus};
pub use workflow::{
    VerificationSnapshot, VerificationStatus, VerificationWorkflow, VerifyError, WorkflowPhase,
};
