//! Common types for nft-verify
//!
//! Token references, fetched metadata, token standards and the records
//! exchanged with the ownership registry. Everything here is plain data plus
//! the classification rule; no I/O.

pub mod claim;
pub mod metadata;
pub mod reference;
pub mod standard;

pub use claim::{OwnershipClaim, VerifiedToken};
pub use metadata::{FungibleMetadata, NftMetadata, NftTokenType, TokenPreview};
pub use reference::{TokenReference, MAINNET};
pub use standard::{classify, ClassificationError, TokenStandard};
