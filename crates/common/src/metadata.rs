//! Token metadata returned by the indexing API.
//!
//! These are provider-neutral shapes; adapters map their wire formats onto
//! them.

use serde::{Deserialize, Serialize};

/// Token type reported by the indexer for an NFT lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NftTokenType {
    #[serde(rename = "ERC721")]
    Erc721,
    #[serde(rename = "ERC1155")]
    Erc1155,
    NoSupportedNftStandard,
    NotAContract,
    #[serde(other)]
    Unknown,
}

impl NftTokenType {
    /// True when the indexer could not tell which NFT standard the contract
    /// implements, so the fungible-token lookup is worth trying.
    pub fn is_ambiguous(self) -> bool {
        matches!(self, Self::NoSupportedNftStandard | Self::Unknown)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Erc721 => "ERC721",
            Self::Erc1155 => "ERC1155",
            Self::NoSupportedNftStandard => "NO_SUPPORTED_NFT_STANDARD",
            Self::NotAContract => "NOT_A_CONTRACT",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// Metadata for a single NFT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftMetadata {
    pub contract: String,
    pub token_id: String,
    pub token_type: NftTokenType,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Gateway URLs of the token media, first one is the preview.
    #[serde(default)]
    pub media: Vec<String>,
}

/// Metadata for a fungible token contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FungibleMetadata {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub decimals: Option<u8>,
    pub logo: Option<String>,
}

/// What a presentation layer shows for a resolved token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenPreview {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub image: Option<String>,
}

impl TokenPreview {
    /// NFT fields win; fungible name/symbol fill the gaps.
    pub fn from_metadata(nft: Option<&NftMetadata>, token: Option<&FungibleMetadata>) -> Self {
        let non_empty = |s: &Option<String>| s.as_ref().filter(|s| !s.is_empty()).cloned();

        let title = nft
            .and_then(|n| non_empty(&n.title))
            .or_else(|| token.and_then(|t| non_empty(&t.name)));
        let subtitle = nft
            .and_then(|n| non_empty(&n.description))
            .or_else(|| token.and_then(|t| non_empty(&t.symbol)));
        let image = nft.and_then(|n| n.media.first().cloned());

        Self {
            title,
            subtitle,
            image,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.subtitle.is_none() && self.image.is_none()
    }
}
