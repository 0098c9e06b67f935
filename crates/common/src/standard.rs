//! Token standard classification.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::metadata::{FungibleMetadata, NftMetadata};

/// Interface a contract implements, as far as ownership registration cares.
///
/// Serialized with the lower-case tags the registry expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStandard {
    Erc721,
    Erc1155,
    Erc20,
    Unknown,
}

impl fmt::Display for TokenStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Erc721 => "ERC721",
            Self::Erc1155 => "ERC1155",
            Self::Erc20 => "ERC20",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassificationError {
    /// Neither the NFT lookup nor the fungible lookup identified a standard.
    #[error("Unknown token type: {}", reported.as_deref().unwrap_or("none"))]
    Unsupported { reported: Option<String> },
}

/// Decide the token standard from whatever metadata was fetched.
///
/// ERC1155 is checked before ERC721, and a fungible name is only consulted
/// when the NFT lookup did not settle it. Falling through every rule is an
/// error rather than `TokenStandard::Unknown`.
pub fn classify(
    nft: Option<&NftMetadata>,
    token: Option<&FungibleMetadata>,
) -> Result<TokenStandard, ClassificationError> {
    use crate::metadata::NftTokenType;

    match nft.map(|n| n.token_type) {
        Some(NftTokenType::Erc1155) => return Ok(TokenStandard::Erc1155),
        Some(NftTokenType::Erc721) => return Ok(TokenStandard::Erc721),
        _ => {}
    }

    if token.is_some_and(|t| t.name.is_some()) {
        return Ok(TokenStandard::Erc20);
    }

    Err(ClassificationError::Unsupported {
        reported: nft.map(|n| n.token_type.as_str().to_string()),
    })
}
