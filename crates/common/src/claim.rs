use serde::{Deserialize, Serialize};

use crate::reference::TokenReference;
use crate::standard::TokenStandard;

/// Assertion that `owner` controls the referenced token, submitted to the
/// ownership registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipClaim {
    pub contract: String,
    pub network: String,
    pub token_type: TokenStandard,
    pub token_id: Option<u64>,
    pub owner: String,
}

impl OwnershipClaim {
    pub fn new(reference: &TokenReference, token_type: TokenStandard, owner: impl Into<String>) -> Self {
        Self {
            contract: reference.contract.clone(),
            network: reference.network.clone(),
            token_type,
            token_id: reference.token_id,
            owner: owner.into(),
        }
    }
}

/// A previously registered token, as listed by the history service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedToken {
    #[serde(default)]
    pub principal: Option<String>,
    pub wallet: String,
    pub network: String,
    pub contract: String,
    pub token_type: TokenStandard,
    #[serde(default)]
    pub token_id: Option<u64>,
}

impl VerifiedToken {
    /// Owned by the given identity principal or wallet address.
    ///
    /// Wallet addresses compare case-insensitively.
    pub fn is_owned_by(&self, principal: Option<&str>, wallet: Option<&str>) -> bool {
        let by_principal = matches!((principal, self.principal.as_deref()), (Some(a), Some(b)) if a == b);
        let by_wallet = wallet.is_some_and(|w| w.eq_ignore_ascii_case(&self.wallet));
        by_principal || by_wallet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_wire_shape() {
        let reference = TokenReference::nft("goerli", "0xABC123", 7);
        let claim = OwnershipClaim::new(&reference, TokenStandard::Erc721, "0xowner");
        let json = serde_json::to_value(&claim).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "contract": "0xABC123",
                "network": "goerli",
                "tokenType": "erc721",
                "tokenId": 7,
                "owner": "0xowner",
            })
        );
    }

    #[test]
    fn test_owned_by_wallet_or_principal() {
        let token = VerifiedToken {
            principal: Some("aaaaa-aa".to_string()),
            wallet: "0xAbC".to_string(),
            network: "mainnet".to_string(),
            contract: "0x1".to_string(),
            token_type: TokenStandard::Erc20,
            token_id: None,
        };
        assert!(token.is_owned_by(None, Some("0xabc")));
        assert!(token.is_owned_by(Some("aaaaa-aa"), None));
        assert!(!token.is_owned_by(Some("bbbbb-bb"), Some("0xdef")));
        assert!(!token.is_owned_by(None, None));
    }
}
