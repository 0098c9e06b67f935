//! URL resolution for pasted marketplace and block-explorer links.
//!
//! Recognized token URLs, in priority order (first match wins):
//!
//! 1. OpenSea asset: `https://[testnets.]opensea.io/assets/{network}/{contract}/{token_id}`
//! 2. Etherscan NFT: `https://[{network}.]etherscan.io/nft/{contract}/{token_id}`
//! 3. Etherscan token: `https://[{network}.]etherscan.io/token/{contract}[/{token_id}]`
//!
//! Links that name a contract but no token are reported separately so the
//! caller can hint that a token URL is needed. Patterns are anchored at the
//! start only, so trailing paths and query strings are ignored.

use std::sync::LazyLock;

use nft_verify_common::{TokenReference, MAINNET};
use regex::{Captures, Regex};

static OPENSEA_ASSET: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^https://(testnets\.)?opensea\.io/assets/([A-Za-z0-9_]+)/([A-Za-z0-9_]+)/([0-9]+)")
});

static ETHERSCAN_NFT: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^https://(?:([A-Za-z0-9_]+)\.)?etherscan\.io/nft/([A-Za-z0-9_]+)/([0-9]+)")
});

static ETHERSCAN_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^https://(?:([A-Za-z0-9_]+)\.)?etherscan\.io/token/([A-Za-z0-9_]+)(?:/([0-9]+))?")
});

static COLLECTION_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        compile(r"^https://(testnets\.)?opensea\.io/assets/([A-Za-z0-9_]+)/([A-Za-z0-9_]+)"),
        compile(r"^https://(?:([A-Za-z0-9_]+)\.)?etherscan\.io/nft/([A-Za-z0-9_]+)"),
        compile(r"^https://(?:([A-Za-z0-9_]+)\.)?etherscan\.io/token/([A-Za-z0-9_]+)"),
    ]
});

fn compile(pattern: &str) -> Regex {
    // Only called with the literal patterns above.
    Regex::new(pattern).unwrap()
}

/// Outcome of resolving a pasted URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A token-level URL.
    Token(TokenReference),
    /// A contract or collection page without a token id.
    CollectionUrl,
    /// Anything else, including malformed input.
    Unrecognized,
}

impl Resolution {
    pub fn reference(&self) -> Option<&TokenReference> {
        match self {
            Self::Token(reference) => Some(reference),
            Self::CollectionUrl | Self::Unrecognized => None,
        }
    }

    pub fn is_collection_url(&self) -> bool {
        matches!(self, Self::CollectionUrl)
    }
}

type Parser = fn(&str) -> Option<TokenReference>;

const PARSERS: [(&str, Parser); 3] = [
    ("opensea_asset", parse_opensea_asset),
    ("etherscan_nft", parse_etherscan_nft),
    ("etherscan_token", parse_etherscan_token),
];

/// Resolve a URL into a token reference, a collection hint, or nothing.
pub fn resolve(url: &str) -> Resolution {
    if let Some(reference) = parse_token_url(url) {
        return Resolution::Token(reference);
    }
    if is_collection_url(url) {
        Resolution::CollectionUrl
    } else {
        Resolution::Unrecognized
    }
}

/// Try each token URL form in priority order.
pub fn parse_token_url(url: &str) -> Option<TokenReference> {
    let url = url.trim();
    PARSERS.iter().find_map(|(_, parse)| parse(url))
}

/// Name of the URL form that matched, for diagnostics.
pub fn matched_form(url: &str) -> Option<&'static str> {
    let url = url.trim();
    PARSERS
        .iter()
        .find(|(_, parse)| parse(url).is_some())
        .map(|(name, _)| *name)
}

/// True when the URL points at a contract on either site but carries no
/// token id that the token parsers could use.
pub fn is_collection_url(url: &str) -> bool {
    let url = url.trim();
    parse_token_url(url).is_none() && COLLECTION_PATTERNS.iter().any(|re| re.is_match(url))
}

pub fn parse_opensea_asset(url: &str) -> Option<TokenReference> {
    let caps = OPENSEA_ASSET.captures(url)?;
    // Mainnet asset pages carry a chain slug ("ethereum") that is not a
    // network name; only testnet pages name the network.
    let network = if caps.get(1).is_some() {
        caps.get(2)?.as_str()
    } else {
        MAINNET
    };
    let contract = caps.get(3)?.as_str();
    let token_id = parse_token_id(&caps, 4)?;
    Some(TokenReference::nft(network, contract, token_id))
}

pub fn parse_etherscan_nft(url: &str) -> Option<TokenReference> {
    let caps = ETHERSCAN_NFT.captures(url)?;
    let contract = caps.get(2)?.as_str();
    let token_id = parse_token_id(&caps, 3)?;
    Some(TokenReference::nft(subdomain_network(&caps), contract, token_id))
}

pub fn parse_etherscan_token(url: &str) -> Option<TokenReference> {
    let caps = ETHERSCAN_TOKEN.captures(url)?;
    let contract = caps.get(2)?.as_str();
    let token_id = match caps.get(3) {
        Some(_) => Some(parse_token_id(&caps, 3)?),
        None => None,
    };
    Some(TokenReference::new(subdomain_network(&caps), contract, token_id))
}

fn subdomain_network<'a>(caps: &Captures<'a>) -> &'a str {
    caps.get(1)
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(MAINNET)
}

/// Digits that overflow `u64` do not resolve.
fn parse_token_id(caps: &Captures<'_>, group: usize) -> Option<u64> {
    caps.get(group)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opensea_mainnet_ignores_chain_segment() {
        assert_eq!(
            parse_token_url("https://opensea.io/assets/ethereum/0xABC123/42"),
            Some(TokenReference::nft("mainnet", "0xABC123", 42))
        );
        assert_eq!(
            parse_token_url("https://opensea.io/assets/goerli/0xABC123/42"),
            Some(TokenReference::nft("mainnet", "0xABC123", 42))
        );
    }

    #[test]
    fn test_opensea_testnets_takes_network() {
        assert_eq!(
            parse_token_url("https://testnets.opensea.io/assets/goerli/0xABC123/7"),
            Some(TokenReference::nft("goerli", "0xABC123", 7))
        );
    }

    #[test]
    fn test_etherscan_nft() {
        assert_eq!(
            parse_token_url("https://sepolia.etherscan.io/nft/0xABC/3"),
            Some(TokenReference::nft("sepolia", "0xABC", 3))
        );
        assert_eq!(
            parse_token_url("https://etherscan.io/nft/0xABC/3"),
            Some(TokenReference::nft("mainnet", "0xABC", 3))
        );
    }

    #[test]
    fn test_etherscan_token_without_id_is_fungible() {
        assert_eq!(
            parse_token_url("https://goerli.etherscan.io/token/0xDEF456"),
            Some(TokenReference::fungible("goerli", "0xDEF456"))
        );
        assert_eq!(
            parse_token_url("https://etherscan.io/token/0xDEF456"),
            Some(TokenReference::fungible("mainnet", "0xDEF456"))
        );
    }

    #[test]
    fn test_etherscan_token_with_id() {
        assert_eq!(
            parse_token_url("https://goerli.etherscan.io/token/0xDEF456/12"),
            Some(TokenReference::nft("goerli", "0xDEF456", 12))
        );
    }

    #[test]
    fn test_trailing_query_ignored() {
        assert_eq!(
            parse_token_url("https://opensea.io/assets/ethereum/0xABC123/42?tab=details"),
            Some(TokenReference::nft("mainnet", "0xABC123", 42))
        );
    }

    #[test]
    fn test_priority_order() {
        assert_eq!(
            matched_form("https://testnets.opensea.io/assets/goerli/0xA/1"),
            Some("opensea_asset")
        );
        assert_eq!(matched_form("https://etherscan.io/nft/0xA/1"), Some("etherscan_nft"));
        assert_eq!(matched_form("https://etherscan.io/token/0xA"), Some("etherscan_token"));
        assert_eq!(matched_form("https://example.com/foo"), None);
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(resolve("https://example.com/foo"), Resolution::Unrecognized);
        assert_eq!(resolve(""), Resolution::Unrecognized);
        assert_eq!(
            resolve("http://opensea.io/assets/ethereum/0xABC123/42"),
            Resolution::Unrecognized
        );
        assert_eq!(resolve("not a url"), Resolution::Unrecognized);
    }

    #[test]
    fn test_collection_urls() {
        assert_eq!(
            resolve("https://opensea.io/assets/ethereum/0xABC123"),
            Resolution::CollectionUrl
        );
        assert_eq!(resolve("https://etherscan.io/nft/0xABC123"), Resolution::CollectionUrl);
        assert!(!is_collection_url("https://opensea.io/assets/ethereum/0xABC123/1"));
        assert!(!is_collection_url("https://example.com/assets/x/y"));
    }

    #[test]
    fn test_overflowing_token_id_does_not_resolve() {
        let url = "https://opensea.io/assets/ethereum/0xABC/99999999999999999999999";
        assert_eq!(parse_token_url(url), None);
        assert_eq!(resolve(url), Resolution::CollectionUrl);
    }

    #[test]
    fn test_idempotent() {
        let url = "https://testnets.opensea.io/assets/goerli/0xABC123/7";
        assert_eq!(resolve(url), resolve(url));
    }
}
