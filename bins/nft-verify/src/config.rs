//! Command-line configuration

use std::time::Duration;

use clap::Parser;
use url::Url;

/// Verify ownership of an NFT or token from its OpenSea or Etherscan URL.
///
/// The URL is resolved to a (network, contract, token id) reference, its
/// metadata is looked up through Alchemy and an ownership claim for the
/// wallet address is registered with the backend.
///
/// # Examples
///
/// ```bash
/// # Verify an NFT
/// nft-verify --address 0x... https://opensea.io/assets/ethereum/0x.../42
///
/// # Re-check the URL from the previous session
/// nft-verify --address 0x...
///
/// # Start address verification first
/// nft-verify --address 0x... --verify-address https://goerli.etherscan.io/token/0x...
/// ```
#[derive(Parser, Debug)]
#[command(name = "nft-verify")]
#[command(about = "Verify NFT and token ownership from marketplace links", long_about = None)]
pub struct Config {
    /// OpenSea or Etherscan URL of the token. Defaults to the last URL used.
    pub url: Option<String>,

    /// Wallet address claiming ownership
    #[arg(long, env = "NFT_VERIFY_ADDRESS")]
    pub address: Option<String>,

    /// Alchemy API key
    #[arg(long, env = "ALCHEMY_API_KEY", hide_env_values = true)]
    pub alchemy_api_key: Option<String>,

    /// Alchemy endpoint override; `{network}` is replaced by e.g. `eth-mainnet`
    #[arg(long, env = "ALCHEMY_ENDPOINT")]
    pub alchemy_endpoint: Option<String>,

    /// Identity backend base URL
    #[arg(
        long,
        env = "NFT_VERIFY_BACKEND_URL",
        default_value = "http://localhost:8080/api"
    )]
    pub backend_url: Url,

    /// File holding the last entered URL across runs
    #[arg(long, env = "NFT_VERIFY_SESSION", default_value = "./nft-verify-session.json")]
    pub session_file: String,

    /// Request address verification when the address is not yet verified
    #[arg(long)]
    pub verify_address: bool,

    /// List previously verified tokens owned by the address
    #[arg(long)]
    pub history: bool,

    /// HTTP request timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
