//! nft-verify - headless wallet verification panel
//!
//! Resolves an OpenSea or Etherscan URL, classifies the token through
//! Alchemy and registers the configured wallet address as its owner with the
//! identity backend.
//!
//! # Usage
//!
//! ```bash
//! ALCHEMY_API_KEY=... nft-verify --address 0x... https://opensea.io/assets/ethereum/0x.../42
//! ```

mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use config::Config;
use nft_verify::{
    session, StaticWallet, VerificationStatus, VerificationWorkflow, WalletAction, WalletPanel,
    WalletProvider,
};
use nft_verify_alchemy::{AlchemyClient, AlchemyConfig};
use nft_verify_backend::{BackendClient, BackendConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();

    let config = Config::parse();
    run(config).await
}

async fn run(config: Config) -> Result<()> {
    tracing::info!(target: "nft_verify::main", "Backend URL: {}", config.backend_url);
    tracing::info!(target: "nft_verify::main", "Session file: {}", config.session_file);

    let session = session::init_global(&config.session_file).context("failed to load session")?;

    let alchemy = Arc::new(AlchemyClient::new(AlchemyConfig {
        api_key: config.alchemy_api_key.clone(),
        endpoint: config.alchemy_endpoint.clone(),
        timeout: config.timeout(),
    })?);
    let backend = Arc::new(BackendClient::new(BackendConfig {
        url: config.backend_url.clone(),
        timeout: config.timeout(),
    })?);

    let wallet = Arc::new(StaticWallet::new(config.address.clone()));
    if config.address.is_some() {
        wallet.connect().await?;
    }

    let workflow = Arc::new(VerificationWorkflow::new(
        alchemy,
        backend.clone(),
        backend.clone(),
    ));
    let panel = WalletPanel::new(wallet, backend.clone(), backend.clone(), workflow, session);

    // Apply the URL before init so the persisted one is never verified.
    if let Some(url) = &config.url {
        panel.set_url(url).await?;
    }
    panel.init().await?;

    match panel.wallet_action().await {
        WalletAction::InstallWallet => {
            anyhow::bail!("no wallet address configured, pass --address or set NFT_VERIFY_ADDRESS")
        }
        WalletAction::Connect | WalletAction::Wait => {
            anyhow::bail!("wallet is not connected")
        }
        WalletAction::VerifyAddress(address) if config.verify_address => {
            tracing::info!(target: "nft_verify::main", "Requesting verification of {}", address);
            panel.verify_address().await?;
            if !matches!(panel.wallet_action().await, WalletAction::Ready(_)) {
                anyhow::bail!("address {address} is still unverified, complete the challenge and retry");
            }
        }
        WalletAction::VerifyAddress(address) => {
            anyhow::bail!("address {address} is not verified, rerun with --verify-address");
        }
        WalletAction::Ready(address) => {
            tracing::info!(target: "nft_verify::main", "Verified address: {}", address);
        }
    }

    if let Some(hint) = panel.collection_hint().await {
        anyhow::bail!("{hint}: {}", panel.url().await);
    }
    let Some(reference) = panel.reference().await else {
        anyhow::bail!("paste an OpenSea or Etherscan token URL");
    };

    panel.settle().await;
    let snapshot = panel.workflow().snapshot();

    if let Some(title) = &snapshot.preview.title {
        tracing::info!(target: "nft_verify::main", "Token: {}", title);
    }
    if let Some(subtitle) = &snapshot.preview.subtitle {
        tracing::info!(target: "nft_verify::main", "Details: {}", subtitle);
    }

    if config.history {
        backend.refresh_history().await?;
        let owned = panel.owned_tokens(None).await.unwrap_or_default();
        println!("Previously verified:");
        for token in owned {
            match token.token_id {
                Some(id) => println!("  {} {}:{}/{}", token.token_type, token.network, token.contract, id),
                None => println!("  {} {}:{}", token.token_type, token.network, token.contract),
            }
        }
    }

    match snapshot.status {
        VerificationStatus::Valid => {
            let standard = snapshot.standard.map(|s| s.to_string()).unwrap_or_default();
            println!("valid: {reference} ({standard})");
            Ok(())
        }
        VerificationStatus::Invalid => match snapshot.notice {
            Some(notice) => anyhow::bail!("invalid: {reference}: {notice}"),
            None => anyhow::bail!("invalid: {reference} is not owned by this address"),
        },
        VerificationStatus::Error(message) => anyhow::bail!("error: {reference}: {message}"),
        VerificationStatus::Pending => anyhow::bail!("verification of {reference} did not complete"),
    }
}
