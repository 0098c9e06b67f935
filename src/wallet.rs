//! Wallet connection state.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

/// Connection state of the browser-style wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletStatus {
    /// No wallet extension is installed.
    Unavailable,
    NotConnected,
    Initializing,
    Connecting,
    /// Connected, with the selected account.
    Connected(String),
}

impl WalletStatus {
    pub fn address(&self) -> Option<&str> {
        match self {
            Self::Connected(address) => Some(address),
            Self::Unavailable | Self::NotConnected | Self::Initializing | Self::Connecting => None,
        }
    }
}

/// What the user can do next, derived from the wallet and address state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletAction {
    InstallWallet,
    Connect,
    /// Wallet is busy initializing or connecting.
    Wait,
    /// Connected but the address has not been proven yet.
    VerifyAddress(String),
    /// Address verified, token URLs can be checked.
    Ready(String),
}

impl WalletAction {
    pub fn from_status(status: &WalletStatus, address_verified: Option<bool>) -> Self {
        match status {
            WalletStatus::Unavailable => Self::InstallWallet,
            WalletStatus::NotConnected => Self::Connect,
            WalletStatus::Initializing | WalletStatus::Connecting => Self::Wait,
            WalletStatus::Connected(address) => match address_verified {
                Some(true) => Self::Ready(address.clone()),
                // Unknown verification state is treated as still loading.
                None => Self::Wait,
                Some(false) => Self::VerifyAddress(address.clone()),
            },
        }
    }
}

#[async_trait]
pub trait WalletProvider: Send + Sync {
    fn status(&self) -> WalletStatus;

    async fn connect(&self) -> Result<()>;
}

/// Wallet with a fixed account, used by the CLI and tests.
///
/// Starts `NotConnected` until [`WalletProvider::connect`] is called, unless
/// built with [`StaticWallet::connected`].
pub struct StaticWallet {
    address: Option<String>,
    connected: Mutex<bool>,
}

impl StaticWallet {
    pub fn new(address: Option<String>) -> Self {
        Self {
            address,
            connected: Mutex::new(false),
        }
    }

    pub fn connected(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            connected: Mutex::new(true),
        }
    }
}

#[async_trait]
impl WalletProvider for StaticWallet {
    fn status(&self) -> WalletStatus {
        let connected = *self.connected.lock().unwrap_or_else(PoisonError::into_inner);
        match (&self.address, connected) {
            (None, _) => WalletStatus::Unavailable,
            (Some(_), false) => WalletStatus::NotConnected,
            (Some(address), true) => WalletStatus::Connected(address.clone()),
        }
    }

    async fn connect(&self) -> Result<()> {
        if self.address.is_none() {
            anyhow::bail!("no wallet account configured");
        }
        *self.connected.lock().unwrap_or_else(PoisonError::into_inner) = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_wallet_connect() {
        let wallet = StaticWallet::new(Some("0xabc".to_string()));
        assert_eq!(wallet.status(), WalletStatus::NotConnected);
        wallet.connect().await.unwrap();
        assert_eq!(wallet.status(), WalletStatus::Connected("0xabc".to_string()));
    }

    #[tokio::test]
    async fn test_static_wallet_without_account() {
        let wallet = StaticWallet::new(None);
        assert_eq!(wallet.status(), WalletStatus::Unavailable);
        assert!(wallet.connect().await.is_err());
    }

    #[test]
    fn test_actions() {
        let connected = WalletStatus::Connected("0xabc".to_string());
        assert_eq!(WalletAction::from_status(&WalletStatus::Unavailable, None), WalletAction::InstallWallet);
        assert_eq!(WalletAction::from_status(&WalletStatus::NotConnected, None), WalletAction::Connect);
        assert_eq!(WalletAction::from_status(&WalletStatus::Connecting, None), WalletAction::Wait);
        assert_eq!(WalletAction::from_status(&connected, None), WalletAction::Wait);
        assert_eq!(
            WalletAction::from_status(&connected, Some(false)),
            WalletAction::VerifyAddress("0xabc".to_string())
        );
        assert_eq!(
            WalletAction::from_status(&connected, Some(true)),
            WalletAction::Ready("0xabc".to_string())
        );
    }
}
