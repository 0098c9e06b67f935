//! Non-visual controller behind the wallet verification panel.
//!
//! Tracks the pasted URL, the wallet account and whether that account is
//! verified, and (re)starts the [`VerificationWorkflow`] whenever the
//! resolved token reference or the verified account changes. A presentation
//! layer renders [`WalletPanel::wallet_action`], [`WalletPanel::collection_hint`]
//! and the workflow snapshots.

use std::sync::Arc;

use anyhow::{Context, Result};
use nft_verify_common::{TokenReference, VerifiedToken};
use nft_verify_resolver::{resolve, Resolution};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::services::{AddressVerifier, HistoryService};
use crate::session::Session;
use crate::wallet::{WalletAction, WalletProvider};
use crate::workflow::{VerificationSnapshot, VerificationWorkflow};

/// Hint shown when a collection link is pasted instead of a token link.
pub const COLLECTION_HINT: &str = "Please enter a valid token URL";

#[derive(Default)]
struct PanelState {
    url: String,
    resolution: Option<Resolution>,
    address: Option<String>,
    address_verified: Option<bool>,
    /// Inputs of the last triggered run, to skip redundant re-runs.
    trigger_key: Option<(TokenReference, String)>,
    in_flight: Option<JoinHandle<()>>,
}

impl PanelState {
    fn reference(&self) -> Option<&TokenReference> {
        self.resolution.as_ref().and_then(Resolution::reference)
    }

    /// Reference and owner when a run is allowed.
    fn runnable(&self) -> Option<(TokenReference, String)> {
        match (self.reference(), &self.address, self.address_verified) {
            (Some(reference), Some(address), Some(true)) => Some((reference.clone(), address.clone())),
            _ => None,
        }
    }
}

pub struct WalletPanel {
    wallet: Arc<dyn WalletProvider>,
    verifier: Arc<dyn AddressVerifier>,
    history: Arc<dyn HistoryService>,
    workflow: Arc<VerificationWorkflow>,
    session: Arc<Session>,
    state: Mutex<PanelState>,
}

impl WalletPanel {
    pub fn new(
        wallet: Arc<dyn WalletProvider>,
        verifier: Arc<dyn AddressVerifier>,
        history: Arc<dyn HistoryService>,
        workflow: Arc<VerificationWorkflow>,
        session: Arc<Session>,
    ) -> Self {
        let url = session.nft_url();
        let resolution = Some(resolve(&url));
        Self {
            wallet,
            verifier,
            history,
            workflow,
            session,
            state: Mutex::new(PanelState {
                url,
                resolution,
                ..PanelState::default()
            }),
        }
    }

    /// Read the wallet state and start verifying the persisted URL if
    /// everything is in place.
    pub async fn init(&self) -> Result<()> {
        self.history.refresh();
        self.refresh_wallet().await
    }

    pub fn workflow(&self) -> &Arc<VerificationWorkflow> {
        &self.workflow
    }

    pub fn subscribe(&self) -> watch::Receiver<VerificationSnapshot> {
        self.workflow.subscribe()
    }

    pub async fn wallet_action(&self) -> WalletAction {
        let verified = self.state.lock().await.address_verified;
        WalletAction::from_status(&self.wallet.status(), verified)
    }

    pub async fn url(&self) -> String {
        self.state.lock().await.url.clone()
    }

    pub async fn reference(&self) -> Option<TokenReference> {
        self.state.lock().await.reference().cloned()
    }

    pub async fn collection_hint(&self) -> Option<&'static str> {
        let state = self.state.lock().await;
        state
            .resolution
            .as_ref()
            .is_some_and(Resolution::is_collection_url)
            .then_some(COLLECTION_HINT)
    }

    /// Connect the wallet and pick up its account.
    pub async fn connect(&self) -> Result<()> {
        self.wallet.connect().await.context("failed to connect wallet")?;
        self.refresh_wallet().await
    }

    /// Re-read the wallet account and its verification status.
    pub async fn refresh_wallet(&self) -> Result<()> {
        let address = self.wallet.status().address().map(str::to_string);
        let verified = match &address {
            Some(address) => Some(
                self.verifier
                    .is_verified(address)
                    .await
                    .with_context(|| format!("failed to check verification of {address}"))?,
            ),
            None => None,
        };

        let mut state = self.state.lock().await;
        if state.address != address || state.address_verified != verified {
            tracing::debug!(
                target: "nft_verify::panel",
                address = ?address,
                verified = ?verified,
                "Wallet state changed"
            );
            state.address = address;
            state.address_verified = verified;
        }
        self.trigger(&mut state, false);
        Ok(())
    }

    /// Ask the verifier to prove the connected address, then re-check it.
    pub async fn verify_address(&self) -> Result<()> {
        let Some(address) = self.wallet.status().address().map(str::to_string) else {
            anyhow::bail!("wallet is not connected");
        };
        self.verifier
            .request_verification(&address)
            .await
            .with_context(|| format!("failed to verify address {address}"))?;
        self.refresh_wallet().await
    }

    /// Update the pasted URL. Verification restarts when the resolved
    /// reference changes, or on any edit after a rejection or failure.
    pub async fn set_url(&self, url: &str) -> Result<()> {
        if let Err(e) = self.session.set_nft_url(url) {
            tracing::warn!(
                target: "nft_verify::panel",
                error = %e,
                "Failed to persist URL"
            );
        }

        let resolution = resolve(url);
        let mut state = self.state.lock().await;
        let edited = state.url != url;
        let changed = state.reference() != resolution.reference();
        state.url = url.to_string();
        state.resolution = Some(resolution);
        if changed {
            self.trigger(&mut state, false);
        } else if edited && self.workflow.snapshot().status.is_retryable() {
            self.trigger(&mut state, true);
        }
        Ok(())
    }

    /// User-initiated retry, accepted only after a rejection or failure.
    pub async fn retry(&self) -> bool {
        if !self.workflow.snapshot().status.is_retryable() {
            return false;
        }
        let mut state = self.state.lock().await;
        if state.runnable().is_none() {
            return false;
        }
        self.trigger(&mut state, true);
        true
    }

    /// Wait for the run in flight, if any, to finish.
    pub async fn settle(&self) {
        let handle = self.state.lock().await.in_flight.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    tracing::error!(
                        target: "nft_verify::panel",
                        error = %e,
                        "Verification task panicked"
                    );
                }
            }
        }
    }

    /// Previously verified tokens owned by the wallet or `principal`.
    pub async fn owned_tokens(&self, principal: Option<&str>) -> Option<Vec<VerifiedToken>> {
        let address = self.state.lock().await.address.clone();
        let tokens = self.history.verified_tokens().await?;
        Some(
            tokens
                .into_iter()
                .filter(|t| t.is_owned_by(principal, address.as_deref()))
                .collect(),
        )
    }

    /// Start a run for the current inputs, or go idle when they are
    /// incomplete. Unless `force`d, identical inputs do not re-run.
    fn trigger(&self, state: &mut PanelState, force: bool) {
        let runnable = state.runnable();
        if !force && runnable.is_some() && runnable == state.trigger_key {
            return;
        }

        if let Some(previous) = state.in_flight.take() {
            previous.abort();
        }
        state.trigger_key.clone_from(&runnable);

        let Some((reference, owner)) = runnable else {
            self.workflow.reset(state.reference().cloned());
            return;
        };

        tracing::info!(
            target: "nft_verify::panel",
            reference = %reference,
            "Verifying token"
        );

        // Reset before spawning so readers never see the previous result
        // for the new reference.
        self.workflow.reset(Some(reference.clone()));
        let workflow = self.workflow.clone();
        state.in_flight = Some(tokio::spawn(async move {
            if let Err(e) = workflow.run(reference, owner).await {
                tracing::debug!(
                    target: "nft_verify::panel",
                    error = %e,
                    "Verification run ended without a result"
                );
            }
        }));
    }
}
