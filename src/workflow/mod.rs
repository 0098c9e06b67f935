//! Ownership verification workflow.
//!
//! One run per resolved token reference:
//!
//! ```text
//! Fetching -> Classifying -> Submitting -> Valid | Invalid
//!     \            \
//!      `-> Error    `-> Error
//! ```
//!
//! Every run gets a sequence number when it starts. State is published on a
//! `watch` channel, and a run only writes while its number is the latest, so
//! a slow superseded run can never overwrite a newer one. A superseded run
//! stops at its next suspension point and never submits.

mod error;
mod state;

pub use error::VerifyError;
pub use state::{VerificationSnapshot, VerificationStatus, WorkflowPhase};

use std::sync::Arc;

use nft_verify_common::{
    classify, FungibleMetadata, NftMetadata, OwnershipClaim, TokenPreview, TokenReference,
    TokenStandard,
};
use tokio::sync::watch;

use crate::services::{HistoryService, MetadataProvider, OwnershipRegistry};

/// Metadata collected during the fetch step.
#[derive(Debug, Clone, Default)]
pub struct FetchedMetadata {
    pub nft: Option<NftMetadata>,
    pub token: Option<FungibleMetadata>,
}

impl FetchedMetadata {
    pub fn preview(&self) -> TokenPreview {
        TokenPreview::from_metadata(self.nft.as_ref(), self.token.as_ref())
    }
}

pub struct VerificationWorkflow {
    metadata: Arc<dyn MetadataProvider>,
    registry: Arc<dyn OwnershipRegistry>,
    history: Arc<dyn HistoryService>,
    state: watch::Sender<VerificationSnapshot>,
}

impl VerificationWorkflow {
    pub fn new(
        metadata: Arc<dyn MetadataProvider>,
        registry: Arc<dyn OwnershipRegistry>,
        history: Arc<dyn HistoryService>,
    ) -> Self {
        let (state, _) = watch::channel(VerificationSnapshot::default());
        Self {
            metadata,
            registry,
            history,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<VerificationSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> VerificationSnapshot {
        self.state.borrow().clone()
    }

    /// Sequence number of the latest run (or reset).
    pub fn current_run(&self) -> u64 {
        self.state.borrow().run
    }

    /// Drop back to `Idle`, invalidating any run in flight.
    pub fn reset(&self, reference: Option<TokenReference>) -> u64 {
        self.begin(reference, WorkflowPhase::Idle)
    }

    /// Verify that `owner` holds `reference` and register the claim.
    ///
    /// The outcome is also published on the state channel. Returns
    /// [`VerifyError::Superseded`] without touching state if a newer run or
    /// reset started meanwhile.
    pub async fn run(
        &self,
        reference: TokenReference,
        owner: String,
    ) -> Result<VerificationStatus, VerifyError> {
        let run = self.begin(Some(reference.clone()), WorkflowPhase::Fetching);

        tracing::debug!(
            target: "nft_verify::workflow",
            run,
            reference = %reference,
            owner = %owner,
            "Starting verification"
        );

        let fetched = match self.fetch(run, &reference).await {
            Ok(fetched) => fetched,
            Err(VerifyError::MetadataFetch(e)) => {
                tracing::warn!(
                    target: "nft_verify::workflow",
                    run,
                    reference = %reference,
                    error = %format!("{e:#}"),
                    "Metadata fetch failed"
                );
                let err = VerifyError::MetadataFetch(e);
                return self.fail(run, err);
            }
            Err(e) => return Err(e),
        };

        self.advance(run, |s| {
            s.phase = WorkflowPhase::Classifying;
            s.preview = fetched.preview();
        })?;

        let standard = match classify(fetched.nft.as_ref(), fetched.token.as_ref()) {
            Ok(standard) => standard,
            Err(e) => {
                tracing::warn!(
                    target: "nft_verify::workflow",
                    run,
                    reference = %reference,
                    error = %e,
                    "Classification failed"
                );
                return self.fail(run, e.into());
            }
        };

        self.advance(run, |s| {
            s.phase = WorkflowPhase::Submitting;
            s.standard = Some(standard);
        })?;

        self.submit(run, &reference, standard, owner).await
    }

    async fn fetch(&self, run: u64, reference: &TokenReference) -> Result<FetchedMetadata, VerifyError> {
        let network = reference.provider_network();
        let mut fetched = FetchedMetadata::default();

        if let Some(token_id) = reference.token_id {
            let nft = self
                .metadata
                .nft_metadata(&network, &reference.contract, token_id)
                .await
                .map_err(VerifyError::MetadataFetch)?;
            let ambiguous = nft.token_type.is_ambiguous();
            fetched.nft = Some(nft);
            self.advance(run, |s| s.preview = fetched.preview())?;

            if !ambiguous {
                return Ok(fetched);
            }
            tracing::debug!(
                target: "nft_verify::workflow",
                run,
                contract = %reference.contract,
                "NFT type ambiguous, fetching fungible metadata"
            );
        }

        let token = self
            .metadata
            .token_metadata(&network, &reference.contract)
            .await
            .map_err(VerifyError::MetadataFetch)?;
        fetched.token = Some(token);
        self.advance(run, |s| s.preview = fetched.preview())?;

        Ok(fetched)
    }

    async fn submit(
        &self,
        run: u64,
        reference: &TokenReference,
        standard: TokenStandard,
        owner: String,
    ) -> Result<VerificationStatus, VerifyError> {
        let claim = OwnershipClaim::new(reference, standard, owner);

        match self.registry.submit_claims(std::slice::from_ref(&claim)).await {
            Ok(valid) => {
                let status = if valid {
                    VerificationStatus::Valid
                } else {
                    VerificationStatus::Invalid
                };
                self.advance(run, |s| {
                    s.phase = status.phase();
                    s.status = status.clone();
                })?;

                tracing::info!(
                    target: "nft_verify::workflow",
                    run,
                    reference = %reference,
                    token_type = %standard,
                    valid,
                    "Ownership claim processed"
                );

                if valid {
                    self.history.refresh();
                }
                Ok(status)
            }
            Err(e) => {
                let err = VerifyError::RegistrySubmission(e);
                tracing::error!(
                    target: "nft_verify::workflow",
                    run,
                    reference = %reference,
                    error = %err,
                    "Ownership claim submission failed"
                );
                let message = err.to_string();
                self.advance(run, |s| {
                    s.phase = WorkflowPhase::Invalid;
                    s.status = VerificationStatus::Invalid;
                    s.notice = Some(message);
                })?;
                Err(err)
            }
        }
    }

    /// Start a new run number and reset the published state.
    fn begin(&self, reference: Option<TokenReference>, phase: WorkflowPhase) -> u64 {
        let mut run = 0;
        self.state.send_modify(|s| {
            run = s.run + 1;
            *s = VerificationSnapshot {
                run,
                reference,
                phase,
                ..VerificationSnapshot::default()
            };
        });
        run
    }

    /// Apply `update` if `run` is still the latest run.
    fn advance(
        &self,
        run: u64,
        update: impl FnOnce(&mut VerificationSnapshot),
    ) -> Result<(), VerifyError> {
        let applied = self.state.send_if_modified(|s| {
            if s.run != run {
                return false;
            }
            update(s);
            true
        });
        if applied {
            Ok(())
        } else {
            tracing::debug!(
                target: "nft_verify::workflow",
                run,
                current = self.current_run(),
                "Dropping result of superseded run"
            );
            Err(VerifyError::Superseded(run))
        }
    }

    fn fail(&self, run: u64, err: VerifyError) -> Result<VerificationStatus, VerifyError> {
        let status = VerificationStatus::Error(err.to_string());
        self.advance(run, |s| {
            s.phase = WorkflowPhase::Error;
            s.status = status;
        })?;
        Err(err)
    }
}
