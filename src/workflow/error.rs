use nft_verify_common::ClassificationError;

/// Why a verification run did not reach `Valid` or `Invalid` cleanly.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("failed to fetch token metadata: {0:#}")]
    MetadataFetch(anyhow::Error),
    #[error(transparent)]
    Classification(#[from] ClassificationError),
    #[error("Error while verifying NFT ownership: {0:#}")]
    RegistrySubmission(anyhow::Error),
    /// A newer run started before this one finished; its results were dropped.
    #[error("verification run {0} was superseded")]
    Superseded(u64),
}

impl VerifyError {
    pub fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded(_))
    }
}
