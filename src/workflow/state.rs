use nft_verify_common::{TokenPreview, TokenReference, TokenStandard};

/// Where a verification run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkflowPhase {
    /// No reference, or the owning address is not verified.
    #[default]
    Idle,
    Fetching,
    Classifying,
    Submitting,
    Valid,
    Invalid,
    Error,
}

/// Validity of the current token reference.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VerificationStatus {
    #[default]
    Pending,
    Valid,
    Invalid,
    Error(String),
}

impl VerificationStatus {
    /// A user may retry from a rejected or failed verification only.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Invalid | Self::Error(_))
    }

    pub fn phase(&self) -> WorkflowPhase {
        match self {
            Self::Pending => WorkflowPhase::Idle,
            Self::Valid => WorkflowPhase::Valid,
            Self::Invalid => WorkflowPhase::Invalid,
            Self::Error(_) => WorkflowPhase::Error,
        }
    }
}

/// Published state of the workflow, one per change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationSnapshot {
    /// Sequence number of the run that wrote this snapshot.
    pub run: u64,
    pub reference: Option<TokenReference>,
    pub phase: WorkflowPhase,
    pub status: VerificationStatus,
    pub standard: Option<TokenStandard>,
    pub preview: TokenPreview,
    /// Failure message that did not become an `Error` status, e.g. a
    /// registry submission error that forced `Invalid`.
    pub notice: Option<String>,
}
