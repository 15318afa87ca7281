use ccv_core::protocol::{
    governance::v1::ProposalError,
    parent::v1::TrustParamsError,
};

/// The failures of spawning a child chain that callers are expected to tell apart.
///
/// These are raised inside [`eyre::Report`]s carrying additional context. Use
/// [`SpawnError::find_in`] to recover them.
#[derive(Debug, thiserror::Error)]
pub enum SpawnError {
    /// The proposal was malformed. Raised before any state was mutated.
    #[error("spawn proposal is invalid")]
    InvalidProposal(#[source] ProposalError),
    /// The host's consensus state for the current height was not yet recorded.
    /// Retrying on a later block may succeed.
    #[error("no consensus state of the host chain is recorded for height `{height}`")]
    SnapshotUnavailable { height: u64 },
    /// The chain ID is already registered or awaiting its spawn time.
    #[error("chain `{chain_id}` was already spawned or is pending")]
    DuplicateChain { chain_id: String },
    /// The light client trust parameters are misconfigured.
    #[error("light client trust parameters are invalid")]
    Config(#[source] TrustParamsError),
}

impl SpawnError {
    /// Returns the first `SpawnError` in the chain of causes of `report`.
    #[must_use]
    pub fn find_in(report: &eyre::Report) -> Option<&Self> {
        report.chain().find_map(|cause| cause.downcast_ref::<Self>())
    }
}
