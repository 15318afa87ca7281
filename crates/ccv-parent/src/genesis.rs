//! Construction of the genesis document handed to a newly spawned child chain.

use ccv_core::protocol::{
    child::v1::{
        self as child,
        GenesisState,
    },
    client::v1::Height,
    parent::v1::Params,
};
use cnidarium::StateRead;
use eyre::{
    Result,
    WrapErr as _,
};
use tracing::instrument;

use crate::{
    app::StateReadExt as _,
    clients::ClientStateBuilder,
    params::StateReadExt as _,
    unbonding::StateReadExt as _,
    SpawnError,
};

/// Constructs a child genesis from the current host state and the stored parameters.
///
/// # Errors
/// See [`construct_child_genesis`].
#[instrument(skip_all, err)]
pub(crate) async fn make_child_genesis<S: StateRead>(state: &S) -> Result<GenesisState> {
    let params = state.get_params().await.wrap_err("failed reading params")?;
    construct_child_genesis(state, &params).await
}

/// Constructs the genesis of a new child chain.
///
/// The genesis embeds a light client of the host at its current height, the host's
/// consensus state at that height, and all outstanding unbonding sequences. Only
/// reads from `state`.
///
/// # Errors
/// Returns [`SpawnError::SnapshotUnavailable`] if the host's consensus state for
/// the current height was not recorded yet, and [`SpawnError::Config`] if the trust
/// parameters are invalid.
#[instrument(skip_all, err)]
pub(crate) async fn construct_child_genesis<S: StateRead>(
    state: &S,
    params: &Params,
) -> Result<GenesisState> {
    let chain_id = state
        .get_chain_id()
        .await
        .wrap_err("failed reading host chain id")?;
    let revision_number = state
        .get_revision_number()
        .await
        .wrap_err("failed reading host revision number")?;
    let height = state
        .get_block_height()
        .await
        .wrap_err("failed reading host block height")?;
    let Some(consensus_state) = state
        .get_consensus_state_at(height)
        .await
        .wrap_err("failed reading host consensus state")?
    else {
        return Err(SpawnError::SnapshotUnavailable {
            height,
        })
        .wrap_err("cannot construct child genesis");
    };

    let client_state = ClientStateBuilder::new(&params.trust)?
        .build(chain_id.as_str(), Height::new(revision_number, height))
        .wrap_err("failed building light client of the host chain")?;
    let unbonding_sequences = state
        .get_unbonding_sequences()
        .await
        .wrap_err("failed reading unbonding sequences")?;

    Ok(GenesisState::new_chain(
        child::Params {
            enabled: params.enabled,
        },
        client_state,
        consensus_state,
        unbonding_sequences,
    ))
}
