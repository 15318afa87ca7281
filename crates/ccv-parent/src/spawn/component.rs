use std::sync::Arc;

use ccv_core::protocol::parent::v1::GenesisAppState;
use cnidarium::{
    StateDelta,
    StateRead,
    StateWrite,
};
use eyre::{
    Result,
    WrapErr as _,
};
use tracing::{
    debug,
    instrument,
    Level,
};

use super::scheduler::spawn_due_chains;
use crate::{
    app::BlockInfo,
    component::Component,
    params::{
        StateReadExt as _,
        StateWriteExt as _,
    },
    unbonding::StateWriteExt as _,
    SpawnError,
};

#[derive(Default)]
pub(crate) struct ParentComponent;

#[async_trait::async_trait]
impl Component for ParentComponent {
    type AppState = GenesisAppState;

    #[instrument(name = "ParentComponent::init_chain", skip_all, err)]
    async fn init_chain<S: StateWrite>(mut state: S, app_state: &Self::AppState) -> Result<()> {
        app_state
            .params
            .trust
            .validate()
            .map_err(SpawnError::Config)
            .wrap_err("genesis contains invalid light client trust parameters")?;
        state
            .put_params(&app_state.params)
            .wrap_err("failed to write params")?;
        for sequence in &app_state.unbonding_sequences {
            state
                .put_unbonding_sequence(*sequence)
                .wrap_err("failed to write unbonding sequence")?;
        }
        Ok(())
    }

    #[instrument(name = "ParentComponent::begin_block", skip_all, err(level = Level::WARN))]
    async fn begin_block<S: StateRead + 'static>(
        state: &mut Arc<StateDelta<S>>,
        block: &BlockInfo,
    ) -> Result<()> {
        let params = state.get_params().await.wrap_err("failed reading params")?;
        let report = spawn_due_chains(state, &params, block.time)
            .await
            .wrap_err("failed spawning due chains")?;
        debug!(
            height = block.height,
            spawned = report.spawned.len(),
            failed = report.failed.len(),
            "swept pending child chain spawns",
        );
        Ok(())
    }
}
