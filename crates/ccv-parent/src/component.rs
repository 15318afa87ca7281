use std::sync::Arc;

use async_trait::async_trait;
use cnidarium::{
    StateDelta,
    StateRead,
    StateWrite,
};
use eyre::Result;

use crate::app::BlockInfo;

/// A module of the parent state machine with hooks into the host's block lifecycle.
#[async_trait]
pub(crate) trait Component {
    /// The module's section of the host chain's genesis.
    type AppState;

    /// Writes the module's genesis state.
    async fn init_chain<S: StateWrite>(state: S, app_state: &Self::AppState) -> Result<()>;

    /// Runs at the start of every block, after the host's block context for the new
    /// block was recorded.
    ///
    /// `state` must not be shared, so that implementations can open nested
    /// transactions on it.
    async fn begin_block<S: StateRead + 'static>(
        state: &mut Arc<StateDelta<S>>,
        block: &BlockInfo,
    ) -> Result<()>;
}
