mod state_ext;
pub(crate) mod storage;
#[cfg(test)]
mod tests_app;

use std::sync::Arc;

use ccv_core::protocol::{
    child::v1::GenesisState,
    client::v1::{
        ClientId,
        ConsensusState,
        Height,
    },
    governance::v1::{
        raw,
        Proposal,
    },
    parent::v1::GenesisAppState,
};
use cnidarium::{
    ArcStateDeltaExt as _,
    RootHash,
    Snapshot,
    StateDelta,
    Storage,
};
use eyre::{
    OptionExt as _,
    Result,
    WrapErr as _,
};
pub(crate) use state_ext::{
    StateReadExt,
    StateWriteExt,
};
use tendermint::{
    Hash,
    Time,
};
use tracing::{
    debug,
    instrument,
    Level,
};

use crate::{
    component::Component as _,
    genesis,
    params::StateReadExt as _,
    pending::StateReadExt as _,
    registry::StateReadExt as _,
    spawn::{
        handle_spawn_proposal,
        ParentComponent,
        SpawnOutcome,
    },
    utils::anyhow_to_eyre,
    SpawnError,
};

/// The inter-block state being written to by the application.
type InterBlockState = Arc<StateDelta<Snapshot>>;

/// The header fields of a host block that the parent module records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockInfo {
    pub height: u64,
    pub time: Time,
    /// The state root of the host chain, as committed in this block's header.
    pub app_hash: Vec<u8>,
    pub next_validators_hash: Hash,
}

impl BlockInfo {
    /// The host's own consensus state at this block.
    pub(crate) fn consensus_state(&self) -> ConsensusState {
        ConsensusState::new(self.time, self.app_hash.clone(), self.next_validators_hash)
    }
}

/// The parent side of cross-chain validation, driven block by block by its host.
pub struct App {
    state: InterBlockState,
}

impl App {
    #[must_use]
    pub fn new(snapshot: Snapshot) -> Self {
        debug!("initializing App instance");

        // We perform the `Arc` wrapping of `State` here to ensure
        // there should be no unexpected copies elsewhere.
        let state = Arc::new(StateDelta::new(snapshot));

        Self {
            state,
        }
    }

    /// Writes the genesis of the parent module.
    ///
    /// # Errors
    /// Returns an error if the genesis contains invalid trust parameters or if
    /// writing to state fails.
    #[instrument(name = "App::init_chain", skip_all, fields(%chain_id), err)]
    pub async fn init_chain(
        &mut self,
        chain_id: tendermint::chain::Id,
        genesis_state: GenesisAppState,
    ) -> Result<()> {
        let mut state_tx = self
            .state
            .try_begin_transaction()
            .ok_or_eyre("state Arc should not be referenced elsewhere")?;

        state_tx
            .put_chain_id_and_revision_number(chain_id)
            .wrap_err("failed to write chain id")?;
        state_tx
            .put_block_height(0)
            .wrap_err("failed to write block height")?;

        ParentComponent::init_chain(&mut state_tx, &genesis_state)
            .await
            .wrap_err("init_chain failed on ParentComponent")?;
        let _ = state_tx.apply();
        Ok(())
    }

    /// Records the context of a new block and spawns all chains that became due.
    ///
    /// # Errors
    /// Returns an error if writing to state fails. Failing spawns are logged and
    /// do not fail the block.
    #[instrument(name = "App::begin_block", skip_all, fields(height = block.height), err(level = Level::WARN))]
    pub async fn begin_block(&mut self, block: &BlockInfo) -> Result<()> {
        let mut state_tx = StateDelta::new(self.state.clone());

        state_tx
            .put_block_height(block.height)
            .wrap_err("failed to put block height")?;
        state_tx
            .put_block_timestamp(block.time)
            .wrap_err("failed to put block timestamp")?;
        state_tx
            .put_consensus_state_at(block.height, &block.consensus_state())
            .wrap_err("failed to put consensus state")?;

        let mut arc_state_tx = Arc::new(state_tx);
        ParentComponent::begin_block(&mut arc_state_tx, block)
            .await
            .wrap_err("begin_block failed on ParentComponent")?;

        let state_tx = Arc::try_unwrap(arc_state_tx)
            .map_err(|_| eyre::eyre!("components should not retain copies of shared state"))?;
        self.apply(state_tx)
    }

    /// Acts on a proposal that passed governance.
    ///
    /// Nothing is written if the proposal is rejected.
    ///
    /// # Errors
    /// Returns [`SpawnError::InvalidProposal`] if the proposal is malformed,
    /// [`SpawnError::DuplicateChain`] if its chain was already spawned or is pending,
    /// and other errors if spawning the chain fails.
    #[instrument(name = "App::deliver_proposal", skip_all, err(level = Level::DEBUG))]
    pub async fn deliver_proposal(&mut self, proposal: raw::Proposal) -> Result<SpawnOutcome> {
        let proposal = Proposal::try_from_raw(proposal)
            .map_err(SpawnError::InvalidProposal)
            .wrap_err("failed validating proposal")?;
        debug!(
            kind = proposal.kind(),
            title = proposal.title(),
            "delivering proposal"
        );

        let mut state_tx = self
            .state
            .try_begin_transaction()
            .ok_or_eyre("state Arc should be present and unique")?;
        let params = state_tx
            .get_params()
            .await
            .wrap_err("failed reading params")?;
        let outcome = match &proposal {
            Proposal::CreateChildChain(proposal) => {
                handle_spawn_proposal(&mut state_tx, &params, proposal)
                    .await
                    .wrap_err("failed handling create child chain proposal")?
            }
        };
        let _ = state_tx.apply();
        Ok(outcome)
    }

    /// Persists all writes since the last commit.
    ///
    /// # Errors
    /// Returns an error if the state cannot be committed to `storage`.
    #[instrument(name = "App::commit", skip_all, err)]
    pub async fn commit(&mut self, storage: &Storage) -> Result<RootHash> {
        // We need to extract the State we've built up to commit it.  Fill in a dummy state.
        let dummy_state = StateDelta::new(storage.latest_snapshot());
        let state = Arc::try_unwrap(std::mem::replace(&mut self.state, Arc::new(dummy_state)))
            .map_err(|_| eyre::eyre!("we must have exclusive ownership of the State at commit()"))?;

        let root_hash = storage
            .commit(state)
            .await
            .map_err(anyhow_to_eyre)
            .wrap_err("failed to commit state to storage")?;
        debug!(?root_hash, "finished committing state");

        // Get the latest version of the state, now that we've committed it.
        self.state = Arc::new(StateDelta::new(storage.latest_snapshot()));
        Ok(root_hash)
    }

    /// Returns the light client registered for the spawned chain `chain_id`.
    ///
    /// # Errors
    /// Returns an error if reading from state fails.
    pub async fn child_client(&self, chain_id: &str) -> Result<Option<ClientId>> {
        self.state.get_child_client(chain_id).await
    }

    /// Returns the genesis document of the spawned chain `chain_id`.
    ///
    /// # Errors
    /// Returns an error if reading from state fails.
    pub async fn child_genesis(&self, chain_id: &str) -> Result<Option<GenesisState>> {
        self.state.get_child_genesis(chain_id).await
    }

    /// Returns the initial height of `chain_id` if it is pending under `spawn_time`.
    ///
    /// # Errors
    /// Returns an error if reading from state fails.
    pub async fn pending_client_info(
        &self,
        spawn_time: Time,
        chain_id: &str,
    ) -> Result<Option<Height>> {
        self.state.get_pending_client_info(spawn_time, chain_id).await
    }

    /// Returns the spawn time `chain_id` is pending under.
    ///
    /// # Errors
    /// Returns an error if reading from state fails.
    pub async fn pending_spawn_time(&self, chain_id: &str) -> Result<Option<Time>> {
        self.state.get_pending_spawn_time(chain_id).await
    }

    /// Constructs the genesis a chain spawned at the current height would receive.
    ///
    /// # Errors
    /// Returns [`SpawnError::SnapshotUnavailable`] before the first block began.
    pub async fn make_child_genesis(&self) -> Result<GenesisState> {
        genesis::make_child_genesis(&self.state).await
    }

    // StateDelta::apply only works when the StateDelta wraps an underlying
    // StateWrite.  But if we want to share the StateDelta with the components,
    // we can't wrap a StateWrite instance, which requires exclusive access.
    // This method "externally" applies the state delta to the inter-block state.
    //
    // Invariant: state_tx and self.state are the only two references to the
    // inter-block state.
    fn apply(&mut self, state_tx: StateDelta<InterBlockState>) -> Result<()> {
        let (state2, cache) = state_tx.flatten();
        std::mem::drop(state2);
        // Now there is only one reference to the inter-block state: self.state

        cache.apply_to(
            Arc::get_mut(&mut self.state)
                .ok_or_eyre("no other references to inter-block state")?,
        );
        Ok(())
    }
}
