use std::sync::Arc;

use ccv_core::protocol::{
    client::v1::{
        ClientId,
        ConsensusState,
        Height,
        SENTINEL_ROOT,
    },
    governance::v1::CreateChildChainProposal,
    parent::v1::Params,
};
use cnidarium::{
    ArcStateDeltaExt as _,
    StateDelta,
    StateRead,
    StateWrite,
};
use eyre::{
    OptionExt as _,
    Result,
    WrapErr as _,
};
use tendermint::Time;
use tracing::{
    info,
    instrument,
    warn,
};

use super::SpawnOutcome;
use crate::{
    app::StateReadExt as _,
    clients::{
        ClientStateBuilder,
        StateWriteExt as _,
    },
    genesis::construct_child_genesis,
    pending::{
        PendingClientInfo,
        StateReadExt as _,
        StateWriteExt as _,
    },
    registry::{
        StateReadExt as _,
        StateWriteExt as _,
    },
    SpawnError,
};

/// Acts on a spawn proposal that passed governance.
///
/// Chains that are already registered or pending are rejected with
/// [`SpawnError::DuplicateChain`] before anything is written.
#[instrument(skip_all, fields(chain_id = proposal.chain_id(), spawn_time = %proposal.spawn_time()), err)]
pub(crate) async fn handle_spawn_proposal<S: StateWrite>(
    state: &mut S,
    params: &Params,
    proposal: &CreateChildChainProposal,
) -> Result<SpawnOutcome> {
    let chain_id = proposal.chain_id();
    let registered = state
        .get_child_client(chain_id)
        .await
        .wrap_err("failed reading child client")?
        .is_some();
    let pending = state
        .get_pending_spawn_time(chain_id)
        .await
        .wrap_err("failed reading pending spawn time")?
        .is_some();
    if registered || pending {
        return Err(SpawnError::DuplicateChain {
            chain_id: chain_id.to_string(),
        })
        .wrap_err("refusing to spawn chain");
    }

    let now = state
        .get_block_timestamp()
        .await
        .wrap_err("failed reading block timestamp")?;
    let spawn_time = proposal.spawn_time();
    if now < spawn_time {
        state
            .put_pending_client_info(
                spawn_time,
                &PendingClientInfo {
                    chain_id: chain_id.to_string(),
                    initial_height: proposal.initial_height(),
                },
            )
            .wrap_err("failed queueing spawn")?;
        info!(chain_id, %spawn_time, "queued child chain spawn");
        return Ok(SpawnOutcome::Pending {
            spawn_time,
        });
    }

    let client_id = execute_spawn(state, params, chain_id, proposal.initial_height())
        .await
        .wrap_err("failed executing spawn")?;
    Ok(SpawnOutcome::Spawned {
        client_id,
    })
}

/// Spawns `chain_id`: creates its light client on the host, constructs its genesis
/// and registers both.
#[instrument(skip(state, params), err)]
pub(crate) async fn execute_spawn<S: StateWrite>(
    state: &mut S,
    params: &Params,
    chain_id: &str,
    initial_height: Height,
) -> Result<ClientId> {
    let client_state = ClientStateBuilder::new(&params.trust)?
        .build(chain_id, initial_height)
        .wrap_err("failed building light client of the child chain")?;
    let genesis = construct_child_genesis(state, params)
        .await
        .wrap_err("failed constructing child genesis")?;

    // The child has not produced any blocks yet and shares the validator set of
    // the parent.
    let consensus_state = ConsensusState::new(
        genesis.parent_consensus_state.timestamp,
        SENTINEL_ROOT.to_vec(),
        genesis.parent_consensus_state.next_validators_hash,
    );
    let client_id = state
        .create_client(&client_state, &consensus_state)
        .await
        .wrap_err("failed creating light client of the child chain")?;
    state
        .register_child_chain(chain_id, &client_id, &genesis)
        .await
        .wrap_err("failed registering child chain")?;

    info!(chain_id, %client_id, "spawned child chain");
    Ok(client_id)
}

#[derive(Debug, Default)]
pub(crate) struct SweepReport {
    pub(crate) spawned: Vec<(String, ClientId)>,
    pub(crate) failed: Vec<(String, eyre::Report)>,
}

/// Spawns all pending chains whose spawn time is at or before `now`.
///
/// Chains are spawned in ascending order of spawn time, then chain ID. Each spawn
/// runs in its own transaction: a failing spawn is logged, reported and dropped
/// from the queue without affecting the others.
#[instrument(skip(state, params), err)]
pub(crate) async fn spawn_due_chains<S: StateRead + 'static>(
    state: &mut Arc<StateDelta<S>>,
    params: &Params,
    now: Time,
) -> Result<SweepReport> {
    let due = Arc::get_mut(state)
        .ok_or_eyre("must only have one reference to the state; this is a bug")?
        .take_due_pending_clients(now)
        .await
        .wrap_err("failed taking due pending clients")?;

    let mut report = SweepReport::default();
    for entry in due {
        let chain_id = entry.info.chain_id;
        let mut state_tx = state
            .try_begin_transaction()
            .ok_or_eyre("must only have one reference to the state; this is a bug")?;
        match execute_spawn(&mut state_tx, params, &chain_id, entry.info.initial_height).await {
            Ok(client_id) => {
                let _ = state_tx.apply();
                report.spawned.push((chain_id, client_id));
            }
            Err(error) => {
                warn!(
                    %chain_id,
                    spawn_time = %entry.spawn_time,
                    error = AsRef::<dyn std::error::Error>::as_ref(&error),
                    "failed to spawn pending child chain; dropping it",
                );
                report.failed.push((chain_id, error));
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use cnidarium::StateDelta;

    use super::*;
    use crate::{
        app::StateWriteExt as _,
        clients::StateReadExt as _,
        genesis::make_child_genesis,
        test_utils::{
            block_info,
            host_state,
            proposal,
            time,
        },
    };

    #[tokio::test]
    async fn due_proposal_is_spawned_immediately() {
        let storage = cnidarium::TempStorage::new().await.unwrap();
        let block = block_info(5, time("2020-01-02T01:00:00Z"));
        let mut state = host_state(&storage, &block);

        let proposal = proposal("chainID", time("2020-01-02T00:00:00Z"));
        let outcome = handle_spawn_proposal(&mut state, &Params::default(), &proposal)
            .await
            .unwrap();

        let client_id = ClientId::tendermint(0);
        assert_eq!(
            outcome,
            SpawnOutcome::Spawned {
                client_id: client_id.clone()
            }
        );
        assert_eq!(
            state.get_child_client("chainID").await.unwrap(),
            Some(client_id)
        );
        assert_eq!(
            state.get_child_genesis("chainID").await.unwrap(),
            Some(make_child_genesis(&state).await.unwrap())
        );
    }

    #[tokio::test]
    async fn proposal_spawning_at_block_time_is_due() {
        let storage = cnidarium::TempStorage::new().await.unwrap();
        let block = block_info(5, time("2020-01-02T01:00:00Z"));
        let mut state = host_state(&storage, &block);

        let outcome = handle_spawn_proposal(
            &mut state,
            &Params::default(),
            &proposal("chainID", block.time),
        )
        .await
        .unwrap();
        assert!(matches!(outcome, SpawnOutcome::Spawned { .. }));
    }

    #[tokio::test]
    async fn future_proposal_is_queued() {
        let storage = cnidarium::TempStorage::new().await.unwrap();
        let block = block_info(5, time("2020-01-02T00:00:00Z"));
        let mut state = host_state(&storage, &block);

        let spawn_time = time("2020-01-02T01:00:00Z");
        let outcome = handle_spawn_proposal(
            &mut state,
            &Params::default(),
            &proposal("chainID", spawn_time),
        )
        .await
        .unwrap();

        assert_eq!(
            outcome,
            SpawnOutcome::Pending {
                spawn_time
            }
        );
        assert_eq!(
            state
                .get_pending_client_info(spawn_time, "chainID")
                .await
                .unwrap(),
            Some(Height::new(2, 3))
        );
        assert_eq!(state.get_child_client("chainID").await.unwrap(), None);
        assert_eq!(state.get_child_genesis("chainID").await.unwrap(), None);
    }

    #[tokio::test]
    async fn child_client_starts_at_the_initial_height_with_a_sentinel_root() {
        let storage = cnidarium::TempStorage::new().await.unwrap();
        let block = block_info(5, time("2020-01-02T01:00:00Z"));
        let mut state = host_state(&storage, &block);

        let client_id = execute_spawn(&mut state, &Params::default(), "chainID", Height::new(2, 3))
            .await
            .unwrap();

        let client_state = state.get_client_state(&client_id).await.unwrap().unwrap();
        assert_eq!(client_state.chain_id, "chainID");
        assert_eq!(client_state.latest_height, Height::new(2, 3));

        let consensus_state = state
            .get_client_consensus_state(&client_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(consensus_state.timestamp, block.time);
        assert_eq!(consensus_state.root.hash, SENTINEL_ROOT);
        assert_eq!(
            consensus_state.next_validators_hash,
            block.next_validators_hash
        );
    }

    #[tokio::test]
    async fn registered_or_pending_chains_are_duplicates() {
        let storage = cnidarium::TempStorage::new().await.unwrap();
        let block = block_info(5, time("2020-01-02T01:00:00Z"));
        let mut state = host_state(&storage, &block);
        let params = Params::default();

        handle_spawn_proposal(&mut state, &params, &proposal("spawned", block.time))
            .await
            .unwrap();
        handle_spawn_proposal(
            &mut state,
            &params,
            &proposal("pending", time("2020-01-03T00:00:00Z")),
        )
        .await
        .unwrap();

        for chain_id in ["spawned", "pending"] {
            let error = handle_spawn_proposal(
                &mut state,
                &params,
                &proposal(chain_id, time("2020-01-04T00:00:00Z")),
            )
            .await
            .unwrap_err();
            assert!(matches!(
                SpawnError::find_in(&error),
                Some(SpawnError::DuplicateChain { chain_id: duplicate }) if duplicate == chain_id,
            ));
        }
        assert_eq!(state.get_client_counter().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn sweep_spawns_due_chains_in_order() {
        let storage = cnidarium::TempStorage::new().await.unwrap();
        let block = block_info(5, time("2020-01-02T00:00:00Z"));
        let mut state = host_state(&storage, &block);
        let params = Params::default();

        let spawn_time = time("2020-01-02T01:00:00Z");
        for chain_id in ["b", "a"] {
            handle_spawn_proposal(&mut state, &params, &proposal(chain_id, spawn_time))
                .await
                .unwrap();
        }
        handle_spawn_proposal(
            &mut state,
            &params,
            &proposal("c", time("2020-01-02T03:00:00Z")),
        )
        .await
        .unwrap();

        let now = time("2020-01-02T02:00:00Z");
        state.put_block_timestamp(now).unwrap();
        let mut state = Arc::new(state);
        let report = spawn_due_chains(&mut state, &params, now).await.unwrap();

        assert!(report.failed.is_empty());
        assert_eq!(
            report.spawned,
            vec![
                ("a".to_string(), ClientId::tendermint(0)),
                ("b".to_string(), ClientId::tendermint(1)),
            ]
        );
        assert_eq!(
            state.get_pending_client_info(spawn_time, "a").await.unwrap(),
            None
        );
        assert_eq!(
            state.get_pending_spawn_time("c").await.unwrap(),
            Some(time("2020-01-02T03:00:00Z"))
        );
    }

    #[tokio::test]
    async fn failing_spawn_does_not_affect_others() {
        let storage = cnidarium::TempStorage::new().await.unwrap();
        let block = block_info(5, time("2020-01-02T02:00:00Z"));
        let mut state = host_state(&storage, &block);
        let params = Params::default();

        let spawn_time = time("2020-01-02T01:00:00Z");
        state
            .put_pending_client_info(
                spawn_time,
                &PendingClientInfo {
                    chain_id: "a".to_string(),
                    initial_height: Height::default(),
                },
            )
            .unwrap();
        state
            .put_pending_client_info(
                spawn_time,
                &PendingClientInfo {
                    chain_id: "b".to_string(),
                    initial_height: Height::new(2, 3),
                },
            )
            .unwrap();

        let mut state = Arc::new(state);
        let report = spawn_due_chains(&mut state, &params, block.time)
            .await
            .unwrap();

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "a");
        assert_eq!(
            report.spawned,
            vec![("b".to_string(), ClientId::tendermint(0))]
        );
        assert_eq!(state.get_child_client("a").await.unwrap(), None);
        assert_eq!(state.get_pending_spawn_time("a").await.unwrap(), None);
        assert_eq!(state.get_client_counter().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn sweep_without_due_chains_changes_nothing() {
        let storage = cnidarium::TempStorage::new().await.unwrap();
        let block = block_info(5, time("2020-01-02T00:00:00Z"));
        let state = host_state(&storage, &block);

        let mut state = Arc::new(StateDelta::new(state));
        let report = spawn_due_chains(&mut state, &Params::default(), block.time)
            .await
            .unwrap();
        assert!(report.spawned.is_empty());
        assert!(report.failed.is_empty());
    }
}
