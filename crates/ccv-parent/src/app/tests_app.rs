use std::time::Duration;

use assert_json_diff::assert_json_eq;
use ccv_core::protocol::{
    client::v1::{
        ClientId,
        Height,
    },
    governance::v1::raw,
    parent::v1::{
        GenesisAppState,
        Params,
        TrustParams,
    },
};
use cnidarium::{
    Storage,
    TempStorage,
};
use tendermint::{
    Hash,
    Time,
};

use super::*;
use crate::test_utils::{
    block_info,
    proposal,
    time,
    HOST_CHAIN_ID,
};

const CHAIN_ID: &str = "chainID";

fn raw_proposal(chain_id: &str, spawn_time: Time) -> raw::Proposal {
    raw::Proposal::CreateChildChain(proposal(chain_id, spawn_time).into_raw())
}

async fn initialized_app() -> (App, TempStorage) {
    let storage = TempStorage::new().await.unwrap();
    let mut app = App::new(storage.latest_snapshot());
    app.init_chain(HOST_CHAIN_ID.parse().unwrap(), GenesisAppState::default())
        .await
        .unwrap();
    app.commit(&storage).await.unwrap();
    (app, storage)
}

async fn run_block(app: &mut App, storage: &Storage, block: &BlockInfo) {
    app.begin_block(block).await.unwrap();
    app.commit(storage).await.unwrap();
}

#[tokio::test]
async fn proposal_with_reached_spawn_time_spawns_chain() {
    let (mut app, _storage) = initialized_app().await;
    let spawn_time = time("2020-01-02T00:00:00Z");
    app.begin_block(&block_info(1, spawn_time.checked_add(Duration::from_secs(3600)).unwrap()))
        .await
        .unwrap();

    let outcome = app
        .deliver_proposal(raw_proposal(CHAIN_ID, spawn_time))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        SpawnOutcome::Spawned {
            client_id: ClientId::tendermint(0)
        }
    );
    assert_eq!(
        app.child_client(CHAIN_ID).await.unwrap(),
        Some(ClientId::tendermint(0))
    );
    assert_eq!(
        app.child_genesis(CHAIN_ID).await.unwrap(),
        Some(app.make_child_genesis().await.unwrap())
    );
    assert_eq!(
        app.pending_client_info(spawn_time, CHAIN_ID).await.unwrap(),
        None
    );
}

#[tokio::test]
async fn proposal_with_future_spawn_time_is_pending() {
    let (mut app, _storage) = initialized_app().await;
    let now = time("2020-01-02T00:00:00Z");
    let spawn_time = now.checked_add(Duration::from_secs(3600)).unwrap();
    app.begin_block(&block_info(1, now)).await.unwrap();

    let outcome = app
        .deliver_proposal(raw_proposal(CHAIN_ID, spawn_time))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        SpawnOutcome::Pending {
            spawn_time
        }
    );
    assert_eq!(
        app.pending_client_info(spawn_time, CHAIN_ID).await.unwrap(),
        Some(Height::new(2, 3))
    );
    assert_eq!(
        app.pending_spawn_time(CHAIN_ID).await.unwrap(),
        Some(spawn_time)
    );
    assert_eq!(app.child_client(CHAIN_ID).await.unwrap(), None);
    assert_eq!(app.child_genesis(CHAIN_ID).await.unwrap(), None);
}

#[tokio::test]
async fn pending_chain_is_spawned_once_its_time_is_reached() {
    let (mut app, storage) = initialized_app().await;
    let now = time("2020-01-02T00:00:00Z");
    let spawn_time = time("2020-01-02T01:00:00Z");

    app.begin_block(&block_info(1, now)).await.unwrap();
    app.deliver_proposal(raw_proposal(CHAIN_ID, spawn_time))
        .await
        .unwrap();
    app.commit(&storage).await.unwrap();

    run_block(&mut app, &storage, &block_info(2, time("2020-01-02T00:30:00Z"))).await;
    assert_eq!(app.child_client(CHAIN_ID).await.unwrap(), None);

    app.begin_block(&block_info(3, time("2020-01-02T02:00:00Z")))
        .await
        .unwrap();
    assert_eq!(
        app.child_client(CHAIN_ID).await.unwrap(),
        Some(ClientId::tendermint(0))
    );
    assert_eq!(
        app.child_genesis(CHAIN_ID).await.unwrap(),
        Some(app.make_child_genesis().await.unwrap())
    );
    assert_eq!(
        app.pending_client_info(spawn_time, CHAIN_ID).await.unwrap(),
        None
    );
    assert_eq!(app.pending_spawn_time(CHAIN_ID).await.unwrap(), None);
}

#[tokio::test]
async fn immediate_and_deferred_spawns_are_equivalent() {
    let spawn_time = time("2020-01-02T01:00:00Z");
    let first_block = block_info(1, time("2020-01-02T00:00:00Z"));
    let spawn_block = block_info(2, spawn_time);

    let (mut deferred, storage) = initialized_app().await;
    deferred.begin_block(&first_block).await.unwrap();
    deferred
        .deliver_proposal(raw_proposal(CHAIN_ID, spawn_time))
        .await
        .unwrap();
    deferred.commit(&storage).await.unwrap();
    deferred.begin_block(&spawn_block).await.unwrap();

    let (mut immediate, storage) = initialized_app().await;
    run_block(&mut immediate, &storage, &first_block).await;
    immediate.begin_block(&spawn_block).await.unwrap();
    immediate
        .deliver_proposal(raw_proposal(CHAIN_ID, spawn_time))
        .await
        .unwrap();

    assert_eq!(
        deferred.child_client(CHAIN_ID).await.unwrap(),
        immediate.child_client(CHAIN_ID).await.unwrap(),
    );
    let genesis = deferred.child_genesis(CHAIN_ID).await.unwrap();
    assert!(genesis.is_some());
    assert_eq!(genesis, immediate.child_genesis(CHAIN_ID).await.unwrap());
}

#[tokio::test]
async fn chains_due_at_the_same_time_spawn_in_chain_id_order() {
    let (mut app, storage) = initialized_app().await;
    let spawn_time = time("2020-01-02T01:00:00Z");

    app.begin_block(&block_info(1, time("2020-01-02T00:00:00Z")))
        .await
        .unwrap();
    for chain_id in ["b", "a"] {
        app.deliver_proposal(raw_proposal(chain_id, spawn_time))
            .await
            .unwrap();
    }
    app.commit(&storage).await.unwrap();
    app.begin_block(&block_info(2, spawn_time)).await.unwrap();

    assert_eq!(
        app.child_client("a").await.unwrap(),
        Some(ClientId::tendermint(0))
    );
    assert_eq!(
        app.child_client("b").await.unwrap(),
        Some(ClientId::tendermint(1))
    );
}

#[tokio::test]
async fn duplicate_chain_is_rejected_without_changes() {
    let (mut app, _storage) = initialized_app().await;
    let now = time("2020-01-02T00:00:00Z");
    app.begin_block(&block_info(1, now)).await.unwrap();
    app.deliver_proposal(raw_proposal(CHAIN_ID, now))
        .await
        .unwrap();
    let genesis = app.child_genesis(CHAIN_ID).await.unwrap();

    let error = app
        .deliver_proposal(raw_proposal(CHAIN_ID, time("2020-01-03T00:00:00Z")))
        .await
        .unwrap_err();

    assert!(matches!(
        SpawnError::find_in(&error),
        Some(SpawnError::DuplicateChain { chain_id }) if chain_id == CHAIN_ID,
    ));
    assert_eq!(
        app.child_client(CHAIN_ID).await.unwrap(),
        Some(ClientId::tendermint(0))
    );
    assert_eq!(app.child_genesis(CHAIN_ID).await.unwrap(), genesis);
    assert_eq!(app.pending_spawn_time(CHAIN_ID).await.unwrap(), None);
}

#[tokio::test]
async fn malformed_proposal_is_invalid() {
    let (mut app, _storage) = initialized_app().await;
    app.begin_block(&block_info(1, time("2020-01-02T00:00:00Z")))
        .await
        .unwrap();

    let mut content = proposal(CHAIN_ID, time("2020-01-02T01:00:00Z")).into_raw();
    content.chain_id = String::new();
    let error = app
        .deliver_proposal(raw::Proposal::CreateChildChain(content))
        .await
        .unwrap_err();
    assert!(matches!(
        SpawnError::find_in(&error),
        Some(SpawnError::InvalidProposal(_))
    ));

    let mut content = proposal(CHAIN_ID, time("2020-01-02T01:00:00Z")).into_raw();
    content.spawn_time = None;
    let error = app
        .deliver_proposal(raw::Proposal::CreateChildChain(content))
        .await
        .unwrap_err();
    assert!(matches!(
        SpawnError::find_in(&error),
        Some(SpawnError::InvalidProposal(_))
    ));
    assert_eq!(app.pending_spawn_time(CHAIN_ID).await.unwrap(), None);
}

#[tokio::test]
async fn genesis_before_the_first_block_is_unavailable() {
    let (app, _storage) = initialized_app().await;

    let error = app.make_child_genesis().await.unwrap_err();
    assert!(matches!(
        SpawnError::find_in(&error),
        Some(SpawnError::SnapshotUnavailable { height: 0 })
    ));
}

#[tokio::test]
async fn invalid_trust_params_fail_init_chain() {
    let storage = TempStorage::new().await.unwrap();
    let mut app = App::new(storage.latest_snapshot());
    let genesis_state = GenesisAppState {
        params: Params {
            trust: TrustParams {
                trusting_period: Duration::from_secs(1_814_400),
                ..TrustParams::default()
            },
            ..Params::default()
        },
        ..GenesisAppState::default()
    };

    let error = app
        .init_chain(HOST_CHAIN_ID.parse().unwrap(), genesis_state)
        .await
        .unwrap_err();
    assert!(matches!(
        SpawnError::find_in(&error),
        Some(SpawnError::Config(_))
    ));
}

#[tokio::test]
async fn spawned_chains_survive_commit() {
    let (mut app, storage) = initialized_app().await;
    let now = time("2020-01-02T00:00:00Z");
    app.begin_block(&block_info(1, now)).await.unwrap();
    app.deliver_proposal(raw_proposal(CHAIN_ID, now))
        .await
        .unwrap();
    app.commit(&storage).await.unwrap();

    let restarted = App::new(storage.latest_snapshot());
    assert_eq!(
        restarted.child_client(CHAIN_ID).await.unwrap(),
        Some(ClientId::tendermint(0))
    );
    assert_eq!(
        restarted.child_genesis(CHAIN_ID).await.unwrap(),
        app.child_genesis(CHAIN_ID).await.unwrap(),
    );
}

#[tokio::test]
async fn child_genesis_matches_the_counterparty_document() {
    let (mut app, _storage) = initialized_app().await;
    let block = BlockInfo {
        height: 5,
        time: time("2020-01-02T00:00:25Z"),
        app_hash: hex::decode("4fbd86e0c135ae5881a1b929925bba1ce0740f721e12bf3d42c2a0f8a711e97e")
            .unwrap(),
        next_validators_hash: "F3B420764D50CCA0D1731A33137376F102256159EF3A5DB5BB376E8E9B0ABC60"
            .parse::<Hash>()
            .unwrap(),
    };
    app.begin_block(&block).await.unwrap();

    let genesis = app.make_child_genesis().await.unwrap();
    let actual: serde_json::Value = serde_json::from_str(&genesis.to_json().unwrap()).unwrap();
    let expected = serde_json::json!({
        "params": {"Enabled": true},
        "new_chain": true,
        "parent_client_state": {
            "chain_id": "testchain0",
            "trust_level": {"numerator": 1, "denominator": 3},
            "trusting_period": 907_200_000_000_000_u64,
            "unbonding_period": 1_814_400_000_000_000_u64,
            "max_clock_drift": 10_000_000_000_u64,
            "frozen_height": {},
            "latest_height": {"revision_height": 5},
            "proof_specs": [
                {
                    "leaf_spec": {"hash": 1, "prehash_value": 1, "length": 1, "prefix": "AA=="},
                    "inner_spec": {
                        "child_order": [0, 1],
                        "child_size": 33,
                        "min_prefix_length": 4,
                        "max_prefix_length": 12,
                        "hash": 1
                    }
                },
                {
                    "leaf_spec": {"hash": 1, "prehash_value": 1, "length": 1, "prefix": "AA=="},
                    "inner_spec": {
                        "child_order": [0, 1],
                        "child_size": 32,
                        "min_prefix_length": 1,
                        "max_prefix_length": 1,
                        "hash": 1
                    }
                }
            ],
            "upgrade_path": ["upgrade", "upgradedIBCState"],
            "allow_update_after_expiry": true,
            "allow_update_after_misbehaviour": true
        },
        "parent_consensus_state": {
            "timestamp": "2020-01-02T00:00:25Z",
            "root": {"hash": "T72G4ME1rliBobkpklu6HOB0D3IeEr89QsKg+KcR6X4="},
            "next_validators_hash": "F3B420764D50CCA0D1731A33137376F102256159EF3A5DB5BB376E8E9B0ABC60"
        },
        "unbonding_sequences": null
    });
    assert_json_eq!(actual, expected);
}
