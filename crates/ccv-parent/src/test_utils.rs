use ccv_core::protocol::{
    child::v1::GenesisState,
    client::v1::{
        ClientState,
        ConsensusState,
        Height,
    },
    governance::v1::CreateChildChainProposal,
    parent::v1::{
        Params,
        TrustParams,
    },
};
use cnidarium::{
    Snapshot,
    StateDelta,
    TempStorage,
};
use tendermint::{
    Hash,
    Time,
};

use crate::{
    app::{
        BlockInfo,
        StateWriteExt as _,
    },
    clients::ClientStateBuilder,
    params::StateWriteExt as _,
};

pub(crate) const HOST_CHAIN_ID: &str = "testchain0";

pub(crate) fn time(rfc3339: &str) -> Time {
    Time::parse_from_rfc3339(rfc3339).unwrap()
}

pub(crate) fn next_validators_hash() -> Hash {
    Hash::Sha256([7; 32])
}

pub(crate) fn block_info(height: u64, time: Time) -> BlockInfo {
    BlockInfo {
        height,
        time,
        app_hash: vec![u8::try_from(height % 256).unwrap(); 32],
        next_validators_hash: next_validators_hash(),
    }
}

pub(crate) fn proposal(chain_id: &str, spawn_time: Time) -> CreateChildChainProposal {
    CreateChildChainProposal::new(
        "title".to_string(),
        "description".to_string(),
        chain_id.to_string(),
        Height::new(2, 3),
        b"gen_hash".to_vec(),
        b"bin_hash".to_vec(),
        spawn_time,
    )
    .unwrap()
}

/// A host state at `block`, as recorded at the start of that block.
pub(crate) fn host_state(storage: &TempStorage, block: &BlockInfo) -> StateDelta<Snapshot> {
    let mut state = StateDelta::new(storage.latest_snapshot());
    state
        .put_chain_id_and_revision_number(HOST_CHAIN_ID.parse().unwrap())
        .unwrap();
    state.put_params(&Params::default()).unwrap();
    state.put_block_height(block.height).unwrap();
    state.put_block_timestamp(block.time).unwrap();
    state
        .put_consensus_state_at(block.height, &block.consensus_state())
        .unwrap();
    state
}

pub(crate) fn genesis_state() -> GenesisState {
    let client_state: ClientState = ClientStateBuilder::new(&TrustParams::default())
        .unwrap()
        .build(HOST_CHAIN_ID, Height::new(0, 5))
        .unwrap();
    let consensus_state = ConsensusState::new(
        time("2020-01-02T00:00:25Z"),
        vec![1; 32],
        next_validators_hash(),
    );
    GenesisState::new_chain(
        ccv_core::protocol::child::v1::Params::default(),
        client_state,
        consensus_state,
        vec![],
    )
}
