use serde::{
    Deserialize,
    Serialize,
};
use tendermint::Time;

use crate::protocol::client::v1::{
    ClientState,
    ConsensusState,
};

/// Parameters of the child chain's CCV module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    #[serde(rename = "Enabled")]
    pub enabled: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            enabled: true,
        }
    }
}

/// A pending unbonding operation on the parent chain.
///
/// Records are carried into every newly spawned child's genesis so that stake being
/// withdrawn on the parent is accounted for on the child from its first block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbondingSequence {
    pub unbonding_sequence: u64,
    pub unbonding_time: Time,
}

/// The genesis document handed to a freshly spawned child chain.
///
/// The JSON form of this type is consumed by the child chain's bootstrap tooling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub params: Params,
    pub new_chain: bool,
    pub parent_client_state: ClientState,
    pub parent_consensus_state: ConsensusState,
    /// `None` if there were no outstanding unbonding operations.
    #[serde(default)]
    pub unbonding_sequences: Option<Vec<UnbondingSequence>>,
}

impl GenesisState {
    /// Constructs the genesis of a new child chain.
    ///
    /// An empty set of unbonding sequences is normalized to `None`.
    #[must_use]
    pub fn new_chain(
        params: Params,
        parent_client_state: ClientState,
        parent_consensus_state: ConsensusState,
        unbonding_sequences: Vec<UnbondingSequence>,
    ) -> Self {
        Self {
            params,
            new_chain: true,
            parent_client_state,
            parent_consensus_state,
            unbonding_sequences: (!unbonding_sequences.is_empty()).then_some(unbonding_sequences),
        }
    }

    /// Serializes the genesis into its canonical JSON document.
    ///
    /// # Errors
    /// Returns an error if serialization fails, which only happens for durations
    /// that do not fit into 64 bit nanoseconds.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses a genesis from its JSON document.
    ///
    /// # Errors
    /// Returns an error if `json` is not a valid child genesis document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
