use std::{
    fmt::{
        self,
        Display,
        Formatter,
    },
    time::Duration,
};

use serde::{
    Deserialize,
    Serialize,
};
use tendermint::{
    Hash,
    Time,
};

use crate::serde::{
    duration_nanos,
    is_empty,
    is_zero,
    is_zero_i32,
    Base64Standard,
};

/// The client type of every light client created by the parent chain.
pub const TENDERMINT_CLIENT_TYPE: &str = "07-tendermint";

/// The commitment root used for a light client of a chain that has not produced
/// any blocks yet.
pub const SENTINEL_ROOT: &[u8] = b"sentinel_root";

/// A height on a chain that may be upgraded, identified by its revision number and
/// the height within that revision.
///
/// Zero fields are omitted from the JSON form, so that the zero height is `{}`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Height {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub revision_number: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub revision_height: u64,
}

impl Height {
    #[must_use]
    pub const fn new(revision_number: u64, revision_height: u64) -> Self {
        Self {
            revision_number,
            revision_height,
        }
    }

    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.revision_number == 0 && self.revision_height == 0
    }
}

impl Display for Height {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.revision_number, self.revision_height)
    }
}

/// Extracts the revision number from a chain ID of the form `{name}-{revision}`.
///
/// Chain IDs not following that format (including revisions with leading zeros)
/// are in revision 0.
#[must_use]
pub fn revision_number_from_chain_id(chain_id: &str) -> u64 {
    let Some((name, revision)) = chain_id.rsplit_once('-') else {
        return 0;
    };
    if name.is_empty() || revision.starts_with('0') {
        return 0;
    }
    revision.parse().unwrap_or(0)
}

/// The fraction of a validator set's voting power that must sign a header for a
/// light client to trust it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustLevel {
    pub numerator: u64,
    pub denominator: u64,
}

impl TrustLevel {
    pub const ONE_THIRD: Self = Self {
        numerator: 1,
        denominator: 3,
    };

    /// Returns if the level lies within `[1/3, 1]`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let Self {
            numerator,
            denominator,
        } = *self;
        denominator != 0
            && numerator <= denominator
            && u128::from(numerator) * 3 >= u128::from(denominator)
    }
}

impl Default for TrustLevel {
    fn default() -> Self {
        Self::ONE_THIRD
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafOp {
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub hash: i32,
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub prehash_key: i32,
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub prehash_value: i32,
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub length: i32,
    #[serde(default, skip_serializing_if = "is_empty", with = "Base64Standard")]
    pub prefix: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InnerSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub child_order: Vec<i32>,
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub child_size: i32,
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub min_prefix_length: i32,
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub max_prefix_length: i32,
    #[serde(default, skip_serializing_if = "is_empty", with = "Base64Standard")]
    pub empty_child: Vec<u8>,
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub hash: i32,
}

/// The shape of the merkle tree a light client verifies membership proofs against.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaf_spec: Option<LeafOp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_spec: Option<InnerSpec>,
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub max_depth: i32,
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub min_depth: i32,
}

impl From<ics23::ProofSpec> for ProofSpec {
    fn from(spec: ics23::ProofSpec) -> Self {
        let leaf_spec = spec.leaf_spec.map(|leaf| LeafOp {
            hash: leaf.hash,
            prehash_key: leaf.prehash_key,
            prehash_value: leaf.prehash_value,
            length: leaf.length,
            prefix: leaf.prefix,
        });
        let inner_spec = spec.inner_spec.map(|inner| InnerSpec {
            child_order: inner.child_order,
            child_size: inner.child_size,
            min_prefix_length: inner.min_prefix_length,
            max_prefix_length: inner.max_prefix_length,
            empty_child: inner.empty_child,
            hash: inner.hash,
        });
        Self {
            leaf_spec,
            inner_spec,
            max_depth: spec.max_depth,
            min_depth: spec.min_depth,
        }
    }
}

/// The proof specs of a cosmos-sdk style chain: an IAVL store nested in a
/// tendermint simple merkle tree.
#[must_use]
pub fn sdk_proof_specs() -> Vec<ProofSpec> {
    vec![ics23::iavl_spec().into(), ics23::tendermint_spec().into()]
}

/// The upgrade path of a cosmos-sdk style chain.
#[must_use]
pub fn sdk_upgrade_path() -> Vec<String> {
    vec!["upgrade".to_string(), "upgradedIBCState".to_string()]
}

/// A tendermint light client descriptor.
///
/// Instances are built by the parent chain and never change after that; there are
/// deliberately no setters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientState {
    pub chain_id: String,
    pub trust_level: TrustLevel,
    #[serde(with = "duration_nanos")]
    pub trusting_period: Duration,
    #[serde(with = "duration_nanos")]
    pub unbonding_period: Duration,
    #[serde(with = "duration_nanos")]
    pub max_clock_drift: Duration,
    #[serde(default)]
    pub frozen_height: Height,
    pub latest_height: Height,
    pub proof_specs: Vec<ProofSpec>,
    pub upgrade_path: Vec<String>,
    pub allow_update_after_expiry: bool,
    pub allow_update_after_misbehaviour: bool,
}

impl ClientState {
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        !self.frozen_height.is_zero()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleRoot {
    #[serde(default, with = "Base64Standard")]
    pub hash: Vec<u8>,
}

/// The consensus state of a chain at a given height, as tracked by a light client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusState {
    pub timestamp: Time,
    pub root: MerkleRoot,
    pub next_validators_hash: Hash,
}

impl ConsensusState {
    #[must_use]
    pub fn new(timestamp: Time, root: Vec<u8>, next_validators_hash: Hash) -> Self {
        Self {
            timestamp,
            root: MerkleRoot {
                hash: root,
            },
            next_validators_hash,
        }
    }
}

/// The identifier the host's client registry assigns to a newly created light client.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    /// Returns the identifier of the tendermint client created as the `counter`-th client.
    #[must_use]
    pub fn tendermint(counter: u64) -> Self {
        Self(format!("{TENDERMINT_CLIENT_TYPE}-{counter}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ClientId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Display for ClientId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
