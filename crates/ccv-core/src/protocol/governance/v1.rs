//! Governance proposals handled by the parent chain's CCV module.
//!
//! Proposals reach the parent only after they passed voting. The [`raw`] types are
//! what governance hands over; they are validated into the domain types of this
//! module before the parent acts on them.

use serde::{
    Deserialize,
    Serialize,
};
use tendermint::Time;

use crate::protocol::client::v1::Height;

pub mod raw {
    //! Unvalidated proposal contents as delivered by governance.

    use serde::{
        Deserialize,
        Serialize,
    };
    use tendermint::Time;

    use crate::{
        protocol::client::v1::Height,
        serde::Base64Standard,
    };

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CreateChildChainProposal {
        pub title: String,
        pub description: String,
        pub chain_id: String,
        pub initial_height: Height,
        #[serde(with = "Base64Standard")]
        pub genesis_hash: Vec<u8>,
        #[serde(with = "Base64Standard")]
        pub binary_hash: Vec<u8>,
        #[serde(default)]
        pub spawn_time: Option<Time>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(tag = "type", rename_all = "snake_case")]
    pub enum Proposal {
        CreateChildChain(CreateChildChainProposal),
    }
}

/// A proposal to spawn a new child chain at `spawn_time`.
///
/// Verified on construction: all string and hash fields are non-empty, the initial
/// height is not zero, and the spawn time lies after the Unix epoch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "raw::CreateChildChainProposal",
    into = "raw::CreateChildChainProposal"
)]
pub struct CreateChildChainProposal {
    title: String,
    description: String,
    chain_id: String,
    initial_height: Height,
    genesis_hash: Vec<u8>,
    binary_hash: Vec<u8>,
    spawn_time: Time,
}

impl CreateChildChainProposal {
    /// Constructs a new proposal.
    ///
    /// # Errors
    /// Returns an error if any of the validity constraints listed on the type are
    /// violated.
    pub fn new(
        title: String,
        description: String,
        chain_id: String,
        initial_height: Height,
        genesis_hash: Vec<u8>,
        binary_hash: Vec<u8>,
        spawn_time: Time,
    ) -> Result<Self, ProposalError> {
        if title.trim().is_empty() {
            return Err(ProposalError::field_empty("title"));
        }
        if description.trim().is_empty() {
            return Err(ProposalError::field_empty("description"));
        }
        if chain_id.trim().is_empty() {
            return Err(ProposalError::field_empty("chain_id"));
        }
        if initial_height.is_zero() {
            return Err(ProposalError::zero_initial_height());
        }
        if genesis_hash.is_empty() {
            return Err(ProposalError::field_empty("genesis_hash"));
        }
        if binary_hash.is_empty() {
            return Err(ProposalError::field_empty("binary_hash"));
        }
        if spawn_time <= Time::unix_epoch() {
            return Err(ProposalError::spawn_time_not_set());
        }
        Ok(Self {
            title,
            description,
            chain_id,
            initial_height,
            genesis_hash,
            binary_hash,
            spawn_time,
        })
    }

    /// Validates a raw proposal.
    ///
    /// # Errors
    /// Returns an error if the spawn time is missing or if [`Self::new`] fails.
    pub fn try_from_raw(raw: raw::CreateChildChainProposal) -> Result<Self, ProposalError> {
        let raw::CreateChildChainProposal {
            title,
            description,
            chain_id,
            initial_height,
            genesis_hash,
            binary_hash,
            spawn_time,
        } = raw;
        let spawn_time = spawn_time.ok_or_else(ProposalError::spawn_time_not_set)?;
        Self::new(
            title,
            description,
            chain_id,
            initial_height,
            genesis_hash,
            binary_hash,
            spawn_time,
        )
    }

    #[must_use]
    pub fn into_raw(self) -> raw::CreateChildChainProposal {
        let Self {
            title,
            description,
            chain_id,
            initial_height,
            genesis_hash,
            binary_hash,
            spawn_time,
        } = self;
        raw::CreateChildChainProposal {
            title,
            description,
            chain_id,
            initial_height,
            genesis_hash,
            binary_hash,
            spawn_time: Some(spawn_time),
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    #[must_use]
    pub fn initial_height(&self) -> Height {
        self.initial_height
    }

    #[must_use]
    pub fn genesis_hash(&self) -> &[u8] {
        &self.genesis_hash
    }

    #[must_use]
    pub fn binary_hash(&self) -> &[u8] {
        &self.binary_hash
    }

    #[must_use]
    pub fn spawn_time(&self) -> Time {
        self.spawn_time
    }
}

impl TryFrom<raw::CreateChildChainProposal> for CreateChildChainProposal {
    type Error = ProposalError;

    fn try_from(value: raw::CreateChildChainProposal) -> Result<Self, Self::Error> {
        Self::try_from_raw(value)
    }
}

impl From<CreateChildChainProposal> for raw::CreateChildChainProposal {
    fn from(value: CreateChildChainProposal) -> Self {
        value.into_raw()
    }
}

/// The closed set of proposal kinds the parent acts on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Proposal {
    CreateChildChain(CreateChildChainProposal),
}

impl Proposal {
    /// Validates the contents of a raw proposal.
    ///
    /// # Errors
    /// Returns an error if the contents are invalid.
    pub fn try_from_raw(raw: raw::Proposal) -> Result<Self, ProposalError> {
        match raw {
            raw::Proposal::CreateChildChain(content) => {
                CreateChildChainProposal::try_from_raw(content).map(Self::CreateChildChain)
            }
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateChildChain(_) => "create_child_chain",
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::CreateChildChain(proposal) => proposal.title(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ProposalError(ProposalErrorKind);

impl ProposalError {
    fn field_empty(name: &'static str) -> Self {
        Self(ProposalErrorKind::FieldEmpty {
            name,
        })
    }

    fn zero_initial_height() -> Self {
        Self(ProposalErrorKind::ZeroInitialHeight)
    }

    fn spawn_time_not_set() -> Self {
        Self(ProposalErrorKind::SpawnTimeNotSet)
    }
}

#[derive(Debug, thiserror::Error)]
enum ProposalErrorKind {
    #[error("field `{name}` must not be empty")]
    FieldEmpty { name: &'static str },
    #[error("initial height must not be zero")]
    ZeroInitialHeight,
    #[error("spawn time must be set to a time after the unix epoch")]
    SpawnTimeNotSet,
}
