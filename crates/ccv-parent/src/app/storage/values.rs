use std::{
    borrow::Cow,
    fmt::{
        self,
        Debug,
        Formatter,
    },
};

use borsh::{
    io::{
        Read,
        Write,
    },
    BorshDeserialize,
    BorshSerialize,
};
use ccv_core::protocol::client::v1 as client;
use eyre::bail;
use tendermint::{
    Hash,
    Time,
};

use crate::storage::{
    deserialize_timestamp,
    serialize_timestamp,
    StoredValue,
};

#[derive(Debug, BorshSerialize, BorshDeserialize)]
pub(crate) struct Value<'a>(ValueImpl<'a>);

#[derive(Debug, BorshSerialize, BorshDeserialize)]
enum ValueImpl<'a> {
    ChainId(ChainId<'a>),
    RevisionNumber(RevisionNumber),
    BlockHeight(BlockHeight),
    BlockTimestamp(BlockTimestamp),
    ConsensusState(ConsensusState<'a>),
}

#[derive(Debug, BorshSerialize, BorshDeserialize)]
pub(in crate::app) struct ChainId<'a>(Cow<'a, str>);

impl<'a> From<&'a tendermint::chain::Id> for ChainId<'a> {
    fn from(chain_id: &'a tendermint::chain::Id) -> Self {
        ChainId(Cow::Borrowed(chain_id.as_str()))
    }
}

impl<'a> TryFrom<ChainId<'a>> for tendermint::chain::Id {
    type Error = tendermint::Error;

    fn try_from(chain_id: ChainId<'a>) -> Result<Self, Self::Error> {
        Self::try_from(chain_id.0.into_owned())
    }
}

#[derive(Debug, BorshSerialize, BorshDeserialize)]
pub(in crate::app) struct RevisionNumber(u64);

impl From<u64> for RevisionNumber {
    fn from(revision_number: u64) -> Self {
        RevisionNumber(revision_number)
    }
}

impl From<RevisionNumber> for u64 {
    fn from(revision_number: RevisionNumber) -> Self {
        revision_number.0
    }
}

#[derive(Debug, BorshSerialize, BorshDeserialize)]
pub(in crate::app) struct BlockHeight(u64);

impl From<u64> for BlockHeight {
    fn from(block_height: u64) -> Self {
        BlockHeight(block_height)
    }
}

impl From<BlockHeight> for u64 {
    fn from(block_height: BlockHeight) -> Self {
        block_height.0
    }
}

#[derive(Debug)]
pub(in crate::app) struct BlockTimestamp(Time);

impl From<Time> for BlockTimestamp {
    fn from(block_timestamp: Time) -> Self {
        BlockTimestamp(block_timestamp)
    }
}

impl From<BlockTimestamp> for Time {
    fn from(block_timestamp: BlockTimestamp) -> Self {
        block_timestamp.0
    }
}

impl BorshSerialize for BlockTimestamp {
    fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        serialize_timestamp(self.0, writer)
    }
}

impl BorshDeserialize for BlockTimestamp {
    fn deserialize_reader<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        deserialize_timestamp(reader).map(BlockTimestamp)
    }
}

/// The host chain's own consensus state at some height.
pub(in crate::app) struct ConsensusState<'a> {
    timestamp: Time,
    root: Cow<'a, [u8]>,
    next_validators_hash: Cow<'a, [u8]>,
}

impl Debug for ConsensusState<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsensusState")
            .field("timestamp", &self.timestamp.to_rfc3339())
            .field("root", &hex::encode(&self.root))
            .field("next_validators_hash", &hex::encode(&self.next_validators_hash))
            .finish()
    }
}

impl<'a> From<&'a client::ConsensusState> for ConsensusState<'a> {
    fn from(state: &'a client::ConsensusState) -> Self {
        Self {
            timestamp: state.timestamp,
            root: Cow::Borrowed(&state.root.hash),
            next_validators_hash: Cow::Borrowed(state.next_validators_hash.as_bytes()),
        }
    }
}

impl<'a> TryFrom<ConsensusState<'a>> for client::ConsensusState {
    type Error = tendermint::Error;

    fn try_from(state: ConsensusState<'a>) -> Result<Self, Self::Error> {
        let next_validators_hash =
            Hash::from_bytes(tendermint::hash::Algorithm::Sha256, &state.next_validators_hash)?;
        Ok(client::ConsensusState::new(
            state.timestamp,
            state.root.into_owned(),
            next_validators_hash,
        ))
    }
}

impl BorshSerialize for ConsensusState<'_> {
    fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        serialize_timestamp(self.timestamp, writer)?;
        self.root.serialize(writer)?;
        self.next_validators_hash.serialize(writer)
    }
}

impl BorshDeserialize for ConsensusState<'_> {
    fn deserialize_reader<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        let timestamp = deserialize_timestamp(reader)?;
        let root = Vec::<u8>::deserialize_reader(reader)?;
        let next_validators_hash = Vec::<u8>::deserialize_reader(reader)?;
        Ok(Self {
            timestamp,
            root: Cow::Owned(root),
            next_validators_hash: Cow::Owned(next_validators_hash),
        })
    }
}

macro_rules! impl_stored_value {
    ($($variant:ident),* $(,)?) => {
        $(
            impl<'a> From<$variant<'a>> for StoredValue<'a> {
                fn from(value: $variant<'a>) -> Self {
                    StoredValue::App(Value(ValueImpl::$variant(value)))
                }
            }

            impl<'a> TryFrom<StoredValue<'a>> for $variant<'a> {
                type Error = eyre::Report;

                fn try_from(value: StoredValue<'a>) -> Result<Self, Self::Error> {
                    let StoredValue::App(Value(ValueImpl::$variant(value))) = value else {
                        bail!(
                            "app stored value type mismatch: expected {}, found {value:?}",
                            stringify!($variant),
                        );
                    };
                    Ok(value)
                }
            }
        )*
    };
}

macro_rules! impl_stored_value_owned {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for StoredValue<'_> {
                fn from(value: $variant) -> Self {
                    StoredValue::App(Value(ValueImpl::$variant(value)))
                }
            }

            impl<'a> TryFrom<StoredValue<'a>> for $variant {
                type Error = eyre::Report;

                fn try_from(value: StoredValue<'a>) -> Result<Self, Self::Error> {
                    let StoredValue::App(Value(ValueImpl::$variant(value))) = value else {
                        bail!(
                            "app stored value type mismatch: expected {}, found {value:?}",
                            stringify!($variant),
                        );
                    };
                    Ok(value)
                }
            }
        )*
    };
}

impl_stored_value!(ChainId, ConsensusState);
impl_stored_value_owned!(RevisionNumber, BlockHeight, BlockTimestamp);
