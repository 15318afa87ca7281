use borsh::{
    io::{
        Read,
        Write,
    },
    BorshDeserialize,
    BorshSerialize,
};
use ccv_core::protocol::child::v1 as child;
use eyre::bail;
use tendermint::Time;

use crate::storage::{
    deserialize_timestamp,
    serialize_timestamp,
    StoredValue,
};

#[derive(Debug, BorshSerialize, BorshDeserialize)]
pub(crate) struct Value(ValueImpl);

#[derive(Debug, BorshSerialize, BorshDeserialize)]
enum ValueImpl {
    UnbondingSequence(UnbondingSequence),
}

#[derive(Debug)]
pub(in crate::unbonding) struct UnbondingSequence {
    sequence: u64,
    time: Time,
}

impl From<child::UnbondingSequence> for UnbondingSequence {
    fn from(value: child::UnbondingSequence) -> Self {
        Self {
            sequence: value.unbonding_sequence,
            time: value.unbonding_time,
        }
    }
}

impl From<UnbondingSequence> for child::UnbondingSequence {
    fn from(value: UnbondingSequence) -> Self {
        Self {
            unbonding_sequence: value.sequence,
            unbonding_time: value.time,
        }
    }
}

impl BorshSerialize for UnbondingSequence {
    fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        self.sequence.serialize(writer)?;
        serialize_timestamp(self.time, writer)
    }
}

impl BorshDeserialize for UnbondingSequence {
    fn deserialize_reader<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        let sequence = u64::deserialize_reader(reader)?;
        let time = deserialize_timestamp(reader)?;
        Ok(Self {
            sequence,
            time,
        })
    }
}

impl From<UnbondingSequence> for StoredValue<'_> {
    fn from(value: UnbondingSequence) -> Self {
        StoredValue::Unbonding(Value(ValueImpl::UnbondingSequence(value)))
    }
}

impl<'a> TryFrom<StoredValue<'a>> for UnbondingSequence {
    type Error = eyre::Report;

    fn try_from(value: StoredValue<'a>) -> Result<Self, Self::Error> {
        let StoredValue::Unbonding(Value(ValueImpl::UnbondingSequence(value))) = value else {
            bail!(
                "unbonding stored value type mismatch: expected unbonding sequence, found \
                 {value:?}"
            );
        };
        Ok(value)
    }
}
