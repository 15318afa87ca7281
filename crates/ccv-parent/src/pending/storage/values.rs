use borsh::{
    io::{
        Read,
        Write,
    },
    BorshDeserialize,
    BorshSerialize,
};
use ccv_core::protocol::client::v1::Height;
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
    PendingClient(PendingClient),
    SpawnTime(SpawnTime),
}

/// The initial height of the child chain awaiting its spawn time.
#[derive(Debug, BorshSerialize, BorshDeserialize)]
pub(in crate::pending) struct PendingClient {
    revision_number: u64,
    revision_height: u64,
}

impl From<Height> for PendingClient {
    fn from(height: Height) -> Self {
        Self {
            revision_number: height.revision_number,
            revision_height: height.revision_height,
        }
    }
}

impl From<PendingClient> for Height {
    fn from(value: PendingClient) -> Self {
        Height::new(value.revision_number, value.revision_height)
    }
}

#[derive(Debug)]
pub(in crate::pending) struct SpawnTime(Time);

impl From<Time> for SpawnTime {
    fn from(time: Time) -> Self {
        SpawnTime(time)
    }
}

impl From<SpawnTime> for Time {
    fn from(spawn_time: SpawnTime) -> Self {
        spawn_time.0
    }
}

impl BorshSerialize for SpawnTime {
    fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        serialize_timestamp(self.0, writer)
    }
}

impl BorshDeserialize for SpawnTime {
    fn deserialize_reader<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        deserialize_timestamp(reader).map(SpawnTime)
    }
}

macro_rules! impl_stored_value {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for StoredValue<'_> {
                fn from(value: $variant) -> Self {
                    StoredValue::Pending(Value(ValueImpl::$variant(value)))
                }
            }

            impl<'a> TryFrom<StoredValue<'a>> for $variant {
                type Error = eyre::Report;

                fn try_from(value: StoredValue<'a>) -> Result<Self, Self::Error> {
                    let StoredValue::Pending(Value(ValueImpl::$variant(value))) = value else {
                        bail!(
                            "pending stored value type mismatch: expected {}, found {value:?}",
                            stringify!($variant),
                        );
                    };
                    Ok(value)
                }
            }
        )*
    };
}

impl_stored_value!(PendingClient, SpawnTime);
