use borsh::{
    io::{
        Read,
        Write,
    },
    BorshDeserialize as _,
    BorshSerialize as _,
};
use tendermint::Time;

const NANOS_PER_SECOND: u128 = 1_000_000_000;

/// Returns the nanoseconds since the Unix epoch, failing for earlier times.
pub(crate) fn timestamp_nanos(time: Time) -> std::io::Result<u128> {
    u128::try_from(time.unix_timestamp_nanos()).map_err(std::io::Error::other)
}

/// Writes `time` as a `u128` of nanoseconds since the Unix epoch.
///
/// `i128` is avoided as not all borsh implementations support it.
pub(crate) fn serialize_timestamp<W: Write>(time: Time, writer: &mut W) -> std::io::Result<()> {
    timestamp_nanos(time)?.serialize(writer)
}

/// Inverse of [`timestamp_nanos`].
pub(crate) fn timestamp_from_nanos(nanos: u128) -> std::io::Result<Time> {
    let seconds = i64::try_from(nanos / NANOS_PER_SECOND).map_err(std::io::Error::other)?;
    let subsec_nanos = u32::try_from(nanos % NANOS_PER_SECOND).map_err(std::io::Error::other)?;
    Time::from_unix_timestamp(seconds, subsec_nanos).map_err(std::io::Error::other)
}

pub(crate) fn deserialize_timestamp<R: Read>(reader: &mut R) -> std::io::Result<Time> {
    u128::deserialize_reader(reader).and_then(timestamp_from_nanos)
}
