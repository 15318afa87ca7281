use std::time::Duration;

use base64_serde::base64_serde_type;
use serde::{
    Deserialize as _,
    Deserializer,
    Serializer,
};

base64_serde_type!(pub(crate) Base64Standard, base64::engine::general_purpose::STANDARD);

/// Durations are encoded as an integer number of nanoseconds.
pub(crate) mod duration_nanos {
    use super::*;

    pub(crate) fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let nanos = u64::try_from(duration.as_nanos())
            .map_err(|_| serde::ser::Error::custom("duration does not fit into u64 nanoseconds"))?;
        serializer.serialize_u64(nanos)
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_nanos)
    }
}

pub(crate) fn is_zero(value: &u64) -> bool {
    *value == 0
}

pub(crate) fn is_zero_i32(value: &i32) -> bool {
    *value == 0
}

pub(crate) fn is_empty<T: AsRef<[u8]>>(value: &T) -> bool {
    value.as_ref().is_empty()
}
