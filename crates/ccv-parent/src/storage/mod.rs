mod stored_value;
mod timestamp;

pub(crate) use stored_value::StoredValue;
pub(crate) use timestamp::{
    deserialize_timestamp,
    serialize_timestamp,
    timestamp_from_nanos,
    timestamp_nanos,
};
