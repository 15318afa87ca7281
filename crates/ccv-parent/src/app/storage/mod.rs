pub(super) mod keys;
mod values;

pub(crate) use values::Value;
pub(super) use values::{
    BlockHeight,
    BlockTimestamp,
    ChainId,
    ConsensusState,
    RevisionNumber,
};
