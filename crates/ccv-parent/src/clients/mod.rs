//! Light clients hosted by the parent chain, and the builder of their descriptors.

mod builder;
mod state_ext;
pub(crate) mod storage;

pub(crate) use builder::ClientStateBuilder;
pub(crate) use state_ext::{
    StateReadExt,
    StateWriteExt,
};
