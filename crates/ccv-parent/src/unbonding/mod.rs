//! Unbonding operations of the parent chain that spawned children must learn about.

mod state_ext;
pub(crate) mod storage;

pub(crate) use state_ext::{
    StateReadExt,
    StateWriteExt,
};
