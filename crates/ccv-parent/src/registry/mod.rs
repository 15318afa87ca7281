//! The chains spawned by the parent: their light client and their genesis document.

mod state_ext;
pub(crate) mod storage;

pub(crate) use state_ext::{
    StateReadExt,
    StateWriteExt,
};
