mod state_ext;
pub(crate) mod storage;

pub(crate) use state_ext::{
    StateReadExt,
    StateWriteExt,
};
