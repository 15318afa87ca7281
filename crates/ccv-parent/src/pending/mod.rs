//! Spawn requests whose spawn time has not been reached yet.
//!
//! Entries are indexed by spawn time first, so that the entries due at a given
//! block time are found by a prefix scan that stops at the first entry lying in
//! the future.

mod state_ext;
pub(crate) mod storage;

use ccv_core::protocol::client::v1::Height;
pub(crate) use state_ext::{
    StateReadExt,
    StateWriteExt,
};

/// What is needed to finalize a spawn once its time has come.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PendingClientInfo {
    pub(crate) chain_id: String,
    pub(crate) initial_height: Height,
}
