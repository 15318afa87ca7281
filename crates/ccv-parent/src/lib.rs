//! The parent side of cross-chain validation.
//!
//! The parent chain accepts governance proposals to spawn child chains that share
//! its validator set. At the proposal's spawn time, it creates a light client of the
//! child, constructs the child's genesis document embedding a light client of the
//! parent, and registers both under the child's chain ID.

pub mod app;
pub(crate) mod clients;
pub(crate) mod component;
mod error;
pub(crate) mod genesis;
pub(crate) mod params;
pub(crate) mod pending;
pub(crate) mod registry;
pub(crate) mod spawn;
pub(crate) mod storage;
pub(crate) mod unbonding;
pub(crate) mod utils;

#[cfg(test)]
pub(crate) mod test_utils;

pub use app::{
    App,
    BlockInfo,
};
pub use error::SpawnError;
pub use spawn::SpawnOutcome;
