//! Scheduling and execution of child chain spawns.
//!
//! A spawn proposal is executed on the block it is delivered in if its spawn time
//! was reached. Otherwise it is queued and executed by the sweep at the start of
//! the first block whose time is at or after the spawn time. Both paths run the
//! same spawn execution.

mod component;
mod scheduler;

use ccv_core::protocol::client::v1::ClientId;
pub(crate) use component::ParentComponent;
pub(crate) use scheduler::handle_spawn_proposal;
use tendermint::Time;

/// What happened to a delivered spawn proposal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpawnOutcome {
    /// The spawn time was reached and the chain was spawned right away.
    Spawned { client_id: ClientId },
    /// The chain will be spawned at the start of the first block at or after
    /// `spawn_time`.
    Pending { spawn_time: Time },
}
