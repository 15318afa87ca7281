//! Domain types for cross-chain validation between a parent chain and the child
//! chains it spawns.
//!
//! The types in this crate are shared by the parent's state machine and by any
//! tooling that bootstraps a child chain from the genesis document produced by
//! the parent. Their JSON forms are interoperable with the counterparty tooling,
//! so field names and nesting must not change.

pub mod protocol;
pub(crate) mod serde;
