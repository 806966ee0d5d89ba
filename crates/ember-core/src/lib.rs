//! Core types for the Ember fire-rescue simulation.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every other Ember crate: cell coordinates
//! and directions, agent identifiers and roles, hazard/door/POI states,
//! terminal reasons, and run statistics.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cell;
pub mod id;
pub mod state;

pub use cell::{Cell, Direction};
pub use id::AgentId;
pub use state::{CellStatus, DoorStatus, EndReason, HazardState, PoiKind, Role, RunStats};
