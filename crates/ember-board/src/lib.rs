//! Board state for the Ember fire-rescue simulation.
//!
//! Three mutable overlays over a fixed-size grid:
//!
//! - [`GridTopology`] — static geometry plus the two mutable pieces of
//!   structure: per-cell wall masks and the door list.
//! - [`HazardField`] — the sparse smoke/fire marker map and the
//!   environmental advance step (ignition, escalation, explosion chain
//!   reactions, flashover).
//! - [`PoiRegistry`] — hidden/revealed victim and false-alarm markers
//!   with the active-situation replenishment policy.
//!
//! [`MapLayout`] is the opaque, validated snapshot an external map
//! loader hands to the core at run start.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod grid;
pub mod hazard;
pub mod map;
pub mod poi;

pub use grid::{Door, GridTopology};
pub use hazard::{AdvanceReport, HazardEvent, HazardField};
pub use map::{MapError, MapLayout};
pub use poi::{Poi, PoiRegistry, MIN_ACTIVE_SITUATIONS};
