//! Frame traces and determinism verification for Ember simulations.
//!
//! A run's observable output is its [`FrameTrace`]: an ordered sequence
//! of [`Frame`] snapshots, one per engine step (finer-grained when the
//! engine records per-agent detail). The trace is the only contract an
//! external renderer or visualizer consumes.
//!
//! For determinism verification the crate hashes frames and traces with
//! FNV-1a ([`frame_hash`], [`trace_hash`]) and reports the first
//! diverging frame between two traces ([`first_divergence`]).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod compare;
pub mod frame;
pub mod hash;

pub use compare::{first_divergence, TraceDivergence};
pub use frame::{AgentFrame, DoorFrame, Frame, FrameTrace, HazardFrame, PoiFrame};
pub use hash::{frame_hash, trace_hash};
