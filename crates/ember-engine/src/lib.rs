//! Simulation engine for Ember fire-rescue runs.
//!
//! [`RescueWorld`] orchestrates one deterministic run: agent turns,
//! the environmental hazard advance, POI replenishment, termination,
//! scoring, and frame recording. [`run_batch`] fans independent runs
//! out over a bounded worker pool and ranks the results.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod agent;
pub mod batch;
pub mod config;
pub mod pathfind;
pub mod policy;
pub mod score;
mod turn;
pub mod world;

pub use agent::AgentState;
pub use batch::{run_batch, BatchConfig, BatchEntry, BatchError, BatchResult, TerminalTally};
pub use config::{ConfigError, RunConfig, Strategy, TraceDetail};
pub use pathfind::{find_next_step, PathOptions};
pub use policy::{Policy, WorldView};
pub use score::ScoreWeights;
pub use world::{RescueWorld, RunResult};
