//! Ember: a deterministic fire-rescue board-game simulation core.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all Ember sub-crates. For most users, adding `ember` as a
//! single dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use ember::prelude::*;
//!
//! // An 8x6 open floor with corner exits, a mixed crew, seed 42.
//! let mut config = RunConfig::new(MapLayout::open_floor(8, 6));
//! config.seed = 42;
//! config.max_steps = 100;
//!
//! let result = RescueWorld::new(config.clone()).unwrap().run();
//! assert!(result.steps > 0);
//!
//! // Same inputs, byte-identical trace.
//! let replay = RescueWorld::new(config).unwrap().run();
//! assert_eq!(first_divergence(&result.trace, &replay.trace), None);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in
//! the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `ember-core` | Cells, directions, ids, state enums, run stats |
//! | [`board`] | `ember-board` | Grid topology, hazard field, POI registry, map layout |
//! | [`engine`] | `ember-engine` | Agents, policies, pathfinding, runs, batches |
//! | [`replay`] | `ember-replay` | Frame traces, hashing, divergence reporting |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core vocabulary types (`ember-core`).
///
/// Contains [`types::Cell`], [`types::Direction`], [`types::AgentId`],
/// and the state enums shared by every other crate.
pub use ember_core as types;

/// Board state (`ember-board`).
///
/// Provides [`board::GridTopology`], [`board::HazardField`],
/// [`board::PoiRegistry`], and the validated [`board::MapLayout`]
/// loader snapshot.
pub use ember_board as board;

/// Simulation engine (`ember-engine`).
///
/// [`engine::RescueWorld`] plays one deterministic run;
/// [`engine::run_batch`] fans independent runs out over a worker pool
/// and ranks them.
pub use ember_engine as engine;

/// Frame traces and determinism verification (`ember-replay`).
///
/// Record-free tracing: every run carries its [`replay::FrameTrace`];
/// verify determinism with [`replay::trace_hash`] and
/// [`replay::first_divergence`].
pub use ember_replay as replay;

/// Common imports for typical Ember usage.
///
/// ```rust
/// use ember::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use ember_core::{
        AgentId, Cell, CellStatus, Direction, DoorStatus, EndReason, HazardState, PoiKind, Role,
        RunStats,
    };

    // Board
    pub use ember_board::{
        GridTopology, HazardField, MapError, MapLayout, Poi, PoiRegistry,
    };

    // Engine
    pub use ember_engine::{
        find_next_step, run_batch, AgentState, BatchConfig, BatchEntry, BatchResult, ConfigError,
        PathOptions, Policy, RescueWorld, RunConfig, RunResult, ScoreWeights, Strategy,
        TerminalTally, TraceDetail, WorldView,
    };

    // Replay
    pub use ember_replay::{first_divergence, frame_hash, trace_hash, Frame, FrameTrace};
}
