//! Run configuration, validation, and error types.
//!
//! [`RunConfig`] is the input to [`RescueWorld::new`](crate::world::RescueWorld::new).
//! [`validate()`](RunConfig::validate) checks structural invariants at
//! startup: a configuration error is the only fatal error in the
//! taxonomy, surfaced before the run starts. Everything that can go
//! wrong mid-play is normal control flow.

use std::error::Error;
use std::fmt;

use ember_board::{MapError, MapLayout};

use crate::score::ScoreWeights;

/// Crew composition: which policy each agent gets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Every agent decides uniformly at random.
    Random,
    /// Every agent hunts hazards.
    Firefighters,
    /// Every agent hunts POIs.
    Rescuers,
    /// Alternating crew: even agents fight fire, odd agents rescue.
    Mixed,
}

/// How often the engine appends a frame to the trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceDetail {
    /// One frame per full engine step (plus the initial state).
    PerTurn,
    /// Additionally one frame after each individual agent's turn.
    PerAgent,
}

/// Errors detected during [`RunConfig::validate()`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The map layout failed validation.
    Map(MapError),
    /// The crew is empty.
    NoAgents,
    /// Agents would never receive action points.
    ZeroActionPoints,
    /// The victim ratio is outside `[0, 1]` or not finite.
    InvalidVictimRatio {
        /// The invalid value.
        value: f64,
    },
    /// The step ceiling is zero; the run could never take a step.
    ZeroMaxSteps,
    /// The map declares no entry points; victims could never be saved
    /// and knocked-down agents would have nowhere to go.
    NoEntryPoints,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Map(e) => write!(f, "map: {e}"),
            Self::NoAgents => write!(f, "agent_count must be at least 1"),
            Self::ZeroActionPoints => write!(f, "action_points must be at least 1"),
            Self::InvalidVictimRatio { value } => {
                write!(f, "victim_ratio must be within [0, 1], got {value}")
            }
            Self::ZeroMaxSteps => write!(f, "max_steps must be at least 1"),
            Self::NoEntryPoints => write!(f, "map declares no entry points"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Map(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MapError> for ConfigError {
    fn from(e: MapError) -> Self {
        Self::Map(e)
    }
}

/// Everything a run needs: the map, the crew, the budget knobs, and
/// the seed.
///
/// A run's whole trace is a pure function of this struct, so two runs
/// built from equal configs produce byte-identical traces.
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// Validated-at-construction initial board state.
    pub layout: MapLayout,
    /// Number of agents in the crew.
    pub agent_count: u32,
    /// Action points granted to each agent per turn.
    pub action_points: u32,
    /// Cap on action points carried over between turns, on top of the
    /// per-turn grant.
    pub savings_cap: u32,
    /// Crew composition.
    pub strategy: Strategy,
    /// RNG seed for the run's single generator.
    pub seed: u64,
    /// Hard step ceiling; reaching it ends the run with
    /// [`EndReason::Timeout`](ember_core::EndReason::Timeout).
    pub max_steps: u32,
    /// Shuffle agent turn order each step using the run RNG.
    pub shuffle_agents: bool,
    /// Frame recording granularity.
    pub trace_detail: TraceDetail,
    /// Probability a replenished POI is a real victim.
    pub victim_ratio: f64,
    /// Scoring weights for ranking runs.
    pub weights: ScoreWeights,
}

impl RunConfig {
    /// A config with the customary defaults over `layout`: 6 agents
    /// with 4 AP each (savings cap 4), mixed crew, per-turn tracing,
    /// 0.6 victim ratio, 500-step ceiling, seed 0.
    pub fn new(layout: MapLayout) -> Self {
        Self {
            layout,
            agent_count: 6,
            action_points: 4,
            savings_cap: 4,
            strategy: Strategy::Mixed,
            seed: 0,
            max_steps: 500,
            shuffle_agents: false,
            trace_detail: TraceDetail::PerTurn,
            victim_ratio: 0.6,
            weights: ScoreWeights::default(),
        }
    }

    /// Check every structural invariant.
    ///
    /// # Errors
    ///
    /// Returns the first violation: an invalid map layout, an empty
    /// crew, a zero AP grant, a victim ratio outside `[0, 1]`, a zero
    /// step ceiling, or a map without entry points.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.layout.validate()?;
        if self.agent_count == 0 {
            return Err(ConfigError::NoAgents);
        }
        if self.action_points == 0 {
            return Err(ConfigError::ZeroActionPoints);
        }
        if !self.victim_ratio.is_finite() || !(0.0..=1.0).contains(&self.victim_ratio) {
            return Err(ConfigError::InvalidVictimRatio {
                value: self.victim_ratio,
            });
        }
        if self.max_steps == 0 {
            return Err(ConfigError::ZeroMaxSteps);
        }
        if self.layout.entries.is_empty() {
            return Err(ConfigError::NoEntryPoints);
        }
        Ok(())
    }
}
