//! Decision policies: the strategy objects agents defer to.
//!
//! The engine holds each agent as a `(state, policy)` pair and routes
//! every choice in the turn loop through the [`Policy`] trait: where to
//! head next, and yes/no calls for chopping, opening, extinguishing,
//! revealing, and rescuing. Default implementations say yes to
//! everything, so concrete policies only override the decisions they
//! actually make differently — mirroring how the role variants differ
//! from each other in practice.

use ember_board::{GridTopology, HazardField, PoiRegistry};
use ember_core::{Cell, Role};
use rand::RngExt;
use rand_chacha::ChaCha8Rng;

use crate::agent::AgentState;
use crate::config::Strategy;
use crate::pathfind::{find_next_step, PathOptions};

/// How many of the nearest POIs a rescuer considers as path targets.
const NEAREST_POI_CANDIDATES: usize = 4;

/// Read-only snapshot of the board handed to policies while they
/// decide.
#[derive(Clone, Copy)]
pub struct WorldView<'a> {
    /// Grid topology: walls, doors, entry points.
    pub topo: &'a GridTopology,
    /// Current hazard markers.
    pub hazard: &'a HazardField,
    /// Current POIs.
    pub pois: &'a PoiRegistry,
}

impl<'a> WorldView<'a> {
    /// Bundle the three board references.
    pub fn new(topo: &'a GridTopology, hazard: &'a HazardField, pois: &'a PoiRegistry) -> Self {
        Self { topo, hazard, pois }
    }
}

/// The fixed decision interface the turn loop dispatches over.
///
/// All decisions receive the current board view, the deciding agent's
/// state, and the run RNG (so stochastic policies stay seed-
/// reproducible). A `false` from a yes/no decision fails the pending
/// action and ends the agent's turn.
pub trait Policy: Send {
    /// The role tag recorded in traces for agents using this policy.
    fn role(&self) -> Role;

    /// Pick a target cell among `candidates` (the agent's in-bounds
    /// orthogonal neighbours), or `None` to end the turn.
    fn choose_movement(
        &self,
        view: &WorldView<'_>,
        agent: &AgentState,
        candidates: &[Cell],
        rng: &mut ChaCha8Rng,
    ) -> Option<Cell>;

    /// Chop through the wall toward `target`?
    fn chop_wall(
        &self,
        _view: &WorldView<'_>,
        _agent: &AgentState,
        _target: Cell,
        _rng: &mut ChaCha8Rng,
    ) -> bool {
        true
    }

    /// Open the closed door toward `target`?
    fn open_door(
        &self,
        _view: &WorldView<'_>,
        _agent: &AgentState,
        _target: Cell,
        _rng: &mut ChaCha8Rng,
    ) -> bool {
        true
    }

    /// Fight the fire at `target` at all?
    fn extinguish_fire(
        &self,
        _view: &WorldView<'_>,
        _agent: &AgentState,
        _target: Cell,
        _rng: &mut ChaCha8Rng,
    ) -> bool {
        true
    }

    /// Remove the fire entirely (2 AP) instead of knocking it down to
    /// smoke (1 AP)?
    fn complete_extinguish(
        &self,
        _view: &WorldView<'_>,
        _agent: &AgentState,
        _target: Cell,
        _rng: &mut ChaCha8Rng,
    ) -> bool {
        true
    }

    /// Clear the smoke at `target`?
    fn clear_smoke(
        &self,
        _view: &WorldView<'_>,
        _agent: &AgentState,
        _target: Cell,
        _rng: &mut ChaCha8Rng,
    ) -> bool {
        true
    }

    /// Reveal the POI on the cell just entered?
    fn reveal_poi(
        &self,
        _view: &WorldView<'_>,
        _agent: &AgentState,
        _target: Cell,
        _rng: &mut ChaCha8Rng,
    ) -> bool {
        true
    }

    /// Pick up the victim just revealed?
    fn rescue_victim(
        &self,
        _view: &WorldView<'_>,
        _agent: &AgentState,
        _target: Cell,
        _rng: &mut ChaCha8Rng,
    ) -> bool {
        true
    }
}

/// Uniform random choice among `candidates`, the shared movement
/// fallback.
fn random_step(candidates: &[Cell], rng: &mut ChaCha8Rng) -> Option<Cell> {
    if candidates.is_empty() {
        None
    } else {
        Some(candidates[rng.random_range(0..candidates.len())])
    }
}

// ── Base ────────────────────────────────────────────────────────

/// The baseline policy: every decision uniformly random.
#[derive(Clone, Copy, Debug, Default)]
pub struct BasePolicy;

impl Policy for BasePolicy {
    fn role(&self) -> Role {
        Role::Base
    }

    fn choose_movement(
        &self,
        _view: &WorldView<'_>,
        _agent: &AgentState,
        candidates: &[Cell],
        rng: &mut ChaCha8Rng,
    ) -> Option<Cell> {
        random_step(candidates, rng)
    }

    fn chop_wall(
        &self,
        _view: &WorldView<'_>,
        _agent: &AgentState,
        _target: Cell,
        rng: &mut ChaCha8Rng,
    ) -> bool {
        rng.random_bool(0.5)
    }

    fn open_door(
        &self,
        _view: &WorldView<'_>,
        _agent: &AgentState,
        _target: Cell,
        rng: &mut ChaCha8Rng,
    ) -> bool {
        rng.random_bool(0.5)
    }

    fn extinguish_fire(
        &self,
        _view: &WorldView<'_>,
        _agent: &AgentState,
        _target: Cell,
        rng: &mut ChaCha8Rng,
    ) -> bool {
        rng.random_bool(0.5)
    }

    fn complete_extinguish(
        &self,
        _view: &WorldView<'_>,
        _agent: &AgentState,
        _target: Cell,
        rng: &mut ChaCha8Rng,
    ) -> bool {
        rng.random_bool(0.5)
    }

    fn clear_smoke(
        &self,
        _view: &WorldView<'_>,
        _agent: &AgentState,
        _target: Cell,
        rng: &mut ChaCha8Rng,
    ) -> bool {
        rng.random_bool(0.5)
    }

    fn reveal_poi(
        &self,
        _view: &WorldView<'_>,
        _agent: &AgentState,
        _target: Cell,
        rng: &mut ChaCha8Rng,
    ) -> bool {
        rng.random_bool(0.5)
    }

    fn rescue_victim(
        &self,
        _view: &WorldView<'_>,
        _agent: &AgentState,
        _target: Cell,
        rng: &mut ChaCha8Rng,
    ) -> bool {
        rng.random_bool(0.5)
    }
}

// ── Firefighter ─────────────────────────────────────────────────

/// Heads for the nearest hazard and puts it out completely; never
/// rescues.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirefighterPolicy;

impl Policy for FirefighterPolicy {
    fn role(&self) -> Role {
        Role::Firefighter
    }

    fn choose_movement(
        &self,
        view: &WorldView<'_>,
        agent: &AgentState,
        candidates: &[Cell],
        rng: &mut ChaCha8Rng,
    ) -> Option<Cell> {
        let targets: Vec<Cell> = view.hazard.markers().map(|(cell, _)| cell).collect();
        if targets.is_empty() {
            return random_step(candidates, rng);
        }
        let opts = PathOptions {
            avoid_fire: false,
            allow_chop: true,
            carrying: agent.carrying,
        };
        match find_next_step(view.topo, view.hazard, agent.pos, &targets, &opts) {
            Some(step) if candidates.contains(&step) => Some(step),
            _ => random_step(candidates, rng),
        }
    }

    fn rescue_victim(
        &self,
        _view: &WorldView<'_>,
        _agent: &AgentState,
        _target: Cell,
        _rng: &mut ChaCha8Rng,
    ) -> bool {
        false
    }
}

// ── Rescuer ─────────────────────────────────────────────────────

/// Heads for the nearest POIs (or the exits when carrying), avoiding
/// fire; extinguishes only what blocks the route and never chops.
#[derive(Clone, Copy, Debug, Default)]
pub struct RescuerPolicy;

impl Policy for RescuerPolicy {
    fn role(&self) -> Role {
        Role::Rescuer
    }

    fn choose_movement(
        &self,
        view: &WorldView<'_>,
        agent: &AgentState,
        candidates: &[Cell],
        rng: &mut ChaCha8Rng,
    ) -> Option<Cell> {
        let targets: Vec<Cell> = if agent.carrying {
            view.topo.entry_points().to_vec()
        } else {
            let mut cells: Vec<Cell> = view.pois.pois().iter().map(|p| p.cell).collect();
            cells.sort_by_key(|&c| (agent.pos.manhattan(c), c));
            cells.truncate(NEAREST_POI_CANDIDATES);
            cells
        };
        if targets.is_empty() {
            return random_step(candidates, rng);
        }
        let opts = PathOptions {
            avoid_fire: true,
            allow_chop: false,
            carrying: agent.carrying,
        };
        match find_next_step(view.topo, view.hazard, agent.pos, &targets, &opts) {
            Some(step) if candidates.contains(&step) => Some(step),
            _ => random_step(candidates, rng),
        }
    }

    fn chop_wall(
        &self,
        _view: &WorldView<'_>,
        _agent: &AgentState,
        _target: Cell,
        _rng: &mut ChaCha8Rng,
    ) -> bool {
        false
    }

    fn complete_extinguish(
        &self,
        _view: &WorldView<'_>,
        _agent: &AgentState,
        _target: Cell,
        _rng: &mut ChaCha8Rng,
    ) -> bool {
        false
    }
}

/// Build the policy for crew slot `index` under `strategy`.
pub(crate) fn policy_for_slot(strategy: Strategy, index: u32) -> Box<dyn Policy> {
    match strategy {
        Strategy::Random => Box::new(BasePolicy),
        Strategy::Firefighters => Box::new(FirefighterPolicy),
        Strategy::Rescuers => Box::new(RescuerPolicy),
        Strategy::Mixed => {
            if index % 2 == 0 {
                Box::new(FirefighterPolicy)
            } else {
                Box::new(RescuerPolicy)
            }
        }
    }
}
