//! Single-run orchestration: phase sequencing, termination, scoring,
//! and frame recording.

use ember_board::{GridTopology, HazardField, PoiRegistry};
use ember_core::{AgentId, CellStatus, EndReason, RunStats};
use ember_replay::{AgentFrame, DoorFrame, Frame, FrameTrace, HazardFrame, PoiFrame};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::agent::AgentState;
use crate::config::{ConfigError, RunConfig, TraceDetail};
use crate::policy::{policy_for_slot, Policy};
use crate::score::ScoreWeights;
use crate::turn::{run_agent_turn, send_to_ambulance};

/// Victims saved at which the run is won.
pub const VICTORY_SAVES: u32 = 7;
/// Victims lost at which the run is lost.
pub const DEFEAT_LOSSES: u32 = 4;
/// Structural damage at which the building collapses.
pub const COLLAPSE_DAMAGE: u32 = 24;

/// Everything a finished run reports.
#[derive(Clone, Debug)]
pub struct RunResult {
    /// The seed the run was played with.
    pub seed: u64,
    /// Why the run ended.
    pub end_reason: EndReason,
    /// Steps taken before termination.
    pub steps: u32,
    /// Score under the configured weights.
    pub score: i64,
    /// Final counters.
    pub stats: RunStats,
    /// The full frame trace.
    pub trace: FrameTrace,
}

/// One simulation run: a world stepped to termination.
///
/// A `RescueWorld` is strictly single-threaded and owns all of its
/// mutable state, including the run's only RNG — the whole trace is a
/// pure function of the [`RunConfig`]. Construction is the only
/// fallible operation; once built, [`step`](Self::step) and
/// [`run`](Self::run) cannot fail.
pub struct RescueWorld {
    topo: GridTopology,
    hazard: HazardField,
    pois: PoiRegistry,
    agents: Vec<(AgentState, Box<dyn Policy>)>,
    stats: RunStats,
    steps: u32,
    outcome: Option<EndReason>,
    rng: ChaCha8Rng,
    trace: FrameTrace,
    seed: u64,
    max_steps: u32,
    shuffle_agents: bool,
    trace_detail: TraceDetail,
    weights: ScoreWeights,
}

impl RescueWorld {
    /// Build a world from a validated configuration.
    ///
    /// Agents spawn round-robin across the map's entry points. The
    /// initial state is recorded as frame 0.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when [`RunConfig::validate`] does.
    pub fn new(config: RunConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let topo = GridTopology::from_layout(&config.layout);
        let hazard = HazardField::from_initial(&config.layout.hazards);
        let pois = PoiRegistry::new(&config.layout.pois, config.victim_ratio);
        let entries = topo.entry_points().to_vec();

        let agents = (0..config.agent_count)
            .map(|i| {
                let policy = policy_for_slot(config.strategy, i);
                let spawn = entries[i as usize % entries.len()];
                let state = AgentState::new(
                    AgentId(i),
                    policy.role(),
                    spawn,
                    config.action_points,
                    config.savings_cap,
                );
                (state, policy)
            })
            .collect();

        let mut world = Self {
            topo,
            hazard,
            pois,
            agents,
            stats: RunStats::default(),
            steps: 0,
            outcome: None,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            trace: FrameTrace::new(config.seed, config.layout.width, config.layout.height),
            seed: config.seed,
            max_steps: config.max_steps,
            shuffle_agents: config.shuffle_agents,
            trace_detail: config.trace_detail,
            weights: config.weights,
        };
        world.replenish_pois();
        world.record_frame();
        Ok(world)
    }

    /// Whether the run is still in progress.
    pub fn is_running(&self) -> bool {
        self.outcome.is_none()
    }

    /// The terminal reason, once one is set.
    pub fn end_reason(&self) -> Option<EndReason> {
        self.outcome
    }

    /// Current cumulative counters.
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Steps taken so far.
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Agent states, in id order.
    pub fn agents(&self) -> impl Iterator<Item = &AgentState> + '_ {
        self.agents.iter().map(|(state, _)| state)
    }

    /// The frames recorded so far.
    pub fn trace(&self) -> &FrameTrace {
        &self.trace
    }

    /// Execute one full engine step: drop-off sweep, agent turns,
    /// hazard advance with replenishment, then bookkeeping. Does
    /// nothing once the run is over.
    pub fn step(&mut self) {
        if self.outcome.is_some() {
            return;
        }

        self.dropoff_sweep();
        self.check_termination();

        if self.outcome.is_none() {
            self.agents_phase();
        }
        if self.outcome.is_none() {
            self.hazard_phase();
        }

        self.steps += 1;
        if self.outcome.is_none() && self.steps >= self.max_steps {
            self.outcome = Some(EndReason::Timeout);
        }
        self.record_frame();
    }

    /// Play the run to termination and return the result.
    pub fn run(mut self) -> RunResult {
        while self.outcome.is_none() {
            self.step();
        }
        let end_reason = self.outcome.unwrap_or(EndReason::Timeout);
        RunResult {
            seed: self.seed,
            end_reason,
            steps: self.steps,
            score: self.weights.score(end_reason, &self.stats, self.steps),
            stats: self.stats,
            trace: self.trace,
        }
    }

    /// Phase (a): any carrier already standing on an entry point drops
    /// the victim off before the turn starts.
    fn dropoff_sweep(&mut self) {
        let Self {
            agents,
            topo,
            stats,
            ..
        } = self;
        for (state, _) in agents.iter_mut() {
            if state.carrying && topo.is_entry(state.pos) {
                state.carrying = false;
                stats.saved += 1;
            }
        }
    }

    /// Phase (b): each agent takes its turn, with termination checked
    /// after every one.
    fn agents_phase(&mut self) {
        let mut order: Vec<usize> = (0..self.agents.len()).collect();
        if self.shuffle_agents {
            order.shuffle(&mut self.rng);
        }
        for index in order {
            if self.outcome.is_some() {
                break;
            }
            {
                let Self {
                    agents,
                    topo,
                    hazard,
                    pois,
                    stats,
                    rng,
                    ..
                } = self;
                let (state, policy) = &mut agents[index];
                run_agent_turn(state, policy.as_ref(), topo, hazard, pois, stats, rng);
                if hazard.status_at(state.pos) == CellStatus::Fire {
                    send_to_ambulance(state, topo, hazard, stats);
                }
            }
            if self.trace_detail == TraceDetail::PerAgent {
                self.record_frame();
            }
            self.check_termination();
        }
    }

    /// Phase (c): advance the hazard field once, account the fallout,
    /// relocate agents caught in new fire, replenish POIs, and re-check
    /// termination.
    fn hazard_phase(&mut self) {
        {
            let Self {
                topo,
                hazard,
                pois,
                rng,
                stats,
                ..
            } = self;
            let report = hazard.advance(topo, pois, rng);
            stats.damage += report.walls_destroyed();
            stats.lost += report.victims_lost();
        }
        {
            let Self {
                agents,
                topo,
                hazard,
                stats,
                ..
            } = self;
            for (state, _) in agents.iter_mut() {
                if hazard.status_at(state.pos) == CellStatus::Fire {
                    send_to_ambulance(state, topo, hazard, stats);
                }
            }
        }
        self.replenish_pois();
        self.check_termination();
    }

    fn replenish_pois(&mut self) {
        let Self {
            agents,
            topo,
            hazard,
            pois,
            rng,
            ..
        } = self;
        let carried = agents.iter().filter(|(state, _)| state.carrying).count() as u32;
        pois.replenish(carried, topo, rng, |cell| {
            hazard.status_at(cell) == CellStatus::Empty
        });
    }

    /// Set the terminal reason once; later checks never overwrite it.
    fn check_termination(&mut self) {
        if self.outcome.is_some() {
            return;
        }
        if self.stats.saved >= VICTORY_SAVES {
            self.outcome = Some(EndReason::Win);
        } else if self.stats.lost >= DEFEAT_LOSSES {
            self.outcome = Some(EndReason::LossVictims);
        } else if self.stats.damage >= COLLAPSE_DAMAGE {
            self.outcome = Some(EndReason::LossCollapse);
        }
    }

    fn record_frame(&mut self) {
        let frame = Frame {
            step: self.steps,
            agents: self
                .agents
                .iter()
                .map(|(state, _)| AgentFrame {
                    id: state.id,
                    x: state.pos.x,
                    y: state.pos.y,
                    carrying: state.carrying,
                    role: state.role,
                })
                .collect(),
            hazards: self
                .hazard
                .markers()
                .map(|(cell, state)| HazardFrame {
                    x: cell.x,
                    y: cell.y,
                    state,
                })
                .collect(),
            pois: self
                .pois
                .pois()
                .iter()
                .map(|p| PoiFrame {
                    x: p.cell.x,
                    y: p.cell.y,
                    kind: p.kind,
                    revealed: p.revealed,
                })
                .collect(),
            walls: self.topo.wall_masks().to_vec(),
            doors: self
                .topo
                .doors()
                .iter()
                .map(|d| DoorFrame {
                    a: d.a,
                    b: d.b,
                    status: d.status,
                })
                .collect(),
            stats: self.stats,
        };
        self.trace.frames.push(frame);
    }

    /// Force a saved-victim count, for tests that construct terminal
    /// states directly.
    #[doc(hidden)]
    pub fn force_saved(&mut self, saved: u32) {
        self.stats.saved = saved;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Strategy;
    use ember_board::MapLayout;

    fn quick_config(seed: u64) -> RunConfig {
        let mut config = RunConfig::new(MapLayout::open_floor(8, 6));
        config.seed = seed;
        config.agent_count = 4;
        config.max_steps = 80;
        config
    }

    // ---------------------------------------------------------------
    // Construction
    // ---------------------------------------------------------------

    #[test]
    fn new_records_the_initial_frame() {
        let world = RescueWorld::new(quick_config(1)).unwrap();
        assert_eq!(world.trace().len(), 1);
        assert_eq!(world.trace().frames[0].step, 0);
        assert_eq!(world.trace().frames[0].agents.len(), 4);
    }

    #[test]
    fn new_replenishes_the_poi_floor() {
        let world = RescueWorld::new(quick_config(1)).unwrap();
        assert!(world.trace().frames[0].pois.len() >= 3);
    }

    #[test]
    fn new_rejects_invalid_config() {
        let mut config = quick_config(1);
        config.agent_count = 0;
        assert!(RescueWorld::new(config).is_err());
    }

    #[test]
    fn agents_spawn_on_entry_points() {
        let world = RescueWorld::new(quick_config(1)).unwrap();
        for state in world.agents() {
            assert!(world.topo.is_entry(state.pos));
        }
    }

    // ---------------------------------------------------------------
    // Stepping and termination
    // ---------------------------------------------------------------

    #[test]
    fn step_appends_one_frame_per_turn() {
        let mut world = RescueWorld::new(quick_config(2)).unwrap();
        world.step();
        world.step();
        assert!(world.trace().len() >= 3);
        assert_eq!(world.steps(), 2);
    }

    #[test]
    fn per_agent_detail_records_more_frames() {
        let mut coarse = RescueWorld::new(quick_config(3)).unwrap();
        let mut config = quick_config(3);
        config.trace_detail = TraceDetail::PerAgent;
        let mut fine = RescueWorld::new(config).unwrap();

        coarse.step();
        fine.step();
        assert!(fine.trace().len() > coarse.trace().len());
    }

    #[test]
    fn run_reaches_exactly_one_terminal_reason() {
        let result = RescueWorld::new(quick_config(5)).unwrap().run();
        assert!(matches!(
            result.end_reason,
            EndReason::Win | EndReason::LossVictims | EndReason::LossCollapse | EndReason::Timeout
        ));
        assert!(result.steps <= 80);
        assert_eq!(
            result.trace.frames.last().map(|f| f.stats),
            Some(result.stats)
        );
    }

    #[test]
    fn terminal_state_is_monotonic() {
        let mut world = RescueWorld::new(quick_config(5)).unwrap();
        while world.is_running() {
            world.step();
        }
        let reason = world.end_reason().unwrap();
        let frames = world.trace().len();
        world.step();
        world.step();
        assert_eq!(world.end_reason(), Some(reason));
        assert_eq!(world.trace().len(), frames, "no frames after termination");
    }

    #[test]
    fn forced_saves_win_immediately() {
        let mut world = RescueWorld::new(quick_config(6)).unwrap();
        world.force_saved(VICTORY_SAVES);
        world.step();
        assert_eq!(world.end_reason(), Some(EndReason::Win));
    }

    #[test]
    fn timeout_caps_the_run() {
        let mut config = quick_config(7);
        config.max_steps = 3;
        // A crew that never wins quickly: all rescuers on an empty board.
        config.strategy = Strategy::Rescuers;
        let result = RescueWorld::new(config).unwrap().run();
        assert!(result.steps <= 3);
    }
}
