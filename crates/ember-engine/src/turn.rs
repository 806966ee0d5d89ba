//! One agent's turn: the recharge-decide-act loop and action
//! resolution.
//!
//! Everything here is normal control flow, never an error: a declined
//! decision, an unaffordable cost, or an illegal move simply ends the
//! turn. Costs are checked before they are spent, so an agent's budget
//! can never go negative.

use ember_board::{GridTopology, HazardField, PoiRegistry};
use ember_core::{Cell, CellStatus, DoorStatus, PoiKind, RunStats};
use rand_chacha::ChaCha8Rng;

use crate::agent::AgentState;
use crate::policy::{Policy, WorldView};

/// AP cost of chopping through a wall.
const CHOP_COST: u32 = 2;
/// AP cost of opening a closed door.
const OPEN_COST: u32 = 1;
/// AP cost of removing a fire marker entirely.
const COMPLETE_EXTINGUISH_COST: u32 = 2;
/// AP cost of knocking fire down to smoke, or clearing smoke.
const DOWNGRADE_COST: u32 = 1;
/// AP cost of one step while carrying a victim.
const CARRY_MOVE_COST: u32 = 2;
/// AP cost of one unburdened step.
const MOVE_COST: u32 = 1;

/// Run one complete turn for `agent`.
pub(crate) fn run_agent_turn(
    agent: &mut AgentState,
    policy: &dyn Policy,
    topo: &mut GridTopology,
    hazard: &mut HazardField,
    pois: &mut PoiRegistry,
    stats: &mut RunStats,
    rng: &mut ChaCha8Rng,
) {
    agent.recharge();
    loop {
        let candidates = topo.neighbours(agent.pos);
        if candidates.is_empty() {
            break;
        }
        let target = {
            let view = WorldView::new(topo, hazard, pois);
            policy.choose_movement(&view, agent, &candidates, rng)
        };
        let Some(target) = target else {
            break;
        };
        if predict_cost(agent, topo, hazard, target) > agent.ap {
            break;
        }
        if !attempt_action(agent, policy, target, topo, hazard, pois, stats, rng) {
            break;
        }
    }
    agent.turns_taken += 1;
}

/// Minimal AP cost of interacting with `target` from the agent's cell:
/// the cheapest branch [`attempt_action`] could take. The chosen branch
/// re-checks its own (possibly higher) cost.
pub(crate) fn predict_cost(
    agent: &AgentState,
    topo: &GridTopology,
    hazard: &HazardField,
    target: Cell,
) -> u32 {
    if let Some(direction) = agent.pos.direction_to(target) {
        if topo.has_wall(agent.pos, direction) {
            return CHOP_COST;
        }
    }
    if let Some(i) = topo.door_between(agent.pos, target) {
        if topo.door(i).status == DoorStatus::Closed {
            return OPEN_COST;
        }
    }
    match hazard.status_at(target) {
        CellStatus::Fire | CellStatus::Smoke => DOWNGRADE_COST,
        CellStatus::Empty => {
            if agent.carrying {
                CARRY_MOVE_COST
            } else {
                MOVE_COST
            }
        }
    }
}

/// Resolve one action against `target`. The branches are mutually
/// exclusive and each is terminal for the call; returns whether the
/// action actually happened. A `false` ends the agent's turn.
#[allow(clippy::too_many_arguments)]
pub(crate) fn attempt_action(
    agent: &mut AgentState,
    policy: &dyn Policy,
    target: Cell,
    topo: &mut GridTopology,
    hazard: &mut HazardField,
    pois: &mut PoiRegistry,
    stats: &mut RunStats,
    rng: &mut ChaCha8Rng,
) -> bool {
    let pos = agent.pos;

    // 1. Wall in the way: chop or give up.
    if let Some(direction) = pos.direction_to(target) {
        if topo.has_wall(pos, direction) {
            let declined = {
                let view = WorldView::new(topo, hazard, pois);
                !policy.chop_wall(&view, agent, target, rng)
            };
            if declined || agent.ap < CHOP_COST {
                return false;
            }
            agent.ap -= CHOP_COST;
            topo.remove_wall(pos, direction);
            stats.damage += 1;
            return true;
        }
    }

    // 2. Closed door in the way: open or give up.
    if let Some(i) = topo.door_between(pos, target) {
        if topo.door(i).status == DoorStatus::Closed {
            let declined = {
                let view = WorldView::new(topo, hazard, pois);
                !policy.open_door(&view, agent, target, rng)
            };
            if declined || agent.ap < OPEN_COST {
                return false;
            }
            agent.ap -= OPEN_COST;
            topo.set_door_status(i, DoorStatus::Open);
            return true;
        }
    }

    // 3 & 4. Hazard on the target cell: fight it or give up.
    match hazard.status_at(target) {
        CellStatus::Fire => {
            let (fight, complete) = {
                let view = WorldView::new(topo, hazard, pois);
                let fight = policy.extinguish_fire(&view, agent, target, rng);
                let complete = fight && policy.complete_extinguish(&view, agent, target, rng);
                (fight, complete)
            };
            if !fight {
                return false;
            }
            if complete {
                if agent.ap < COMPLETE_EXTINGUISH_COST {
                    return false;
                }
                agent.ap -= COMPLETE_EXTINGUISH_COST;
                hazard.clear(target);
            } else {
                if agent.ap < DOWNGRADE_COST {
                    return false;
                }
                agent.ap -= DOWNGRADE_COST;
                hazard.downgrade(target);
            }
            return true;
        }
        CellStatus::Smoke => {
            let declined = {
                let view = WorldView::new(topo, hazard, pois);
                !policy.clear_smoke(&view, agent, target, rng)
            };
            if declined || agent.ap < DOWNGRADE_COST {
                return false;
            }
            agent.ap -= DOWNGRADE_COST;
            hazard.clear(target);
            return true;
        }
        CellStatus::Empty => {}
    }

    // 5. Plain move.
    let cost = if agent.carrying {
        CARRY_MOVE_COST
    } else {
        MOVE_COST
    };
    if agent.ap < cost || !topo.can_move(pos, target) {
        return false;
    }
    agent.ap -= cost;
    agent.pos = target;
    agent.cells_moved += 1;

    // Arrival: drop off at an entry point, then deal with any POI.
    if agent.carrying && topo.is_entry(target) {
        agent.carrying = false;
        stats.saved += 1;
    }
    if pois.is_poi_at(target) {
        let reveal = {
            let view = WorldView::new(topo, hazard, pois);
            policy.reveal_poi(&view, agent, target, rng)
        };
        if reveal {
            if let Some(PoiKind::Victim) = pois.reveal_at(target) {
                let rescue = {
                    let view = WorldView::new(topo, hazard, pois);
                    !agent.carrying && policy.rescue_victim(&view, agent, target, rng)
                };
                if rescue {
                    pois.remove_at(target);
                    agent.carrying = true;
                }
            }
            // A revealed false alarm is already gone.
        }
    }
    true
}

/// Relocate a knocked-down agent to the nearest hazard-free perimeter
/// cell; a carried victim does not survive the fall.
///
/// Ties in distance break on perimeter scan order; if the entire
/// perimeter is hazardous the agent lands at the origin corner.
pub(crate) fn send_to_ambulance(
    agent: &mut AgentState,
    topo: &GridTopology,
    hazard: &HazardField,
    stats: &mut RunStats,
) {
    if agent.carrying {
        agent.carrying = false;
        stats.lost += 1;
    }
    let mut best: Option<(u32, Cell)> = None;
    for cell in topo.perimeter() {
        if hazard.status_at(cell) != CellStatus::Empty {
            continue;
        }
        let distance = agent.pos.manhattan(cell);
        if best.map_or(true, |(d, _)| distance < d) {
            best = Some((distance, cell));
        }
    }
    agent.pos = best.map_or(Cell::new(0, 0), |(_, cell)| cell);
}
