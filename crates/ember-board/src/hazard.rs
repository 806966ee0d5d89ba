//! The sparse hazard field and its environmental advance step.
//!
//! Per-cell state machine: Empty → Smoke → Fire → (on re-trigger)
//! explosion. One [`advance`](HazardField::advance) call rolls a single
//! uniformly random cell (two-die emulation: column die then row die),
//! applies the escalation rule, resolves any explosion chain reaction,
//! and finishes with one flashover wavefront.
//!
//! The field mutates walls and doors while a shockwave propagates, and
//! consumes POIs on every new ignition, so the advance step takes the
//! topology and registry mutably. It never does loss or damage
//! *accounting* — the returned [`HazardEvent`] log carries everything
//! the engine needs to update its counters.

use ember_core::{Cell, CellStatus, Direction, DoorStatus, HazardState, PoiKind};
use indexmap::IndexMap;
use rand::RngExt;
use rand_chacha::ChaCha8Rng;

use crate::grid::GridTopology;
use crate::poi::PoiRegistry;

/// One thing that happened during a hazard advance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HazardEvent {
    /// An empty cell received a smoke marker.
    SmokePlaced(Cell),
    /// A cell was set on fire (escalation, shockwave, or flashover).
    FireIgnited(Cell),
    /// The rolled cell was already burning; a shockwave went out.
    ExplosionAt(Cell),
    /// A shockwave destroyed the wall on `cell`'s `direction` side.
    WallDestroyed {
        /// Cell whose wall absorbed the blast.
        cell: Cell,
        /// Direction of the destroyed wall.
        direction: Direction,
    },
    /// A shockwave blew a closed door off its frame.
    DoorDestroyed {
        /// Index of the door in the topology's door list.
        index: usize,
    },
    /// A smoke cell adjacent to fire escalated during flashover.
    FlashoverAt(Cell),
    /// A victim POI burned when its cell ignited.
    VictimLost(Cell),
    /// A false alarm burned when its cell ignited; no penalty.
    FalseAlarmBurned(Cell),
}

/// Event log returned by [`HazardField::advance`].
#[derive(Clone, Debug, Default)]
pub struct AdvanceReport {
    /// Everything that happened, in resolution order.
    pub events: Vec<HazardEvent>,
}

impl AdvanceReport {
    /// Walls destroyed this advance (each is one point of structural
    /// damage).
    pub fn walls_destroyed(&self) -> u32 {
        self.count(|e| matches!(e, HazardEvent::WallDestroyed { .. }))
    }

    /// Victims burned this advance.
    pub fn victims_lost(&self) -> u32 {
        self.count(|e| matches!(e, HazardEvent::VictimLost(_)))
    }

    fn count(&self, pred: impl Fn(&HazardEvent) -> bool) -> u32 {
        self.events.iter().filter(|e| pred(e)).count() as u32
    }
}

/// Sparse per-cell smoke/fire markers plus the propagation rules.
///
/// Markers are stored in an [`IndexMap`] keyed by cell so iteration
/// order is insertion order — deterministic for a given seed, which the
/// frame trace and replay hashing rely on.
#[derive(Clone, Debug, Default)]
pub struct HazardField {
    markers: IndexMap<Cell, HazardState>,
}

impl HazardField {
    /// An empty field.
    pub fn new() -> Self {
        Self::default()
    }

    /// A field pre-seeded with the layout's initial markers.
    pub fn from_initial(initial: &[(Cell, HazardState)]) -> Self {
        Self {
            markers: initial.iter().copied().collect(),
        }
    }

    /// Hazard status of `cell`.
    pub fn status_at(&self, cell: Cell) -> CellStatus {
        match self.markers.get(&cell) {
            None => CellStatus::Empty,
            Some(&state) => state.into(),
        }
    }

    /// All markers in insertion order.
    pub fn markers(&self) -> impl Iterator<Item = (Cell, HazardState)> + '_ {
        self.markers.iter().map(|(&c, &s)| (c, s))
    }

    /// Number of marked cells.
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Downgrade fire at `cell` to smoke. Returns whether the cell was
    /// on fire. No cascades.
    pub fn downgrade(&mut self, cell: Cell) -> bool {
        match self.markers.get_mut(&cell) {
            Some(state @ HazardState::Fire) => {
                *state = HazardState::Smoke;
                true
            }
            _ => false,
        }
    }

    /// Remove any marker at `cell` (full extinguish or smoke clearing).
    /// Returns whether a marker was present. No cascades.
    pub fn clear(&mut self, cell: Cell) -> bool {
        self.markers.shift_remove(&cell).is_some()
    }

    /// Run one environmental advance: roll a cell, escalate it, resolve
    /// any explosion, then run one flashover wavefront.
    ///
    /// POIs on newly ignited cells are consumed in this same call; the
    /// report's event log tells the engine what to count.
    pub fn advance(
        &mut self,
        topo: &mut GridTopology,
        pois: &mut PoiRegistry,
        rng: &mut ChaCha8Rng,
    ) -> AdvanceReport {
        let mut report = AdvanceReport::default();

        // Two-die roll: column, then row.
        let x = rng.random_range(0..topo.width());
        let y = rng.random_range(0..topo.height());
        let target = Cell::new(x, y);

        match self.status_at(target) {
            CellStatus::Empty => {
                self.markers.insert(target, HazardState::Smoke);
                report.events.push(HazardEvent::SmokePlaced(target));
            }
            CellStatus::Smoke => {
                self.ignite(target, pois, &mut report.events);
            }
            CellStatus::Fire => {
                report.events.push(HazardEvent::ExplosionAt(target));
                self.resolve_explosion(target, topo, pois, &mut report.events);
            }
        }

        self.resolve_flashover(pois, &mut report.events);
        report
    }

    /// Set `cell` on fire and consume any POI sitting there.
    fn ignite(&mut self, cell: Cell, pois: &mut PoiRegistry, events: &mut Vec<HazardEvent>) {
        self.markers.insert(cell, HazardState::Fire);
        events.push(HazardEvent::FireIgnited(cell));
        match pois.take_at(cell) {
            Some(PoiKind::Victim) => events.push(HazardEvent::VictimLost(cell)),
            Some(PoiKind::FalseAlarm) => events.push(HazardEvent::FalseAlarmBurned(cell)),
            None => {}
        }
    }

    /// Resolve an explosion centred on an already-burning cell.
    ///
    /// Four independent cardinal shockwaves walk outward one cell at a
    /// time. Each stops at the first wall (destroying it), closed door
    /// (destroying it), or non-fire cell (igniting it); it passes
    /// through cells already on fire and keeps going. The grid edge
    /// stops a shockwave silently.
    pub fn resolve_explosion(
        &mut self,
        center: Cell,
        topo: &mut GridTopology,
        pois: &mut PoiRegistry,
        events: &mut Vec<HazardEvent>,
    ) {
        for direction in Direction::ALL {
            let mut distance = 1;
            loop {
                let prev = center.step_by(direction, distance - 1);
                let next = center.step_by(direction, distance);
                if !topo.contains(next) {
                    break;
                }
                if topo.has_wall(prev, direction) {
                    topo.remove_wall(prev, direction);
                    events.push(HazardEvent::WallDestroyed {
                        cell: prev,
                        direction,
                    });
                    break;
                }
                if let Some(index) = topo.door_between(prev, next) {
                    if topo.door(index).status == DoorStatus::Closed {
                        topo.set_door_status(index, DoorStatus::Destroyed);
                        events.push(HazardEvent::DoorDestroyed { index });
                        break;
                    }
                }
                if self.status_at(next) != CellStatus::Fire {
                    self.ignite(next, pois, events);
                    break;
                }
                // Shockwave travels through existing fire.
                distance += 1;
            }
        }
    }

    /// Run one flashover wavefront: every smoke cell orthogonally
    /// adjacent to the *pre-flashover* fire set escalates to fire.
    ///
    /// The fire set is snapshotted first, so smoke ignited in this pass
    /// does not recursively ignite further smoke — one wavefront per
    /// advance, not a fixed-point iteration. Walls do not stop
    /// flashover.
    pub fn resolve_flashover(&mut self, pois: &mut PoiRegistry, events: &mut Vec<HazardEvent>) {
        let fire_set: std::collections::HashSet<Cell> = self
            .markers
            .iter()
            .filter(|&(_, &s)| s == HazardState::Fire)
            .map(|(&c, _)| c)
            .collect();
        let smoke_cells: Vec<Cell> = self
            .markers
            .iter()
            .filter(|&(_, &s)| s == HazardState::Smoke)
            .map(|(&c, _)| c)
            .collect();

        for cell in smoke_cells {
            let adjacent_fire = Direction::ALL
                .iter()
                .any(|&d| fire_set.contains(&cell.step(d)));
            if adjacent_fire {
                events.push(HazardEvent::FlashoverAt(cell));
                self.ignite(cell, pois, events);
            }
        }
    }
}
