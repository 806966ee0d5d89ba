//! Point-of-interest registry: hidden victims, false alarms, and the
//! replenishment policy.

use ember_core::{Cell, PoiKind};
use rand::RngExt;
use rand_chacha::ChaCha8Rng;

use crate::grid::GridTopology;

/// Minimum number of active situations (board POIs plus victims being
/// carried) the replenishment policy maintains while valid cells exist.
pub const MIN_ACTIVE_SITUATIONS: u32 = 3;

/// A point of interest on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Poi {
    /// The cell hosting the marker.
    pub cell: Cell,
    /// True kind; hidden from policies until revealed.
    pub kind: PoiKind,
    /// Whether an agent has revealed the marker.
    pub revealed: bool,
}

/// Registry of POIs with reveal, removal, fire-consumption, and
/// replenishment operations.
///
/// The registry never counts losses itself: fire consumption reports
/// what burned and the engine does the accounting.
#[derive(Clone, Debug)]
pub struct PoiRegistry {
    pois: Vec<Poi>,
    victim_ratio: f64,
}

impl PoiRegistry {
    /// Create a registry with the given initial markers (hidden) and
    /// victim ratio for replenishment draws.
    ///
    /// `victim_ratio` is the probability a replenished POI is a real
    /// victim; callers validate it to `[0, 1]` before construction.
    pub fn new(initial: &[(Cell, PoiKind)], victim_ratio: f64) -> Self {
        Self {
            pois: initial
                .iter()
                .map(|&(cell, kind)| Poi {
                    cell,
                    kind,
                    revealed: false,
                })
                .collect(),
            victim_ratio,
        }
    }

    /// All POIs currently on the board, in placement order.
    pub fn pois(&self) -> &[Poi] {
        &self.pois
    }

    /// The POI at `cell`, if any.
    pub fn poi_at(&self, cell: Cell) -> Option<&Poi> {
        self.pois.iter().find(|p| p.cell == cell)
    }

    /// True iff a POI sits at `cell`.
    pub fn is_poi_at(&self, cell: Cell) -> bool {
        self.poi_at(cell).is_some()
    }

    /// Reveal the POI at `cell` and return its kind.
    ///
    /// False alarms are removed in the same call: a revealed false
    /// alarm never persists on the board. Victims stay (revealed) until
    /// rescued or burned. Returns `None` when no POI is present.
    pub fn reveal_at(&mut self, cell: Cell) -> Option<PoiKind> {
        let i = self.pois.iter().position(|p| p.cell == cell)?;
        match self.pois[i].kind {
            PoiKind::Victim => {
                self.pois[i].revealed = true;
                Some(PoiKind::Victim)
            }
            PoiKind::FalseAlarm => {
                self.pois.remove(i);
                Some(PoiKind::FalseAlarm)
            }
        }
    }

    /// Remove the POI at `cell` (rescue pickup), returning it.
    pub fn remove_at(&mut self, cell: Cell) -> Option<Poi> {
        let i = self.pois.iter().position(|p| p.cell == cell)?;
        Some(self.pois.remove(i))
    }

    /// Consume the POI at `cell` because the cell ignited, revealed or
    /// not, and return its kind. The caller counts a victim loss;
    /// false alarms burn silently.
    pub fn take_at(&mut self, cell: Cell) -> Option<PoiKind> {
        self.remove_at(cell).map(|p| p.kind)
    }

    /// Board POIs plus `carried` victims in transit.
    pub fn active_situations(&self, carried: u32) -> u32 {
        self.pois.len() as u32 + carried
    }

    /// Top the board back up to [`MIN_ACTIVE_SITUATIONS`] active
    /// situations.
    ///
    /// Each draw picks a uniformly random valid cell — in bounds,
    /// passing the caller's `valid` predicate (hazard-free), and not
    /// already hosting a POI — and a kind from the configured victim
    /// ratio. Stops early, without error, when no valid cell remains.
    pub fn replenish(
        &mut self,
        carried: u32,
        topo: &GridTopology,
        rng: &mut ChaCha8Rng,
        valid: impl Fn(Cell) -> bool,
    ) {
        while self.active_situations(carried) < MIN_ACTIVE_SITUATIONS {
            let mut candidates = Vec::new();
            for y in 0..topo.height() {
                for x in 0..topo.width() {
                    let cell = Cell::new(x, y);
                    if valid(cell) && !self.is_poi_at(cell) {
                        candidates.push(cell);
                    }
                }
            }
            if candidates.is_empty() {
                break;
            }
            let cell = candidates[rng.random_range(0..candidates.len())];
            let kind = if rng.random_bool(self.victim_ratio) {
                PoiKind::Victim
            } else {
                PoiKind::FalseAlarm
            };
            self.pois.push(Poi {
                cell,
                kind,
                revealed: false,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::MapLayout;
    use rand::SeedableRng;

    fn grid(w: i32, h: i32) -> GridTopology {
        GridTopology::from_layout(&MapLayout::open_floor(w, h))
    }

    // ---------------------------------------------------------------
    // Reveal and removal
    // ---------------------------------------------------------------

    #[test]
    fn reveal_keeps_victims_and_drops_false_alarms() {
        let mut reg = PoiRegistry::new(
            &[
                (Cell::new(1, 1), PoiKind::Victim),
                (Cell::new(2, 2), PoiKind::FalseAlarm),
            ],
            0.6,
        );

        assert_eq!(reg.reveal_at(Cell::new(1, 1)), Some(PoiKind::Victim));
        assert!(reg.poi_at(Cell::new(1, 1)).unwrap().revealed);

        assert_eq!(reg.reveal_at(Cell::new(2, 2)), Some(PoiKind::FalseAlarm));
        assert!(!reg.is_poi_at(Cell::new(2, 2)));

        assert_eq!(reg.reveal_at(Cell::new(0, 0)), None);
    }

    #[test]
    fn take_at_consumes_hidden_and_revealed_alike() {
        let mut reg = PoiRegistry::new(&[(Cell::new(1, 1), PoiKind::Victim)], 0.6);
        reg.reveal_at(Cell::new(1, 1));
        assert_eq!(reg.take_at(Cell::new(1, 1)), Some(PoiKind::Victim));
        assert_eq!(reg.take_at(Cell::new(1, 1)), None);
    }

    // ---------------------------------------------------------------
    // Replenishment
    // ---------------------------------------------------------------

    #[test]
    fn replenish_restores_the_floor() {
        let topo = grid(6, 5);
        let mut reg = PoiRegistry::new(&[], 0.6);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        reg.replenish(0, &topo, &mut rng, |_| true);
        assert_eq!(reg.active_situations(0), MIN_ACTIVE_SITUATIONS);
    }

    #[test]
    fn carried_victims_count_toward_the_floor() {
        let topo = grid(6, 5);
        let mut reg = PoiRegistry::new(&[(Cell::new(1, 1), PoiKind::Victim)], 0.6);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        reg.replenish(2, &topo, &mut rng, |_| true);
        assert_eq!(reg.pois().len(), 1, "1 board POI + 2 carried already >= 3");
    }

    #[test]
    fn replenish_stops_without_valid_cells() {
        let topo = grid(3, 3);
        let mut reg = PoiRegistry::new(&[], 0.6);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        reg.replenish(0, &topo, &mut rng, |_| false);
        assert_eq!(reg.pois().len(), 0);
    }

    #[test]
    fn replenish_respects_the_validity_predicate() {
        let topo = grid(4, 4);
        let mut reg = PoiRegistry::new(&[], 0.6);
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        // Only the bottom row is valid.
        reg.replenish(0, &topo, &mut rng, |c| c.y == 0);
        assert_eq!(reg.pois().len(), 3);
        assert!(reg.pois().iter().all(|p| p.cell.y == 0));
    }

    #[test]
    fn replenish_is_deterministic_per_seed() {
        let topo = grid(5, 4);
        let place = |seed: u64| {
            let mut reg = PoiRegistry::new(&[], 0.6);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            reg.replenish(0, &topo, &mut rng, |_| true);
            reg.pois().to_vec()
        };
        assert_eq!(place(42), place(42));
    }
}
