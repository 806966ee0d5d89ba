//! Board-state enumerations and run statistics.

use std::fmt;

/// Intensity of a hazard marker stored for a cell.
///
/// Only non-empty cells carry a marker; the absence of a marker is the
/// `Empty` state, queried through [`CellStatus`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HazardState {
    /// Smoke: precursor to fire, escalates on a second trigger or by
    /// flashover.
    Smoke,
    /// Open fire: destroys POIs, knocks down agents, and explodes when
    /// re-ignited.
    Fire,
}

/// Result of querying a cell's hazard status, including the unmarked case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellStatus {
    /// No hazard marker.
    Empty,
    /// The cell carries a smoke marker.
    Smoke,
    /// The cell carries a fire marker.
    Fire,
}

impl From<HazardState> for CellStatus {
    fn from(state: HazardState) -> Self {
        match state {
            HazardState::Smoke => CellStatus::Smoke,
            HazardState::Fire => CellStatus::Fire,
        }
    }
}

/// Lifecycle status of a door.
///
/// Doors are created `Closed` from the map description, opened by agent
/// actions, and destroyed by explosion overpressure. Destroyed doors
/// keep their entity (so door indices stay stable for a whole run) but
/// never block movement again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DoorStatus {
    /// Blocks movement and shockwaves.
    Closed,
    /// Passable; opened by an agent.
    Open,
    /// Blown off its frame; passable for the rest of the run.
    Destroyed,
}

/// The true kind of a point of interest.
///
/// A POI's kind may be hidden until an agent reveals it; fire consumes
/// POIs regardless of whether they were revealed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PoiKind {
    /// A real victim: rescuable, lost to fire.
    Victim,
    /// A false alarm: removed on reveal, consumed silently by fire.
    FalseAlarm,
}

/// Decision-policy role of an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Every decision uniformly random among legal options.
    Base,
    /// Seeks out and extinguishes hazards; never rescues.
    Firefighter,
    /// Seeks out POIs and carries victims to the exits; avoids fire.
    Rescuer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Base => "Base",
            Role::Firefighter => "Firefighter",
            Role::Rescuer => "Rescuer",
        };
        write!(f, "{name}")
    }
}

/// Why a run reached its terminal state.
///
/// Exactly one reason is ever set per run, and once set the run is
/// permanently over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EndReason {
    /// Enough victims were carried to safety.
    Win,
    /// Too many victims were lost to the fire.
    LossVictims,
    /// Accumulated structural damage collapsed the building.
    LossCollapse,
    /// The hard step ceiling was reached before any other outcome.
    Timeout,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EndReason::Win => "WIN",
            EndReason::LossVictims => "LOSS_VICTIMS",
            EndReason::LossCollapse => "LOSS_COLLAPSE",
            EndReason::Timeout => "TIMEOUT",
        };
        write!(f, "{name}")
    }
}

/// Cumulative outcome counters for one run.
///
/// Mutated only by the engine; every frame in the trace carries a copy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RunStats {
    /// Victims carried to an entry point.
    pub saved: u32,
    /// Victims consumed by fire or dropped by a knocked-down carrier.
    pub lost: u32,
    /// Structural damage: walls destroyed by explosions or chopping.
    pub damage: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_status_from_hazard_state() {
        assert_eq!(CellStatus::from(HazardState::Smoke), CellStatus::Smoke);
        assert_eq!(CellStatus::from(HazardState::Fire), CellStatus::Fire);
    }

    #[test]
    fn end_reason_display_matches_wire_names() {
        assert_eq!(EndReason::Win.to_string(), "WIN");
        assert_eq!(EndReason::LossVictims.to_string(), "LOSS_VICTIMS");
        assert_eq!(EndReason::LossCollapse.to_string(), "LOSS_COLLAPSE");
        assert_eq!(EndReason::Timeout.to_string(), "TIMEOUT");
    }
}
