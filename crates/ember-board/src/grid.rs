//! Grid topology: walls, doors, entry points, and movement legality.

use ember_core::{Cell, Direction, DoorStatus};
use smallvec::SmallVec;

use crate::map::MapLayout;

/// A door connecting two orthogonally adjacent cells.
///
/// The cell pair is unordered: [`Door::connects`] matches either
/// orientation. Doors keep their entity when destroyed so indices stay
/// stable for a whole run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Door {
    /// One endpoint.
    pub a: Cell,
    /// The other endpoint.
    pub b: Cell,
    /// Current lifecycle status.
    pub status: DoorStatus,
}

impl Door {
    /// True iff this door connects `a` and `b` in either orientation.
    pub fn connects(&self, a: Cell, b: Cell) -> bool {
        (self.a == a && self.b == b) || (self.a == b && self.b == a)
    }
}

/// Static grid geometry plus the mutable structural overlays.
///
/// Holds the per-cell wall masks (dense, row-major `y * width + x`),
/// the door list, and the entry-point cells. Wall state is symmetric by
/// construction: every mutation clears both sides of the shared edge.
///
/// Queries are pure; the only mutators are [`remove_wall`](Self::remove_wall)
/// and [`set_door_status`](Self::set_door_status). Damage accounting for
/// destroyed walls lives in the engine, not here.
#[derive(Clone, Debug)]
pub struct GridTopology {
    width: i32,
    height: i32,
    walls: Vec<u8>,
    doors: Vec<Door>,
    entries: Vec<Cell>,
}

impl GridTopology {
    /// Build a topology from a layout.
    ///
    /// The layout must already be validated ([`MapLayout::validate`]);
    /// construction itself does not re-check invariants.
    pub fn from_layout(layout: &MapLayout) -> Self {
        Self {
            width: layout.width,
            height: layout.height,
            walls: layout.walls.clone(),
            doors: layout
                .doors
                .iter()
                .map(|&(a, b)| Door {
                    a,
                    b,
                    status: DoorStatus::Closed,
                })
                .collect(),
            entries: layout.entries.clone(),
        }
    }

    /// Grid width in cells.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Grid height in cells.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// True iff `cell` lies inside the grid.
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.width && cell.y >= 0 && cell.y < self.height
    }

    fn idx(&self, cell: Cell) -> usize {
        (cell.y * self.width + cell.x) as usize
    }

    /// The raw wall-mask grid, row-major `y * width + x`.
    pub fn wall_masks(&self) -> &[u8] {
        &self.walls
    }

    /// True iff `cell` has a wall on its `direction` side.
    ///
    /// Out-of-bounds cells report no wall.
    pub fn has_wall(&self, cell: Cell, direction: Direction) -> bool {
        self.contains(cell) && self.walls[self.idx(cell)] & direction.mask() != 0
    }

    /// Remove the wall on `cell`'s `direction` side, clearing both sides
    /// of the shared edge. Returns whether a wall was actually present.
    pub fn remove_wall(&mut self, cell: Cell, direction: Direction) -> bool {
        if !self.has_wall(cell, direction) {
            return false;
        }
        let i = self.idx(cell);
        self.walls[i] &= !direction.mask();
        let neighbour = cell.step(direction);
        if self.contains(neighbour) {
            let j = self.idx(neighbour);
            self.walls[j] &= !direction.opposite().mask();
        }
        true
    }

    /// All doors, in map-declaration order.
    pub fn doors(&self) -> &[Door] {
        &self.doors
    }

    /// The door at `index`.
    pub fn door(&self, index: usize) -> &Door {
        &self.doors[index]
    }

    /// Index of the door between `a` and `b`, matching either ordering
    /// of the pair.
    pub fn door_between(&self, a: Cell, b: Cell) -> Option<usize> {
        self.doors.iter().position(|d| d.connects(a, b))
    }

    /// Set the status of the door at `index`.
    pub fn set_door_status(&mut self, index: usize, status: DoorStatus) {
        self.doors[index].status = status;
    }

    /// True iff `a` and `b` are orthogonally adjacent.
    pub fn is_adjacent(&self, a: Cell, b: Cell) -> bool {
        a.is_adjacent(b)
    }

    /// True iff an agent may step from `from` to `to`: both in bounds,
    /// adjacent, no wall across the edge, and no `Closed` door between
    /// them. Open and destroyed doors do not block.
    pub fn can_move(&self, from: Cell, to: Cell) -> bool {
        if !self.contains(from) || !self.contains(to) {
            return false;
        }
        let Some(direction) = from.direction_to(to) else {
            return false;
        };
        if self.has_wall(from, direction) {
            return false;
        }
        match self.door_between(from, to) {
            Some(i) => self.doors[i].status != DoorStatus::Closed,
            None => true,
        }
    }

    /// In-bounds orthogonal neighbours of `cell`, in [`Direction::ALL`]
    /// order.
    pub fn neighbours(&self, cell: Cell) -> SmallVec<[Cell; 4]> {
        Direction::ALL
            .iter()
            .map(|&d| cell.step(d))
            .filter(|&n| self.contains(n))
            .collect()
    }

    /// The designated entry-point cells (safe exits / ambulance spots).
    pub fn entry_points(&self) -> &[Cell] {
        &self.entries
    }

    /// True iff `cell` is an entry point.
    pub fn is_entry(&self, cell: Cell) -> bool {
        self.entries.contains(&cell)
    }

    /// All perimeter cells in a fixed scan order: bottom and top row
    /// interleaved per column, then left and right column per interior
    /// row. Knockdown relocation breaks distance ties by this order.
    pub fn perimeter(&self) -> Vec<Cell> {
        let mut cells = Vec::new();
        for x in 0..self.width {
            cells.push(Cell::new(x, 0));
            cells.push(Cell::new(x, self.height - 1));
        }
        for y in 1..self.height - 1 {
            cells.push(Cell::new(0, y));
            cells.push(Cell::new(self.width - 1, y));
        }
        cells.dedup();
        cells
    }
}
