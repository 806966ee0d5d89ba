//! The opaque map snapshot consumed from external loaders, and its
//! validation.
//!
//! The core never parses map files. Whatever text or wire format a
//! loader speaks, it hands the core a [`MapLayout`]: wall masks, doors,
//! initial hazards, initial POIs, and entry points, already translated
//! into the core's single `(x, y)` convention. [`MapLayout::validate`]
//! is the configuration-error boundary from the error taxonomy: a
//! malformed layout is fatal at run construction and the run never
//! starts.

use std::error::Error;
use std::fmt;

use ember_core::{Cell, Direction, HazardState, PoiKind};

/// Errors detected during [`MapLayout::validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MapError {
    /// Width or height is not positive.
    EmptyGrid {
        /// The configured width.
        width: i32,
        /// The configured height.
        height: i32,
    },
    /// The wall-mask vector does not hold exactly `width * height` cells.
    WallVectorLength {
        /// Expected `width * height`.
        expected: usize,
        /// Actual vector length.
        actual: usize,
    },
    /// A wall mask uses bits outside the four direction bits.
    InvalidWallMask {
        /// The offending cell.
        cell: Cell,
        /// The raw mask value.
        mask: u8,
    },
    /// Wall state disagrees across a shared edge.
    AsymmetricWall {
        /// The cell whose mask claims the wall.
        cell: Cell,
        /// The direction of the disputed edge.
        direction: Direction,
    },
    /// A referenced cell lies outside the grid.
    OutOfBounds {
        /// What kind of entity referenced the cell.
        what: &'static str,
        /// The offending cell.
        cell: Cell,
    },
    /// A door connects two cells that are not orthogonally adjacent.
    DoorNotAdjacent {
        /// One endpoint.
        a: Cell,
        /// The other endpoint.
        b: Cell,
    },
    /// Two doors connect the same cell pair.
    DuplicateDoor {
        /// One endpoint.
        a: Cell,
        /// The other endpoint.
        b: Cell,
    },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid { width, height } => {
                write!(f, "grid dimensions must be positive, got {width}x{height}")
            }
            Self::WallVectorLength { expected, actual } => {
                write!(f, "wall vector holds {actual} cells, expected {expected}")
            }
            Self::InvalidWallMask { cell, mask } => {
                write!(f, "wall mask {mask:#06b} at {cell} uses unknown bits")
            }
            Self::AsymmetricWall { cell, direction } => {
                write!(f, "wall at {cell} toward {direction} is missing its far side")
            }
            Self::OutOfBounds { what, cell } => {
                write!(f, "{what} at {cell} is outside the grid")
            }
            Self::DoorNotAdjacent { a, b } => {
                write!(f, "door between {a} and {b} does not span adjacent cells")
            }
            Self::DuplicateDoor { a, b } => {
                write!(f, "duplicate door between {a} and {b}")
            }
        }
    }
}

impl Error for MapError {}

/// Immutable initial state handed to the core at run start.
///
/// Fields are public: a loader fills them in directly, then the core
/// calls [`validate`](Self::validate) once at run construction.
/// Coordinate transforms from whatever the source format uses stay in
/// the loader; everything here is already in grid `(x, y)` space.
#[derive(Clone, Debug, PartialEq)]
pub struct MapLayout {
    /// Grid width in cells.
    pub width: i32,
    /// Grid height in cells.
    pub height: i32,
    /// Per-cell wall masks, row-major `y * width + x`, bits per
    /// [`Direction::mask`].
    pub walls: Vec<u8>,
    /// Door cell pairs; every door starts `Closed`.
    pub doors: Vec<(Cell, Cell)>,
    /// Initial hazard markers.
    pub hazards: Vec<(Cell, HazardState)>,
    /// Initial POIs with their true (hidden) kinds.
    pub pois: Vec<(Cell, PoiKind)>,
    /// Entry-point cells: safe exits for victims and ambulance spots
    /// for knocked-down agents.
    pub entries: Vec<Cell>,
}

const ALL_DIRECTION_BITS: u8 = 0b1111;

impl MapLayout {
    /// The canonical fixture: an open floor with perimeter walls only
    /// and entry points at the four corners.
    pub fn open_floor(width: i32, height: i32) -> Self {
        let mut layout = Self {
            width,
            height,
            walls: vec![0; (width.max(0) * height.max(0)) as usize],
            doors: Vec::new(),
            hazards: Vec::new(),
            pois: Vec::new(),
            entries: Vec::new(),
        };
        for x in 0..width {
            layout.set_wall(Cell::new(x, 0), Direction::Down);
            layout.set_wall(Cell::new(x, height - 1), Direction::Up);
        }
        for y in 0..height {
            layout.set_wall(Cell::new(0, y), Direction::Left);
            layout.set_wall(Cell::new(width - 1, y), Direction::Right);
        }
        let mut corners = vec![
            Cell::new(0, 0),
            Cell::new(0, height - 1),
            Cell::new(width - 1, 0),
            Cell::new(width - 1, height - 1),
        ];
        corners.sort();
        corners.dedup();
        layout.entries = corners;
        layout
    }

    /// True iff `cell` lies inside the grid.
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.width && cell.y >= 0 && cell.y < self.height
    }

    fn idx(&self, cell: Cell) -> usize {
        (cell.y * self.width + cell.x) as usize
    }

    /// Set a wall on `cell`'s `direction` side, mirroring it onto the
    /// adjacent cell so the layout stays symmetric. Out-of-bounds cells
    /// are ignored.
    pub fn set_wall(&mut self, cell: Cell, direction: Direction) {
        if !self.contains(cell) {
            return;
        }
        let i = self.idx(cell);
        self.walls[i] |= direction.mask();
        let neighbour = cell.step(direction);
        if self.contains(neighbour) {
            let j = self.idx(neighbour);
            self.walls[j] |= direction.opposite().mask();
        }
    }

    /// True iff `cell` has a wall on its `direction` side.
    pub fn has_wall(&self, cell: Cell, direction: Direction) -> bool {
        self.contains(cell) && self.walls[self.idx(cell)] & direction.mask() != 0
    }

    /// Check every structural invariant.
    ///
    /// # Errors
    ///
    /// Returns the first violation found: non-positive dimensions,
    /// wrong wall-vector length, unknown mask bits, asymmetric walls,
    /// out-of-bounds doors/hazards/POIs/entries, non-adjacent doors,
    /// or duplicate doors.
    pub fn validate(&self) -> Result<(), MapError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(MapError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }
        let expected = (self.width * self.height) as usize;
        if self.walls.len() != expected {
            return Err(MapError::WallVectorLength {
                expected,
                actual: self.walls.len(),
            });
        }

        for y in 0..self.height {
            for x in 0..self.width {
                let cell = Cell::new(x, y);
                let mask = self.walls[self.idx(cell)];
                if mask & !ALL_DIRECTION_BITS != 0 {
                    return Err(MapError::InvalidWallMask { cell, mask });
                }
                for direction in Direction::ALL {
                    let neighbour = cell.step(direction);
                    if self.contains(neighbour)
                        && self.has_wall(cell, direction)
                            != self.has_wall(neighbour, direction.opposite())
                    {
                        return Err(MapError::AsymmetricWall { cell, direction });
                    }
                }
            }
        }

        for (i, &(a, b)) in self.doors.iter().enumerate() {
            for (what, cell) in [("door endpoint", a), ("door endpoint", b)] {
                if !self.contains(cell) {
                    return Err(MapError::OutOfBounds { what, cell });
                }
            }
            if !a.is_adjacent(b) {
                return Err(MapError::DoorNotAdjacent { a, b });
            }
            let duplicate = self.doors[..i]
                .iter()
                .any(|&(pa, pb)| (pa == a && pb == b) || (pa == b && pb == a));
            if duplicate {
                return Err(MapError::DuplicateDoor { a, b });
            }
        }

        for &(cell, _) in &self.hazards {
            if !self.contains(cell) {
                return Err(MapError::OutOfBounds {
                    what: "hazard",
                    cell,
                });
            }
        }
        for &(cell, _) in &self.pois {
            if !self.contains(cell) {
                return Err(MapError::OutOfBounds { what: "POI", cell });
            }
        }
        for &cell in &self.entries {
            if !self.contains(cell) {
                return Err(MapError::OutOfBounds {
                    what: "entry point",
                    cell,
                });
            }
        }

        Ok(())
    }
}
