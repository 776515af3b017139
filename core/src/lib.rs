#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Life engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! renderers to react to deterministically. Grid storage is consumed through
//! the [`GridStore`] trait so the engine never owns a concrete backing store.

use std::{
    collections::{hash_set, HashSet},
    time::Duration,
};

use serde::{Deserialize, Serialize};

const MOORE_OFFSETS: [(i32, i32); 8] = [
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
];

/// Location of a single cell on the unbounded grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the cell.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the position shifted by the provided offsets.
    ///
    /// Coordinates saturate at the integer limits instead of wrapping, so the
    /// plane never folds back onto itself.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Returns the position shifted by the provided offsets, or `None` when
    /// either coordinate would leave the `i32` range.
    #[must_use]
    pub const fn checked_offset(self, dx: i32, dy: i32) -> Option<Self> {
        match (self.x.checked_add(dx), self.y.checked_add(dy)) {
            (Some(x), Some(y)) => Some(Self { x, y }),
            _ => None,
        }
    }

    /// The Moore-neighbourhood positions surrounding this cell.
    ///
    /// Yields eight distinct positions, fewer at the edges of the `i32` plane
    /// where offsets would overflow.
    pub fn neighbours(self) -> impl Iterator<Item = Position> {
        MOORE_OFFSETS
            .into_iter()
            .filter_map(move |(dx, dy)| self.checked_offset(dx, dy))
    }

    /// Component-wise minimum of two positions.
    #[must_use]
    pub fn min(self, other: Position) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Component-wise maximum of two positions.
    #[must_use]
    pub fn max(self, other: Position) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

/// Binary state of a grid cell. Absence of a cell is equivalent to [`CellState::Dead`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    /// Empty cell.
    #[default]
    Dead,
    /// Populated cell.
    Alive,
}

impl CellState {
    /// Reports whether the cell is populated.
    #[must_use]
    pub const fn is_alive(self) -> bool {
        matches!(self, Self::Alive)
    }

    /// Returns the opposite state.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Alive => Self::Dead,
            Self::Dead => Self::Alive,
        }
    }
}

impl From<bool> for CellState {
    fn from(alive: bool) -> Self {
        if alive {
            Self::Alive
        } else {
            Self::Dead
        }
    }
}

/// Inclusive axis-aligned rectangle expressed in grid positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    min: Position,
    max: Position,
}

impl BoundingBox {
    /// Creates the smallest box covering both corners, whatever their order.
    #[must_use]
    pub fn new(a: Position, b: Position) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Degenerate box covering a single position.
    #[must_use]
    pub const fn around(position: Position) -> Self {
        Self {
            min: position,
            max: position,
        }
    }

    /// Smallest box covering every provided position, or `None` when empty.
    pub fn covering<'a, I>(positions: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Position>,
    {
        positions
            .into_iter()
            .fold(None, |bounds: Option<BoundingBox>, position| {
                Some(match bounds {
                    Some(bounds) => bounds.including(*position),
                    None => Self::around(*position),
                })
            })
    }

    /// Lower corner of the box.
    #[must_use]
    pub const fn min(&self) -> Position {
        self.min
    }

    /// Upper corner of the box.
    #[must_use]
    pub const fn max(&self) -> Position {
        self.max
    }

    /// Number of columns covered by the box.
    #[must_use]
    pub fn width(&self) -> u64 {
        u64::from(self.max.x().abs_diff(self.min.x())) + 1
    }

    /// Number of rows covered by the box.
    #[must_use]
    pub fn height(&self) -> u64 {
        u64::from(self.max.y().abs_diff(self.min.y())) + 1
    }

    /// Reports whether the position lies inside the box.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        (self.min.x()..=self.max.x()).contains(&position.x())
            && (self.min.y()..=self.max.y()).contains(&position.y())
    }

    /// Reports whether `other` lies entirely inside the box.
    #[must_use]
    pub fn encloses(&self, other: &BoundingBox) -> bool {
        self.contains(other.min) && self.contains(other.max)
    }

    /// Returns the box grown to include the provided position.
    #[must_use]
    pub fn including(self, position: Position) -> Self {
        Self {
            min: self.min.min(position),
            max: self.max.max(position),
        }
    }

    /// Returns the smallest box covering both boxes.
    #[must_use]
    pub fn union(self, other: BoundingBox) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Iterates every covered position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let (min, max) = (self.min, self.max);
        (min.y()..=max.y()).flat_map(move |y| (min.x()..=max.x()).map(move |x| Position::new(x, y)))
    }
}

/// Positions that changed in the previous generation, or that must be
/// re-evaluated because of an edit. Order is irrelevant; elements are unique.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirtySet {
    positions: HashSet<Position>,
}

impl DirtySet {
    /// Creates an empty dirty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a position dirty, returning `true` if it was not already present.
    pub fn insert(&mut self, position: Position) -> bool {
        self.positions.insert(position)
    }

    /// Reports whether the position is dirty.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        self.positions.contains(&position)
    }

    /// Number of dirty positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Reports whether no position is dirty, i.e. the grid reached a fixed point.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Removes every position from the set.
    pub fn clear(&mut self) {
        self.positions.clear();
    }

    /// Iterator over the dirty positions in arbitrary order.
    pub fn iter(&self) -> hash_set::Iter<'_, Position> {
        self.positions.iter()
    }

    /// Dirty positions in deterministic row-major order.
    #[must_use]
    pub fn sorted(&self) -> Vec<Position> {
        let mut positions: Vec<Position> = self.positions.iter().copied().collect();
        positions.sort_unstable();
        positions
    }
}

impl FromIterator<Position> for DirtySet {
    fn from_iter<I: IntoIterator<Item = Position>>(iter: I) -> Self {
        Self {
            positions: iter.into_iter().collect(),
        }
    }
}

impl Extend<Position> for DirtySet {
    fn extend<I: IntoIterator<Item = Position>>(&mut self, iter: I) {
        self.positions.extend(iter);
    }
}

impl<'a> IntoIterator for &'a DirtySet {
    type Item = &'a Position;
    type IntoIter = hash_set::Iter<'a, Position>;

    fn into_iter(self) -> Self::IntoIter {
        self.positions.iter()
    }
}

impl IntoIterator for DirtySet {
    type Item = Position;
    type IntoIter = hash_set::IntoIter<Position>;

    fn into_iter(self) -> Self::IntoIter {
        self.positions.into_iter()
    }
}

/// Read/write capability over a conceptually infinite grid of cells.
///
/// Implementations must answer [`CellState::Dead`] for positions that were
/// never written rather than failing.
pub trait GridStore {
    /// Reads the state stored at the position.
    fn get(&self, position: Position) -> CellState;

    /// Writes the state at the position.
    fn set(&mut self, position: Position, state: CellState);

    /// Resets every position to [`CellState::Dead`].
    fn clear_all(&mut self);
}

/// Single entry of a change notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellChange {
    /// Cell whose state changed.
    pub position: Position,
    /// State the cell holds after the change.
    pub state: CellState,
}

impl CellChange {
    /// Creates a new change entry.
    #[must_use]
    pub const fn new(position: Position, state: CellState) -> Self {
        Self { position, state }
    }
}

/// Describes when the simulation is allowed to advance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LoopState {
    /// No automatic advancement; edits are accepted.
    #[default]
    Paused,
    /// Advances once per tick period until paused.
    Running,
    /// Transient state that performs exactly one generation and reverts to paused.
    SteppingOnce,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the host clock by the provided delta time.
    Tick {
        /// Duration of host time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Writes live cells directly into the grid, as an authored initial state.
    SeedCells {
        /// Positions that become alive.
        cells: Vec<Position>,
    },
    /// Performs the one full-area scan that seeds the dirty set from live cells.
    ScanInitialState,
    /// Flips a single cell and marks it dirty.
    ToggleCell {
        /// Cell targeted by the edit.
        position: Position,
    },
    /// Runs one generation over the current dirty set.
    AdvanceGeneration,
    /// Clears both grid buffers and the dirty set.
    ClearGrid,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the host clock advanced.
    TimeAdvanced {
        /// Duration of host time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that authored cells were written into the grid.
    CellsSeeded {
        /// Cells that were made alive, in row-major order.
        cells: Vec<Position>,
    },
    /// Reports the outcome of the initial full-area scan.
    InitialStateScanned {
        /// Number of positions in the dirty set after the scan.
        dirty: usize,
    },
    /// Confirms that a single cell was toggled by an edit.
    CellToggled {
        /// Edited cell together with its new state.
        change: CellChange,
    },
    /// Change notification emitted after every generation.
    GenerationAdvanced {
        /// Generation counter after the advance.
        generation: u64,
        /// Cells whose state changed, in row-major order.
        changes: Vec<CellChange>,
    },
    /// Announces that the running bounding box grew.
    BoundsExpanded {
        /// Box after the expansion.
        bounds: BoundingBox,
    },
    /// Announces that the dirty set emptied; nothing changes until an edit.
    FixedPointReached {
        /// Generation at which the grid stopped changing.
        generation: u64,
    },
    /// Confirms that the grid and dirty set were cleared.
    GridCleared,
}
