#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Maze Drive engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Describes the fuel rule attached to a campaign.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    /// Relaxed mode without fuel management.
    Easy,
    /// Standard mode with fuel management enabled.
    Medium,
    /// Advanced mode with fuel management enabled.
    Hard,
}

impl Difficulty {
    /// Reports whether the car burns fuel at this difficulty.
    #[must_use]
    pub const fn fuel_enabled(self) -> bool {
        !matches!(self, Self::Easy)
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Installs a campaign and loads its first level.
    ConfigureCampaign {
        /// Fuel rule applied for the whole campaign.
        difficulty: Difficulty,
        /// Ordered level blueprints composing the campaign.
        levels: Vec<LevelBlueprint>,
    },
    /// Loads the blueprint stored at the provided campaign index.
    LoadLevel {
        /// Zero-based index of the level to load.
        index: LevelIndex,
    },
    /// Requests that the car drive off in the provided direction.
    RequestMove {
        /// Cardinal direction selected by the player.
        direction: Direction,
    },
    /// Stores a resolved path as the car's active route.
    AssignPath {
        /// Ordered cells the car should traverse.
        path: Path,
        /// Anomaly raised while resolving the path, if any.
        anomaly: Option<PathAnomaly>,
    },
    /// Abandons an in-flight move request that could not be resolved.
    AbandonMove {
        /// Specific reason the move was abandoned.
        reason: MoveRejection,
    },
    /// Confirms that the car finished entering the next cell of its route.
    StepCar,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Loads the next level of the campaign, or ends it after the last one.
    AdvanceLevel,
    /// Reloads the current level, resetting fuel and pickups.
    RestartLevel,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces the fuel rule selected for the installed campaign.
    DifficultyChanged {
        /// Difficulty that became active.
        difficulty: Difficulty,
    },
    /// Confirms that a level was loaded and the car placed at its entry.
    LevelLoaded {
        /// Campaign index of the loaded level.
        index: LevelIndex,
        /// Dimensions of the loaded grid.
        size: GridSize,
        /// Entry cell where the car was placed.
        entry: CellCoord,
    },
    /// Announces a validated move request awaiting path resolution.
    MoveRequested {
        /// Cell the car currently occupies.
        start: CellCoord,
        /// Cell the car most recently departed.
        previous: CellCoord,
        /// Neighbor cell selected as the first step of the route.
        first_step: CellCoord,
    },
    /// Reports that a move request was rejected or abandoned.
    MoveRejected {
        /// Specific reason the move did not happen.
        reason: MoveRejection,
    },
    /// Confirms that a resolved path became the car's active route.
    PathAssigned {
        /// Number of cells queued for traversal.
        length: usize,
        /// Completion tag carried by the route.
        completion: PathCompletion,
    },
    /// Warns that path resolution hit its safety bound and was truncated.
    PathTruncated {
        /// Step limit that was exceeded.
        limit: u32,
    },
    /// Confirms that the car moved between two cells.
    CarAdvanced {
        /// Cell the car occupied before moving.
        from: CellCoord,
        /// Cell the car occupies after completing the move.
        to: CellCoord,
    },
    /// Reports the fuel remaining after an arrival was charged or refilled.
    FuelChanged {
        /// Units left in the tank.
        remaining: Fuel,
    },
    /// Confirms that a one-time fuel pickup was collected.
    PickupCollected {
        /// Cell that held the pickup.
        cell: CellCoord,
    },
    /// Announces that the tank ran dry and the level was failed.
    FuelDepleted,
    /// Announces that the car drove out of the maze's far side.
    LevelCompleted {
        /// Campaign index of the completed level.
        index: LevelIndex,
    },
    /// Announces that the final level of the campaign was completed.
    CampaignWon,
}

/// Reasons a move request may be rejected by the world or the resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveRejection {
    /// No campaign level is currently loaded.
    NoLevel,
    /// A path is already being traversed.
    PathActive,
    /// The tank is empty, so the car cannot depart.
    OutOfFuel,
    /// The requested direction is blocked by a wall or suppressed.
    Blocked,
    /// The requested first step was not a cardinal neighbor of the car.
    InvalidRequest,
    /// Path resolution read a coordinate outside the grid.
    OutOfBounds,
}

/// Cardinal movement directions available to the car.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward increasing y coordinates.
    North,
    /// Movement toward increasing x coordinates, facing the maze exit.
    East,
    /// Movement toward decreasing y coordinates.
    South,
    /// Movement toward decreasing x coordinates, facing the maze entrance.
    West,
}

/// All cardinal directions in wall-bit order.
pub const CARDINALS: [Direction; 4] = [
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
];

impl Direction {
    /// Wall-mask bit owned by this direction.
    #[must_use]
    pub const fn bit(self) -> u8 {
        match self {
            Self::North => 0b0001,
            Self::East => 0b0010,
            Self::South => 0b0100,
            Self::West => 0b1000,
        }
    }

    /// Unit offset applied to a cell coordinate when stepping this way.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, 1),
            Self::East => (1, 0),
            Self::South => (0, -1),
            Self::West => (-1, 0),
        }
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Derives the direction leading from one cell to an adjacent cell.
    ///
    /// Returns `None` when the cells are not cardinal neighbors.
    #[must_use]
    pub fn between(from: CellCoord, to: CellCoord) -> Option<Self> {
        let dx = to.x() - from.x();
        let dy = to.y() - from.y();
        match (dx, dy) {
            (0, 1) => Some(Self::North),
            (1, 0) => Some(Self::East),
            (0, -1) => Some(Self::South),
            (-1, 0) => Some(Self::West),
            _ => None,
        }
    }

    /// Number of quarter turns separating this heading from another.
    #[must_use]
    pub const fn quarter_turns_to(self, other: Self) -> u32 {
        let delta = (other.ordinal() + 4 - self.ordinal()) % 4;
        if delta == 3 {
            1
        } else {
            delta
        }
    }

    const fn ordinal(self) -> u32 {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }
}

/// Compact set of cardinal directions backed by the wall-mask bit layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectionSet(u8);

impl DirectionSet {
    /// Creates an empty direction set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Creates a set from raw bits, truncated to the four direction bits.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0b1111)
    }

    /// Raw bit representation of the set.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Reports whether the provided direction is a member of the set.
    #[must_use]
    pub const fn contains(self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }

    /// Returns a copy of the set with the provided direction included.
    #[must_use]
    pub const fn with(self, direction: Direction) -> Self {
        Self(self.0 | direction.bit())
    }

    /// Returns a copy of the set with the provided direction excluded.
    #[must_use]
    pub const fn without(self, direction: Direction) -> Self {
        Self(self.0 & !direction.bit())
    }

    /// Reports whether the set contains no directions.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of directions contained in the set.
    #[must_use]
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Iterator over the member directions in wall-bit order.
    pub fn iter(self) -> impl Iterator<Item = Direction> {
        CARDINALS
            .into_iter()
            .filter(move |direction| self.contains(*direction))
    }
}

/// Per-cell wall bitmask marking blocked cardinal directions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WallMask(u8);

impl WallMask {
    /// Creates a wall mask from raw bits, truncated to the four wall bits.
    #[must_use]
    pub const fn new(bits: u8) -> Self {
        Self(bits & 0b1111)
    }

    /// Raw bit representation of the mask.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Reports whether a wall blocks travel in the provided direction.
    #[must_use]
    pub const fn is_blocked(self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }

    /// Number of walls present on the cell.
    #[must_use]
    pub const fn wall_count(self) -> u32 {
        self.0.count_ones()
    }

    /// Set of directions open for travel: the mask complement, four bits wide.
    #[must_use]
    pub const fn open_directions(self) -> DirectionSet {
        DirectionSet::from_bits(!self.0)
    }

    /// Returns a copy of the mask with a wall added in the provided direction.
    #[must_use]
    pub const fn with_wall(self, direction: Direction) -> Self {
        Self(self.0 | direction.bit())
    }

    /// Returns a copy of the mask with the wall removed in the provided direction.
    #[must_use]
    pub const fn without_wall(self, direction: Direction) -> Self {
        Self(self.0 & !direction.bit())
    }
}

/// Location of a single grid cell expressed as signed x and y coordinates.
///
/// Coordinates are signed so that the maze exit (x equal to the grid width)
/// and the entrance approach (x below zero) remain representable.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CellCoord {
    x: i32,
    y: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal component, increasing toward the maze exit.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical component, increasing northward.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Neighbor coordinate one step away in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub const fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Reports whether another coordinate is exactly one cardinal step away.
    #[must_use]
    pub const fn is_cardinal_neighbor(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }
}

/// Dimensions of a level grid measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    width: u32,
    height: u32,
}

impl GridSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the grid in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the grid in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells contained in the grid.
    #[must_use]
    pub const fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Length of the longest grid dimension.
    #[must_use]
    pub const fn longest_dimension(&self) -> u32 {
        if self.width >= self.height {
            self.width
        } else {
            self.height
        }
    }

    /// Reports whether the provided coordinate lies inside the grid bounds.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.x() >= 0
            && cell.y() >= 0
            && (cell.x() as u32) < self.width
            && (cell.y() as u32) < self.height
    }
}

/// Units of fuel held by the car's tank.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Fuel(u32);

impl Fuel {
    /// Creates a new fuel quantity with the provided unit count.
    #[must_use]
    pub const fn new(units: u32) -> Self {
        Self(units)
    }

    /// Retrieves the number of units represented.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns the quantity reduced by one unit, clamped at zero.
    #[must_use]
    pub const fn burn_one(self) -> Self {
        Self(self.0.saturating_sub(1))
    }

    /// Reports whether the quantity is exhausted.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// Zero-based position of a level within its campaign.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct LevelIndex(u32);

impl LevelIndex {
    /// Creates a new level index with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Index of the level following this one.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Serializable description of a single maze level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelBlueprint {
    size: GridSize,
    entry_row: i32,
    cells: Vec<CellBlueprint>,
}

impl LevelBlueprint {
    /// Creates a blueprint from dimensions, entry row and row-major cells.
    ///
    /// The cell vector length must equal the grid's cell count; rows are laid
    /// out bottom-up with x varying fastest.
    #[must_use]
    pub fn new(size: GridSize, entry_row: i32, cells: Vec<CellBlueprint>) -> Self {
        Self {
            size,
            entry_row,
            cells,
        }
    }

    /// Dimensions of the described grid.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Row (y coordinate) of the entry cell in column zero.
    #[must_use]
    pub const fn entry_row(&self) -> i32 {
        self.entry_row
    }

    /// Entry cell where the car starts the level.
    #[must_use]
    pub const fn entry(&self) -> CellCoord {
        CellCoord::new(0, self.entry_row)
    }

    /// Row-major cell descriptions composing the level.
    #[must_use]
    pub fn cells(&self) -> &[CellBlueprint] {
        &self.cells
    }

    /// Reports whether the cell vector matches the declared dimensions and
    /// the entry row lies inside the grid.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.cells.len() == self.size.cell_count() && self.size.contains(self.entry())
    }
}

/// Serializable description of a single blueprint cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CellBlueprint {
    /// Walls blocking travel out of the cell.
    pub walls: WallMask,
    /// Indicates whether a one-time fuel pickup occupies the cell.
    pub fuel_pickup: bool,
}

/// Completion tag attached to a resolved path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathCompletion {
    /// The path ends at an in-maze decision point.
    #[default]
    None,
    /// The final cell of the path lies beyond the maze's far side.
    ExitLevel,
}

/// Anomaly raised while resolving a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathAnomaly {
    /// Auto-advance hit the safety bound; the path was truncated.
    LoopExceeded {
        /// Step limit that was reached.
        limit: u32,
    },
}

/// Ordered queue of cells the car traverses between player decisions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    cells: VecDeque<CellCoord>,
    completion: PathCompletion,
}

impl Path {
    /// Creates a path from ordered cells and a completion tag.
    #[must_use]
    pub fn from_cells(cells: Vec<CellCoord>, completion: PathCompletion) -> Self {
        Self {
            cells: cells.into(),
            completion,
        }
    }

    /// Creates the empty path produced by an entrance bounce.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Completion tag carried by the path.
    #[must_use]
    pub const fn completion(&self) -> PathCompletion {
        self.completion
    }

    /// Number of cells left to traverse.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether no cells remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Next cell the car should enter, if any.
    #[must_use]
    pub fn front(&self) -> Option<CellCoord> {
        self.cells.front().copied()
    }

    /// Removes and returns the next cell to enter.
    pub fn pop_front(&mut self) -> Option<CellCoord> {
        self.cells.pop_front()
    }

    /// Iterator over the remaining cells in traversal order.
    pub fn iter(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells.iter().copied()
    }
}

/// Errors surfaced by path resolution preconditions and lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The requested first step was not a cardinal neighbor of the start.
    #[error("first step {first_step:?} is not a cardinal neighbor of {start:?}")]
    InvalidRequest {
        /// Cell the car occupies.
        start: CellCoord,
        /// Offending first-step coordinate.
        first_step: CellCoord,
    },
    /// A traversed coordinate fell outside the grid on a non-exit step.
    #[error("cell {cell:?} lies outside the level grid")]
    OutOfBoundsLookup {
        /// Offending coordinate.
        cell: CellCoord,
    },
}

impl From<ResolveError> for MoveRejection {
    fn from(error: ResolveError) -> Self {
        match error {
            ResolveError::InvalidRequest { .. } => Self::InvalidRequest,
            ResolveError::OutOfBoundsLookup { .. } => Self::OutOfBounds,
        }
    }
}

/// Read-only view of a level grid's wall layout.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    walls: &'a [WallMask],
    size: GridSize,
    entry: CellCoord,
}

impl<'a> GridView<'a> {
    /// Captures a new grid view backed by the provided row-major wall slice.
    #[must_use]
    pub fn new(walls: &'a [WallMask], size: GridSize, entry: CellCoord) -> Self {
        Self { walls, size, entry }
    }

    /// Dimensions of the viewed grid.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Entry cell of the viewed level.
    #[must_use]
    pub const fn entry(&self) -> CellCoord {
        self.entry
    }

    /// Wall mask stored for the provided cell, if it lies within the grid.
    #[must_use]
    pub fn walls(&self, cell: CellCoord) -> Option<WallMask> {
        if !self.size.contains(cell) {
            return None;
        }
        let width = self.size.width() as usize;
        let index = cell.y() as usize * width + cell.x() as usize;
        self.walls.get(index).copied()
    }
}
