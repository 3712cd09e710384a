#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic corridor resolution system for Maze Drive.
//!
//! One player input becomes the longest unambiguous run of cells: the car
//! rolls through corridors on its own and stops wherever the maze offers a
//! real choice (a junction) or none at all (a dead end). Driving past the
//! grid's far side completes the level; backing out through the entrance is
//! swallowed as a no-op.

use maze_drive_core::{
    CellCoord, Command, Event, GridView, Path, PathAnomaly, PathCompletion, ResolveError,
};

/// Whether the car keeps rolling through a cell with the indexed wall mask
/// instead of stopping for player input.
///
/// Index bits: 1 = North, 2 = East, 4 = South, 8 = West. Every two-wall mask
/// leaves exactly one way forward once the arrival direction is excluded, so
/// all six are pass-through; everything else is a stop.
pub const CONTINUATION_TABLE: [bool; 16] = [
    false, // 00 - open crossroads
    false, // 01 - three-way junction
    false, // 02 - three-way junction
    true,  // 03 - corner corridor
    false, // 04 - three-way junction
    true,  // 05 - straight corridor
    true,  // 06 - corner corridor
    false, // 07 - dead end
    false, // 08 - three-way junction
    true,  // 09 - corner corridor
    true,  // 10 - straight corridor
    false, // 11 - dead end
    true,  // 12 - corner corridor
    false, // 13 - dead end
    false, // 14 - dead end
    false, // 15 - sealed cell
];

const MIN_STEP_LIMIT: u32 = 8;

/// Upper bound on auto-advance iterations for a single resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StepLimit(u32);

impl StepLimit {
    /// Creates an explicit step limit, clamped to at least one step.
    #[must_use]
    pub const fn new(steps: u32) -> Self {
        if steps == 0 {
            Self(1)
        } else {
            Self(steps)
        }
    }

    /// Derives the default limit for a grid: one and a half times its longest
    /// dimension, never below a small fixed floor.
    #[must_use]
    pub const fn for_grid(view: &GridView<'_>) -> Self {
        let longest = view.size().longest_dimension();
        let scaled = longest.saturating_mul(3) / 2;
        if scaled < MIN_STEP_LIMIT {
            Self(MIN_STEP_LIMIT)
        } else {
            Self(scaled)
        }
    }

    /// Retrieves the maximum number of cells a resolution may queue.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Outcome of one resolver invocation: the path plus any anomaly raised.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    path: Path,
    anomaly: Option<PathAnomaly>,
}

impl Resolution {
    /// Ordered cells the car should traverse.
    #[must_use]
    pub const fn path(&self) -> &Path {
        &self.path
    }

    /// Anomaly raised during resolution, if any.
    #[must_use]
    pub const fn anomaly(&self) -> Option<PathAnomaly> {
        self.anomaly
    }

    /// Consumes the resolution, yielding the path and anomaly.
    #[must_use]
    pub fn into_parts(self) -> (Path, Option<PathAnomaly>) {
        (self.path, self.anomaly)
    }
}

/// Computes the full run of cells to traverse before the next decision point.
///
/// `previous` is the cell the car most recently departed and equals `start`
/// on the first move of a level; it is never selected as an auto-advance
/// target. `first_step` must be a cardinal neighbor of `start`.
///
/// The resolver only reads grid state. Dead ends, junctions, exits and
/// entrance bounces are normal terminations encoded in the returned path;
/// hitting the step limit truncates the path and reports a
/// [`PathAnomaly::LoopExceeded`] instead of looping forever.
pub fn resolve_path(
    grid: &GridView<'_>,
    start: CellCoord,
    previous: CellCoord,
    first_step: CellCoord,
    limit: StepLimit,
) -> Result<Resolution, ResolveError> {
    if !start.is_cardinal_neighbor(first_step) {
        return Err(ResolveError::InvalidRequest { start, first_step });
    }

    let width = grid.size().width() as i32;
    let mut cells: Vec<CellCoord> = Vec::new();
    let mut completion = PathCompletion::None;
    let mut anomaly = None;
    let mut previous = previous;
    let mut candidate = first_step;

    loop {
        if candidate.x() >= width {
            cells.push(candidate);
            completion = PathCompletion::ExitLevel;
            break;
        }

        if candidate.x() < 0 {
            // Entrance bounce: the caller observes that no movement occurred.
            return Ok(Resolution {
                path: Path::empty(),
                anomaly: None,
            });
        }

        cells.push(candidate);

        let Some(mask) = grid.walls(candidate) else {
            return Err(ResolveError::OutOfBoundsLookup { cell: candidate });
        };

        if !CONTINUATION_TABLE[mask.bits() as usize] {
            break;
        }

        let next = mask
            .open_directions()
            .iter()
            .map(|direction| candidate.step(direction))
            .find(|neighbor| *neighbor != previous);

        let Some(next) = next else {
            break;
        };

        if cells.len() as u32 >= limit.get() {
            anomaly = Some(PathAnomaly::LoopExceeded { limit: limit.get() });
            break;
        }

        previous = candidate;
        candidate = next;
    }

    Ok(Resolution {
        path: Path::from_cells(cells, completion),
        anomaly,
    })
}

/// Pure system that reacts to validated move requests and emits route commands.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pathing {
    limit_override: Option<StepLimit>,
}

impl Pathing {
    /// Creates a pathing system using the per-grid default step limit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            limit_override: None,
        }
    }

    /// Creates a pathing system with a fixed step limit for every resolution.
    #[must_use]
    pub const fn with_step_limit(limit: StepLimit) -> Self {
        Self {
            limit_override: Some(limit),
        }
    }

    /// Consumes world events and the current grid view to emit route commands.
    ///
    /// Each `MoveRequested` event produces exactly one command: `AssignPath`
    /// on success, `AbandonMove` carrying the rejection reason otherwise.
    pub fn handle(&self, events: &[Event], grid: GridView<'_>, out: &mut Vec<Command>) {
        for event in events {
            let Event::MoveRequested {
                start,
                previous,
                first_step,
            } = event
            else {
                continue;
            };

            let limit = self
                .limit_override
                .unwrap_or_else(|| StepLimit::for_grid(&grid));

            match resolve_path(&grid, *start, *previous, *first_step, limit) {
                Ok(resolution) => {
                    let (path, anomaly) = resolution.into_parts();
                    out.push(Command::AssignPath { path, anomaly });
                }
                Err(error) => {
                    out.push(Command::AbandonMove {
                        reason: error.into(),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{StepLimit, CONTINUATION_TABLE};
    use maze_drive_core::{CellCoord, GridSize, GridView, WallMask};

    #[test]
    fn continuation_table_matches_canonical_masks() {
        let pass_through = [3usize, 5, 6, 9, 10, 12];
        for (mask, continues) in CONTINUATION_TABLE.iter().enumerate() {
            assert_eq!(
                *continues,
                pass_through.contains(&mask),
                "mask {mask} misclassified"
            );
        }
    }

    #[test]
    fn pass_through_masks_are_exactly_the_two_wall_masks() {
        for mask in 0u8..16 {
            let continues = CONTINUATION_TABLE[mask as usize];
            assert_eq!(continues, WallMask::new(mask).wall_count() == 2);
        }
    }

    #[test]
    fn step_limit_scales_with_grid_dimensions() {
        let walls = vec![WallMask::default(); 200];
        let view = GridView::new(&walls, GridSize::new(20, 10), CellCoord::new(0, 0));
        assert_eq!(StepLimit::for_grid(&view).get(), 30);
    }

    #[test]
    fn step_limit_never_drops_below_the_floor() {
        let walls = vec![WallMask::default(); 4];
        let view = GridView::new(&walls, GridSize::new(2, 2), CellCoord::new(0, 0));
        assert_eq!(StepLimit::for_grid(&view).get(), 8);
        assert_eq!(StepLimit::new(0).get(), 1);
    }
}
