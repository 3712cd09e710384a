//! Runtime level state built from campaign blueprints.

use maze_drive_core::{CellCoord, Fuel, GridSize, LevelBlueprint, WallMask};

/// Units of fuel held by a freshly filled tank.
pub(crate) const FUEL_CAPACITY: Fuel = Fuel::new(10);

/// Dense runtime grid for the loaded level.
///
/// Wall masks are immutable for the level's lifetime; pickup consumption is
/// the only mutable cell state and resets whenever the level (re)loads.
#[derive(Clone, Debug)]
pub(crate) struct Grid {
    size: GridSize,
    entry: CellCoord,
    walls: Vec<WallMask>,
    pickups: Vec<bool>,
    consumed: Vec<bool>,
}

impl Grid {
    pub(crate) fn from_blueprint(blueprint: &LevelBlueprint) -> Self {
        let size = blueprint.size();
        let mut walls = Vec::with_capacity(size.cell_count());
        let mut pickups = Vec::with_capacity(size.cell_count());
        for cell in blueprint.cells() {
            walls.push(cell.walls);
            pickups.push(cell.fuel_pickup);
        }
        let consumed = vec![false; pickups.len()];
        Self {
            size,
            entry: blueprint.entry(),
            walls,
            pickups,
            consumed,
        }
    }

    pub(crate) const fn size(&self) -> GridSize {
        self.size
    }

    pub(crate) const fn entry(&self) -> CellCoord {
        self.entry
    }

    pub(crate) fn walls_cells(&self) -> &[WallMask] {
        &self.walls
    }

    pub(crate) fn walls_at(&self, cell: CellCoord) -> Option<WallMask> {
        self.index(cell).and_then(|i| self.walls.get(i).copied())
    }

    pub(crate) fn has_uncollected_pickup(&self, cell: CellCoord) -> bool {
        self.index(cell).map_or(false, |i| {
            self.pickups.get(i).copied().unwrap_or(false)
                && !self.consumed.get(i).copied().unwrap_or(true)
        })
    }

    pub(crate) fn consume_pickup(&mut self, cell: CellCoord) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.consumed.get_mut(index) {
                *slot = true;
            }
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.size.contains(cell) {
            return None;
        }
        let width = usize::try_from(self.size.width()).ok()?;
        let row = usize::try_from(cell.y()).ok()?;
        let column = usize::try_from(cell.x()).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

/// The controlled car: where it stands and where it last came from.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Car {
    pub(crate) cell: CellCoord,
    pub(crate) previous: CellCoord,
}

impl Car {
    pub(crate) const fn at_entry(entry: CellCoord) -> Self {
        Self {
            cell: entry,
            previous: entry,
        }
    }

    pub(crate) fn advance(&mut self, to: CellCoord) {
        self.previous = self.cell;
        self.cell = to;
    }
}

/// Fuel tank attached to the car for the duration of a level.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FuelTank {
    pub(crate) remaining: Fuel,
    pub(crate) capacity: Fuel,
    pub(crate) enabled: bool,
}

impl FuelTank {
    pub(crate) const fn full(enabled: bool) -> Self {
        Self {
            remaining: FUEL_CAPACITY,
            capacity: FUEL_CAPACITY,
            enabled,
        }
    }

    pub(crate) fn refill(&mut self) {
        self.remaining = self.capacity;
    }

    pub(crate) fn burn_one(&mut self) {
        self.remaining = self.remaining.burn_one();
    }

    pub(crate) fn blocks_departure(&self) -> bool {
        self.enabled && self.remaining.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Car, FuelTank, Grid, FUEL_CAPACITY};
    use maze_drive_core::{CellBlueprint, CellCoord, GridSize, LevelBlueprint, WallMask};

    fn blueprint() -> LevelBlueprint {
        let size = GridSize::new(2, 2);
        let mut cells = vec![CellBlueprint::default(); size.cell_count()];
        cells[1] = CellBlueprint {
            walls: WallMask::new(5),
            fuel_pickup: true,
        };
        LevelBlueprint::new(size, 0, cells)
    }

    #[test]
    fn grid_mirrors_blueprint_cells() {
        let grid = Grid::from_blueprint(&blueprint());
        assert_eq!(grid.walls_at(CellCoord::new(1, 0)), Some(WallMask::new(5)));
        assert_eq!(grid.walls_at(CellCoord::new(0, 1)), Some(WallMask::new(0)));
        assert_eq!(grid.walls_at(CellCoord::new(2, 0)), None);
        assert_eq!(grid.entry(), CellCoord::new(0, 0));
    }

    #[test]
    fn pickups_are_consumed_once() {
        let mut grid = Grid::from_blueprint(&blueprint());
        let cell = CellCoord::new(1, 0);
        assert!(grid.has_uncollected_pickup(cell));

        grid.consume_pickup(cell);
        assert!(!grid.has_uncollected_pickup(cell));
        assert!(!grid.has_uncollected_pickup(CellCoord::new(0, 0)));
    }

    #[test]
    fn car_advance_tracks_the_departed_cell() {
        let mut car = Car::at_entry(CellCoord::new(0, 1));
        assert_eq!(car.cell, car.previous);

        car.advance(CellCoord::new(1, 1));
        assert_eq!(car.previous, CellCoord::new(0, 1));
        assert_eq!(car.cell, CellCoord::new(1, 1));
    }

    #[test]
    fn empty_tank_blocks_departure_only_when_enabled() {
        let mut enabled = FuelTank::full(true);
        for _ in 0..FUEL_CAPACITY.get() {
            enabled.burn_one();
        }
        assert!(enabled.blocks_departure());

        enabled.refill();
        assert!(!enabled.blocks_departure());

        let mut disabled = FuelTank::full(false);
        for _ in 0..FUEL_CAPACITY.get() {
            disabled.burn_one();
        }
        assert!(!disabled.blocks_departure());
    }
}
