#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Maze Drive.
//!
//! The world owns the installed campaign, the loaded level grid, the car and
//! its fuel tank, and the route currently being driven. All mutation flows
//! through [`apply`]; systems and adapters observe state exclusively through
//! the broadcast [`Event`] stream and the read-only [`query`] functions.

mod grid;

use maze_drive_core::{
    CellCoord, Command, Difficulty, Direction, DirectionSet, Event, LevelBlueprint,
    LevelIndex, MoveRejection, Path, PathAnomaly, PathCompletion,
};

use crate::grid::{Car, FuelTank, Grid};

/// Represents the authoritative Maze Drive world state.
#[derive(Debug, Default)]
pub struct World {
    campaign: Option<Campaign>,
    level: Option<ActiveLevel>,
}

impl World {
    /// Creates a new world with no campaign installed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug)]
struct Campaign {
    difficulty: Difficulty,
    levels: Vec<LevelBlueprint>,
}

#[derive(Debug)]
struct ActiveLevel {
    index: LevelIndex,
    grid: Grid,
    car: Car,
    tank: FuelTank,
    route: Path,
}

impl ActiveLevel {
    fn load(index: LevelIndex, blueprint: &LevelBlueprint, fuel_enabled: bool) -> Self {
        let grid = Grid::from_blueprint(blueprint);
        let entry = grid.entry();
        Self {
            index,
            grid,
            car: Car::at_entry(entry),
            tank: FuelTank::full(fuel_enabled),
            route: Path::empty(),
        }
    }

    /// Directions the player may currently choose from.
    ///
    /// Empty while a route is in flight, while the tank is dry, and whenever
    /// the car stands outside the grid. The affordance pointing back out of
    /// the entrance is suppressed in the entry column.
    fn affordances(&self) -> DirectionSet {
        if !self.route.is_empty() || self.tank.blocks_departure() {
            return DirectionSet::empty();
        }
        let Some(mask) = self.grid.walls_at(self.car.cell) else {
            return DirectionSet::empty();
        };
        let mut open = mask.open_directions();
        if self.car.cell.x() == 0 {
            open = open.without(Direction::West);
        }
        open
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureCampaign { difficulty, levels } => {
            if levels.is_empty() || !levels.iter().all(LevelBlueprint::is_consistent) {
                return;
            }
            world.campaign = Some(Campaign { difficulty, levels });
            out_events.push(Event::DifficultyChanged { difficulty });
            load_level(world, LevelIndex::new(0), out_events);
        }
        Command::LoadLevel { index } => {
            load_level(world, index, out_events);
        }
        Command::RequestMove { direction } => {
            request_move(world, direction, out_events);
        }
        Command::AssignPath { path, anomaly } => {
            assign_path(world, path, anomaly, out_events);
        }
        Command::AbandonMove { reason } => {
            out_events.push(Event::MoveRejected { reason });
        }
        Command::StepCar => {
            step_car(world, out_events);
        }
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::AdvanceLevel => {
            let Some(level) = &world.level else {
                return;
            };
            let next = level.index.next();
            let count = world
                .campaign
                .as_ref()
                .map_or(0, |campaign| campaign.levels.len());
            if (next.get() as usize) < count {
                load_level(world, next, out_events);
            } else {
                out_events.push(Event::CampaignWon);
            }
        }
        Command::RestartLevel => {
            let Some(level) = &world.level else {
                return;
            };
            let index = level.index;
            load_level(world, index, out_events);
        }
    }
}

fn load_level(world: &mut World, index: LevelIndex, out_events: &mut Vec<Event>) {
    let Some(campaign) = &world.campaign else {
        return;
    };
    let Some(blueprint) = campaign.levels.get(index.get() as usize) else {
        return;
    };
    let level = ActiveLevel::load(index, blueprint, campaign.difficulty.fuel_enabled());
    let size = level.grid.size();
    let entry = level.grid.entry();
    world.level = Some(level);
    out_events.push(Event::LevelLoaded { index, size, entry });
}

fn request_move(world: &mut World, direction: Direction, out_events: &mut Vec<Event>) {
    let Some(level) = &world.level else {
        out_events.push(Event::MoveRejected {
            reason: MoveRejection::NoLevel,
        });
        return;
    };

    if !level.route.is_empty() {
        out_events.push(Event::MoveRejected {
            reason: MoveRejection::PathActive,
        });
        return;
    }

    if level.tank.blocks_departure() {
        out_events.push(Event::MoveRejected {
            reason: MoveRejection::OutOfFuel,
        });
        return;
    }

    if !level.affordances().contains(direction) {
        out_events.push(Event::MoveRejected {
            reason: MoveRejection::Blocked,
        });
        return;
    }

    out_events.push(Event::MoveRequested {
        start: level.car.cell,
        previous: level.car.previous,
        first_step: level.car.cell.step(direction),
    });
}

fn assign_path(
    world: &mut World,
    path: Path,
    anomaly: Option<PathAnomaly>,
    out_events: &mut Vec<Event>,
) {
    let Some(level) = &mut world.level else {
        return;
    };

    if let Some(front) = path.front() {
        if !level.car.cell.is_cardinal_neighbor(front) {
            out_events.push(Event::MoveRejected {
                reason: MoveRejection::InvalidRequest,
            });
            return;
        }
    }

    if let Some(PathAnomaly::LoopExceeded { limit }) = anomaly {
        out_events.push(Event::PathTruncated { limit });
    }

    out_events.push(Event::PathAssigned {
        length: path.len(),
        completion: path.completion(),
    });
    level.route = path;
}

fn step_car(world: &mut World, out_events: &mut Vec<Event>) {
    let Some(level) = &mut world.level else {
        return;
    };
    let Some(next) = level.route.pop_front() else {
        return;
    };

    let from = level.car.cell;
    level.car.advance(next);
    out_events.push(Event::CarAdvanced { from, to: next });

    if !level.grid.size().contains(next) {
        // The car rolled past the far side; no fuel is charged out there.
        if level.route.is_empty() && level.route.completion() == PathCompletion::ExitLevel {
            out_events.push(Event::LevelCompleted { index: level.index });
        }
        return;
    }

    if level.tank.enabled && level.grid.has_uncollected_pickup(next) {
        level.grid.consume_pickup(next);
        level.tank.refill();
        out_events.push(Event::PickupCollected { cell: next });
        out_events.push(Event::FuelChanged {
            remaining: level.tank.remaining,
        });
        return;
    }

    if level.tank.enabled {
        level.tank.burn_one();
        out_events.push(Event::FuelChanged {
            remaining: level.tank.remaining,
        });
        if level.tank.remaining.is_empty() {
            out_events.push(Event::FuelDepleted);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use maze_drive_core::{
        CellCoord, Difficulty, DirectionSet, Fuel, GridView, LevelIndex,
    };

    use super::World;

    /// Read-only summary of the installed campaign.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct CampaignView {
        /// Fuel rule applied for the campaign.
        pub difficulty: Difficulty,
        /// Number of levels contained in the campaign.
        pub level_count: usize,
        /// Index of the currently loaded level, if any.
        pub current: Option<LevelIndex>,
    }

    /// Immutable representation of the car's position state.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct CarSnapshot {
        /// Cell the car currently occupies.
        pub cell: CellCoord,
        /// Cell the car most recently departed.
        pub previous: CellCoord,
    }

    /// Read-only view of the car's fuel tank.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct FuelView {
        /// Units left in the tank.
        pub remaining: Fuel,
        /// Units held by a full tank.
        pub capacity: Fuel,
        /// Indicates whether fuel is being tracked at all.
        pub enabled: bool,
    }

    /// Summarizes the installed campaign, if one is present.
    #[must_use]
    pub fn campaign(world: &World) -> Option<CampaignView> {
        world.campaign.as_ref().map(|campaign| CampaignView {
            difficulty: campaign.difficulty,
            level_count: campaign.levels.len(),
            current: world.level.as_ref().map(|level| level.index),
        })
    }

    /// Captures a wall-layout view of the loaded level's grid.
    #[must_use]
    pub fn grid_view(world: &World) -> Option<GridView<'_>> {
        world.level.as_ref().map(|level| {
            GridView::new(
                level.grid.walls_cells(),
                level.grid.size(),
                level.grid.entry(),
            )
        })
    }

    /// Captures the car's current and previous cells.
    #[must_use]
    pub fn car(world: &World) -> Option<CarSnapshot> {
        world.level.as_ref().map(|level| CarSnapshot {
            cell: level.car.cell,
            previous: level.car.previous,
        })
    }

    /// Captures the state of the car's fuel tank.
    #[must_use]
    pub fn fuel(world: &World) -> Option<FuelView> {
        world.level.as_ref().map(|level| FuelView {
            remaining: level.tank.remaining,
            capacity: level.tank.capacity,
            enabled: level.tank.enabled,
        })
    }

    /// Next cell of the active route, if one is being driven.
    #[must_use]
    pub fn next_waypoint(world: &World) -> Option<CellCoord> {
        world.level.as_ref().and_then(|level| level.route.front())
    }

    /// Number of route cells still queued for traversal.
    #[must_use]
    pub fn route_len(world: &World) -> usize {
        world.level.as_ref().map_or(0, |level| level.route.len())
    }

    /// Directions the player may currently choose from.
    #[must_use]
    pub fn affordances(world: &World) -> DirectionSet {
        world
            .level
            .as_ref()
            .map_or_else(DirectionSet::empty, super::ActiveLevel::affordances)
    }

    /// Reports whether the cell still holds an uncollected fuel pickup.
    #[must_use]
    pub fn has_pickup(world: &World, cell: CellCoord) -> bool {
        world
            .level
            .as_ref()
            .map_or(false, |level| level.grid.has_uncollected_pickup(cell))
    }
}

#[cfg(test)]
mod tests {
    use super::{apply, query, World};
    use maze_drive_core::{
        CellBlueprint, CellCoord, Command, Difficulty, Direction, Event, Fuel, GridSize,
        LevelBlueprint, LevelIndex, MoveRejection, Path, PathCompletion, WallMask,
    };

    fn corridor_blueprint() -> LevelBlueprint {
        // One row, three cells walled north and south: a straight drive east.
        let size = GridSize::new(3, 1);
        let cells = vec![
            CellBlueprint {
                walls: WallMask::new(5),
                fuel_pickup: false,
            };
            size.cell_count()
        ];
        LevelBlueprint::new(size, 0, cells)
    }

    fn configure(world: &mut World, difficulty: Difficulty) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            world,
            Command::ConfigureCampaign {
                difficulty,
                levels: vec![corridor_blueprint(), corridor_blueprint()],
            },
            &mut events,
        );
        events
    }

    #[test]
    fn configuring_a_campaign_loads_the_first_level() {
        let mut world = World::new();
        let events = configure(&mut world, Difficulty::Medium);

        assert!(events.contains(&Event::DifficultyChanged {
            difficulty: Difficulty::Medium,
        }));
        assert!(events.contains(&Event::LevelLoaded {
            index: LevelIndex::new(0),
            size: GridSize::new(3, 1),
            entry: CellCoord::new(0, 0),
        }));

        let car = query::car(&world).expect("car placed");
        assert_eq!(car.cell, CellCoord::new(0, 0));
        assert_eq!(car.previous, car.cell);
    }

    #[test]
    fn inconsistent_blueprints_are_not_installed() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureCampaign {
                difficulty: Difficulty::Easy,
                levels: vec![LevelBlueprint::new(GridSize::new(2, 2), 0, Vec::new())],
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert!(query::campaign(&world).is_none());
    }

    #[test]
    fn entry_column_suppresses_the_western_affordance() {
        let mut world = World::new();
        let _ = configure(&mut world, Difficulty::Easy);

        let open = query::affordances(&world);
        assert!(open.contains(Direction::East));
        assert!(!open.contains(Direction::West));
        assert!(!open.contains(Direction::North));
    }

    #[test]
    fn valid_requests_surface_the_first_step() {
        let mut world = World::new();
        let _ = configure(&mut world, Difficulty::Easy);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::RequestMove {
                direction: Direction::East,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::MoveRequested {
                start: CellCoord::new(0, 0),
                previous: CellCoord::new(0, 0),
                first_step: CellCoord::new(1, 0),
            }]
        );
    }

    #[test]
    fn walled_requests_are_rejected() {
        let mut world = World::new();
        let _ = configure(&mut world, Difficulty::Easy);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::RequestMove {
                direction: Direction::North,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::MoveRejected {
                reason: MoveRejection::Blocked,
            }]
        );
    }

    #[test]
    fn requests_without_a_campaign_are_rejected() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::RequestMove {
                direction: Direction::East,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::MoveRejected {
                reason: MoveRejection::NoLevel,
            }]
        );
    }

    #[test]
    fn assigning_a_route_blocks_further_requests() {
        let mut world = World::new();
        let _ = configure(&mut world, Difficulty::Easy);

        let mut events = Vec::new();
        let path = Path::from_cells(
            vec![CellCoord::new(1, 0), CellCoord::new(2, 0)],
            PathCompletion::None,
        );
        apply(
            &mut world,
            Command::AssignPath {
                path,
                anomaly: None,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::PathAssigned {
                length: 2,
                completion: PathCompletion::None,
            }]
        );
        assert!(query::affordances(&world).is_empty());

        events.clear();
        apply(
            &mut world,
            Command::RequestMove {
                direction: Direction::East,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::MoveRejected {
                reason: MoveRejection::PathActive,
            }]
        );
    }

    #[test]
    fn discontiguous_routes_are_refused() {
        let mut world = World::new();
        let _ = configure(&mut world, Difficulty::Easy);

        let mut events = Vec::new();
        let path = Path::from_cells(vec![CellCoord::new(2, 0)], PathCompletion::None);
        apply(
            &mut world,
            Command::AssignPath {
                path,
                anomaly: None,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::MoveRejected {
                reason: MoveRejection::InvalidRequest,
            }]
        );
        assert_eq!(query::route_len(&world), 0);
    }

    #[test]
    fn stepping_consumes_fuel_and_advances_the_car() {
        let mut world = World::new();
        let _ = configure(&mut world, Difficulty::Medium);

        let mut events = Vec::new();
        let path = Path::from_cells(vec![CellCoord::new(1, 0)], PathCompletion::None);
        apply(
            &mut world,
            Command::AssignPath {
                path,
                anomaly: None,
            },
            &mut events,
        );

        events.clear();
        apply(&mut world, Command::StepCar, &mut events);

        assert_eq!(
            events,
            vec![
                Event::CarAdvanced {
                    from: CellCoord::new(0, 0),
                    to: CellCoord::new(1, 0),
                },
                Event::FuelChanged {
                    remaining: Fuel::new(9),
                },
            ]
        );
        let car = query::car(&world).expect("car present");
        assert_eq!(car.cell, CellCoord::new(1, 0));
        assert_eq!(car.previous, CellCoord::new(0, 0));
    }

    #[test]
    fn easy_mode_never_charges_fuel() {
        let mut world = World::new();
        let _ = configure(&mut world, Difficulty::Easy);

        let mut events = Vec::new();
        let path = Path::from_cells(vec![CellCoord::new(1, 0)], PathCompletion::None);
        apply(
            &mut world,
            Command::AssignPath {
                path,
                anomaly: None,
            },
            &mut events,
        );
        events.clear();
        apply(&mut world, Command::StepCar, &mut events);

        assert_eq!(
            events,
            vec![Event::CarAdvanced {
                from: CellCoord::new(0, 0),
                to: CellCoord::new(1, 0),
            }]
        );
    }

    #[test]
    fn exit_steps_complete_the_level_without_a_fuel_charge() {
        let mut world = World::new();
        let _ = configure(&mut world, Difficulty::Medium);

        let mut events = Vec::new();
        let path = Path::from_cells(
            vec![
                CellCoord::new(1, 0),
                CellCoord::new(2, 0),
                CellCoord::new(3, 0),
            ],
            PathCompletion::ExitLevel,
        );
        apply(
            &mut world,
            Command::AssignPath {
                path,
                anomaly: None,
            },
            &mut events,
        );

        events.clear();
        apply(&mut world, Command::StepCar, &mut events);
        apply(&mut world, Command::StepCar, &mut events);
        apply(&mut world, Command::StepCar, &mut events);

        assert!(events.contains(&Event::LevelCompleted {
            index: LevelIndex::new(0),
        }));
        // Two in-maze arrivals were charged; the exit cell was free.
        assert_eq!(
            query::fuel(&world).map(|fuel| fuel.remaining),
            Some(Fuel::new(8))
        );
    }

    #[test]
    fn a_dry_tank_blocks_departure_and_hides_affordances() {
        let size = GridSize::new(12, 1);
        let cells = vec![
            CellBlueprint {
                walls: WallMask::new(5),
                fuel_pickup: false,
            };
            size.cell_count()
        ];
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureCampaign {
                difficulty: Difficulty::Hard,
                levels: vec![LevelBlueprint::new(size, 0, cells)],
            },
            &mut events,
        );

        // Ten in-maze arrivals drain the ten-unit tank exactly.
        let route: Vec<CellCoord> = (1..=10).map(|x| CellCoord::new(x, 0)).collect();
        apply(
            &mut world,
            Command::AssignPath {
                path: Path::from_cells(route, PathCompletion::None),
                anomaly: None,
            },
            &mut events,
        );
        events.clear();
        for _ in 0..10 {
            apply(&mut world, Command::StepCar, &mut events);
        }

        assert!(events.contains(&Event::FuelDepleted));
        assert_eq!(
            query::fuel(&world).map(|fuel| fuel.remaining),
            Some(Fuel::new(0))
        );
        assert!(query::affordances(&world).is_empty());

        events.clear();
        apply(
            &mut world,
            Command::RequestMove {
                direction: Direction::East,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::MoveRejected {
                reason: MoveRejection::OutOfFuel,
            }]
        );
    }

    #[test]
    fn advancing_past_the_final_level_wins_the_campaign() {
        let mut world = World::new();
        let _ = configure(&mut world, Difficulty::Easy);

        let mut events = Vec::new();
        apply(&mut world, Command::AdvanceLevel, &mut events);
        assert!(events.contains(&Event::LevelLoaded {
            index: LevelIndex::new(1),
            size: GridSize::new(3, 1),
            entry: CellCoord::new(0, 0),
        }));

        events.clear();
        apply(&mut world, Command::AdvanceLevel, &mut events);
        assert_eq!(events, vec![Event::CampaignWon]);
    }

    #[test]
    fn truncated_routes_surface_the_anomaly() {
        let mut world = World::new();
        let _ = configure(&mut world, Difficulty::Easy);

        let mut events = Vec::new();
        let path = Path::from_cells(vec![CellCoord::new(1, 0)], PathCompletion::None);
        apply(
            &mut world,
            Command::AssignPath {
                path,
                anomaly: Some(maze_drive_core::PathAnomaly::LoopExceeded { limit: 20 }),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::PathTruncated { limit: 20 },
                Event::PathAssigned {
                    length: 1,
                    completion: PathCompletion::None,
                },
            ]
        );
    }
}
