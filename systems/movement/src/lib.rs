#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame-stepped drive system that walks the car along its resolved route.
//!
//! The driver replaces engine-side animation coroutines with an explicit
//! state machine advanced by elapsed time: the car first turns toward the
//! next waypoint, then rolls into it, and only once the roll completes does
//! the system emit a `StepCar` command for the world to commit the arrival.
//! All visual interpolation stays on the adapter side, fed by [`DrivePose`].

use std::time::Duration;

use maze_drive_core::{CellCoord, Command, Direction, Event};
use maze_drive_world::query::{CarSnapshot, FuelView};

/// Timing parameters governing the car's traversal of a single cell.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    turn_duration: Duration,
    travel_duration: Duration,
}

impl Config {
    /// Creates a new configuration from quarter-turn and per-cell durations.
    #[must_use]
    pub const fn new(turn_duration: Duration, travel_duration: Duration) -> Self {
        Self {
            turn_duration,
            travel_duration,
        }
    }

    /// Duration of a single quarter turn.
    #[must_use]
    pub const fn turn_duration(&self) -> Duration {
        self.turn_duration
    }

    /// Duration of the roll from one cell into the next.
    #[must_use]
    pub const fn travel_duration(&self) -> Duration {
        self.travel_duration
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            turn_duration: Duration::from_millis(250),
            travel_duration: Duration::from_millis(500),
        }
    }
}

/// Interpolation data describing where the car is mid-traversal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrivePose {
    /// Cell the car is departing (its committed position).
    pub from: CellCoord,
    /// Cell the car is entering; equals `from` while idle.
    pub to: CellCoord,
    /// Heading the car currently faces.
    pub heading: Direction,
    /// Fraction of the roll completed, in `0.0..=1.0`; zero while turning.
    pub progress: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DrivePhase {
    Idle,
    Turning {
        target: CellCoord,
        remaining: Duration,
    },
    Advancing {
        target: CellCoord,
        elapsed: Duration,
    },
}

/// Pure system that consumes ticks and emits arrival commands.
#[derive(Debug)]
pub struct MovementDriver {
    config: Config,
    heading: Direction,
    phase: DrivePhase,
}

impl MovementDriver {
    /// Creates a driver with the provided timing configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self {
            config,
            heading: Direction::East,
            phase: DrivePhase::Idle,
        }
    }

    /// Heading the car currently faces.
    #[must_use]
    pub const fn heading(&self) -> Direction {
        self.heading
    }

    /// Captures the car's interpolated pose for presentation.
    #[must_use]
    pub fn pose(&self, car: CarSnapshot) -> DrivePose {
        match self.phase {
            DrivePhase::Idle => DrivePose {
                from: car.cell,
                to: car.cell,
                heading: self.heading,
                progress: 0.0,
            },
            DrivePhase::Turning { target, .. } => DrivePose {
                from: car.cell,
                to: target,
                heading: self.heading,
                progress: 0.0,
            },
            DrivePhase::Advancing { target, elapsed } => DrivePose {
                from: car.cell,
                to: target,
                heading: self.heading,
                progress: roll_fraction(elapsed, self.config.travel_duration),
            },
        }
    }

    /// Consumes world events and immutable views to emit drive commands.
    ///
    /// `waypoint` is the next cell of the active route, if any; `car` and
    /// `fuel` mirror the world's current snapshots. At most one `StepCar`
    /// is emitted per observed tick.
    pub fn handle(
        &mut self,
        events: &[Event],
        car: Option<CarSnapshot>,
        waypoint: Option<CellCoord>,
        fuel: Option<FuelView>,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::LevelLoaded { .. } => {
                    self.heading = Direction::East;
                    self.phase = DrivePhase::Idle;
                }
                Event::TimeAdvanced { dt } => {
                    self.advance(*dt, car, waypoint, fuel, out);
                }
                _ => {}
            }
        }
    }

    fn advance(
        &mut self,
        dt: Duration,
        car: Option<CarSnapshot>,
        waypoint: Option<CellCoord>,
        fuel: Option<FuelView>,
        out: &mut Vec<Command>,
    ) {
        let Some(car) = car else {
            self.phase = DrivePhase::Idle;
            return;
        };

        let mut budget = dt;
        loop {
            match self.phase {
                DrivePhase::Idle => {
                    if fuel.map_or(false, |view| view.enabled && view.remaining.is_empty()) {
                        return;
                    }
                    let Some(target) = waypoint else {
                        return;
                    };
                    let Some(required) = Direction::between(car.cell, target) else {
                        return;
                    };
                    let turns = self.heading.quarter_turns_to(required);
                    self.heading = required;
                    self.phase = if turns == 0 {
                        DrivePhase::Advancing {
                            target,
                            elapsed: Duration::ZERO,
                        }
                    } else {
                        DrivePhase::Turning {
                            target,
                            remaining: self.config.turn_duration.saturating_mul(turns),
                        }
                    };
                }
                DrivePhase::Turning { target, remaining } => {
                    if budget < remaining {
                        self.phase = DrivePhase::Turning {
                            target,
                            remaining: remaining - budget,
                        };
                        return;
                    }
                    budget -= remaining;
                    self.phase = DrivePhase::Advancing {
                        target,
                        elapsed: Duration::ZERO,
                    };
                }
                DrivePhase::Advancing { target, elapsed } => {
                    let total = elapsed.saturating_add(budget);
                    if total < self.config.travel_duration {
                        self.phase = DrivePhase::Advancing {
                            target,
                            elapsed: total,
                        };
                        return;
                    }
                    out.push(Command::StepCar);
                    self.phase = DrivePhase::Idle;
                    // The remaining budget is dropped: the next waypoint is
                    // only known once the world commits this arrival.
                    return;
                }
            }
        }
    }
}

impl Default for MovementDriver {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

fn roll_fraction(elapsed: Duration, travel: Duration) -> f32 {
    if travel.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f32() / travel.as_secs_f32()).clamp(0.0, 1.0)
}
