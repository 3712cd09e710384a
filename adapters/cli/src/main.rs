#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives the Maze Drive engine headlessly.

mod level_gen;
mod level_transfer;

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use glam::Vec2;
use maze_drive_core::{
    CellCoord, Command, Difficulty, Direction, DirectionSet, Event, GridSize,
};
use maze_drive_system_movement::MovementDriver;
use maze_drive_system_pathing::Pathing;
use maze_drive_system_progression::{CampaignOutcome, Progression};
use maze_drive_world::{self as world, query, World};

use crate::level_gen::generate_campaign;
use crate::level_transfer::CampaignSnapshot;

/// Side length of one grid cell in world units.
const CELL_LENGTH: f32 = 0.5;
/// Fixed simulation step used while replaying moves.
const TICK: Duration = Duration::from_millis(100);
/// Upper bound on ticks spent waiting for one move to finish.
const MAX_TICKS_PER_MOVE: u32 = 600;

#[derive(Parser)]
#[command(name = "maze-drive", about = "Corridor-driving maze minigame engine")]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Generate a campaign of mazes and print its transfer string.
    Generate(GenerateArgs),
    /// Replay scripted direction inputs against a campaign.
    Play(PlayArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// Seed for the deterministic maze generator.
    #[arg(long, default_value_t = 7)]
    seed: u64,
    /// Number of levels in the campaign.
    #[arg(long, default_value_t = 3)]
    levels: u32,
    /// Grid width in cells.
    #[arg(long, default_value_t = 8)]
    width: u32,
    /// Grid height in cells.
    #[arg(long, default_value_t = 6)]
    height: u32,
    /// Fuel rule: easy, medium or hard.
    #[arg(long, default_value = "medium")]
    difficulty: String,
}

#[derive(Args)]
struct PlayArgs {
    /// Campaign transfer string; a campaign is generated when omitted.
    #[arg(long)]
    campaign: Option<String>,
    /// Seed used when generating the fallback campaign.
    #[arg(long, default_value_t = 7)]
    seed: u64,
    /// Level count of the fallback campaign.
    #[arg(long, default_value_t = 3)]
    levels: u32,
    /// Grid width of the fallback campaign.
    #[arg(long, default_value_t = 8)]
    width: u32,
    /// Grid height of the fallback campaign.
    #[arg(long, default_value_t = 6)]
    height: u32,
    /// Fuel rule of the fallback campaign: easy, medium or hard.
    #[arg(long, default_value = "medium")]
    difficulty: String,
    /// Scripted inputs, one letter per move (N, E, S or W).
    #[arg(long, default_value = "")]
    moves: String,
}

fn main() -> Result<()> {
    match Cli::parse().command {
        Cmd::Generate(args) => run_generate(&args),
        Cmd::Play(args) => run_play(&args),
    }
}

fn run_generate(args: &GenerateArgs) -> Result<()> {
    let size = grid_size(args.width, args.height, args.levels)?;
    let difficulty = parse_difficulty(&args.difficulty)?;
    let snapshot = generate_campaign(args.seed, args.levels, size, difficulty);
    println!("{}", snapshot.encode());
    Ok(())
}

fn run_play(args: &PlayArgs) -> Result<()> {
    let snapshot = match &args.campaign {
        Some(encoded) => {
            CampaignSnapshot::decode(encoded).context("could not decode campaign string")?
        }
        None => {
            let size = grid_size(args.width, args.height, args.levels)?;
            generate_campaign(args.seed, args.levels, size, parse_difficulty(&args.difficulty)?)
        }
    };

    let moves = parse_moves(&args.moves)?;
    let mut session = Session::new(snapshot);
    for direction in moves {
        session.play_move(direction);
    }
    session.print_summary();
    Ok(())
}

fn grid_size(width: u32, height: u32, levels: u32) -> Result<GridSize> {
    if width == 0 || height == 0 {
        bail!("grid dimensions must be at least 1x1");
    }
    if levels == 0 {
        bail!("a campaign needs at least one level");
    }
    Ok(GridSize::new(width, height))
}

fn parse_difficulty(value: &str) -> Result<Difficulty> {
    match value.to_ascii_lowercase().as_str() {
        "easy" => Ok(Difficulty::Easy),
        "medium" => Ok(Difficulty::Medium),
        "hard" => Ok(Difficulty::Hard),
        other => bail!("unknown difficulty '{other}', expected easy, medium or hard"),
    }
}

fn parse_moves(script: &str) -> Result<Vec<Direction>> {
    let mut moves = Vec::new();
    for letter in script.chars() {
        if letter.is_whitespace() || letter == ',' {
            continue;
        }
        let direction = match letter.to_ascii_uppercase() {
            'N' => Direction::North,
            'E' => Direction::East,
            'S' => Direction::South,
            'W' => Direction::West,
            other => bail!("unknown move '{other}', expected N, E, S or W"),
        };
        moves.push(direction);
    }
    Ok(moves)
}

/// One interactive engine instance: the world plus its pure systems.
struct Session {
    world: World,
    pathing: Pathing,
    driver: MovementDriver,
    progression: Progression,
}

impl Session {
    fn new(snapshot: CampaignSnapshot) -> Self {
        let mut session = Self {
            world: World::new(),
            pathing: Pathing::new(),
            driver: MovementDriver::default(),
            progression: Progression::new(),
        };
        session.submit(Command::ConfigureCampaign {
            difficulty: snapshot.difficulty,
            levels: snapshot.levels,
        });
        session
    }

    fn play_move(&mut self, direction: Direction) {
        println!("> move {direction:?}");
        self.submit(Command::RequestMove { direction });

        let mut ticks = 0;
        while query::route_len(&self.world) > 0 {
            if ticks >= MAX_TICKS_PER_MOVE {
                println!("  ! traversal did not settle, abandoning the move");
                break;
            }
            ticks += 1;
            self.submit(Command::Tick { dt: TICK });
        }

        if let Some(car) = query::car(&self.world) {
            let pose = self.driver.pose(car);
            let position = world_position(pose.from).lerp(world_position(pose.to), pose.progress);
            println!(
                "  car at ({}, {}) world ({:.2}, {:.2}) facing {:?}, affordances [{}]",
                car.cell.x(),
                car.cell.y(),
                position.x,
                position.y,
                pose.heading,
                describe_affordances(query::affordances(&self.world)),
            );
        }
    }

    /// Applies one command, then pumps systems until the engine settles.
    fn submit(&mut self, command: Command) {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);

        loop {
            if events.is_empty() {
                break;
            }
            for event in &events {
                if let Some(line) = describe_event(event) {
                    println!("  {line}");
                }
            }

            let mut commands = Vec::new();
            if let Some(view) = query::grid_view(&self.world) {
                self.pathing.handle(&events, view, &mut commands);
            }
            self.driver.handle(
                &events,
                query::car(&self.world),
                query::next_waypoint(&self.world),
                query::fuel(&self.world),
                &mut commands,
            );
            self.progression.handle(&events, &mut commands);

            if commands.is_empty() {
                break;
            }
            events.clear();
            for command in commands {
                world::apply(&mut self.world, command, &mut events);
            }
        }
    }

    fn print_summary(&self) {
        println!("---");
        if let Some(campaign) = query::campaign(&self.world) {
            println!(
                "campaign: {:?}, {} level(s), current {:?}",
                campaign.difficulty,
                campaign.level_count,
                campaign.current.map(|index| index.get()),
            );
        }
        if let Some(fuel) = query::fuel(&self.world) {
            if fuel.enabled {
                println!("fuel: {}/{}", fuel.remaining.get(), fuel.capacity.get());
            }
        }
        match self.progression.outcome() {
            CampaignOutcome::Won => println!("outcome: campaign won"),
            CampaignOutcome::InProgress => println!(
                "outcome: in progress, {} restart(s)",
                self.progression.failures()
            ),
        }
    }
}

/// Center of a cell in world units.
fn world_position(cell: CellCoord) -> Vec2 {
    Vec2::new(cell.x() as f32, cell.y() as f32) * CELL_LENGTH + Vec2::splat(CELL_LENGTH / 2.0)
}

fn describe_affordances(open: DirectionSet) -> String {
    let mut letters = String::new();
    for direction in open.iter() {
        if !letters.is_empty() {
            letters.push(' ');
        }
        letters.push(match direction {
            Direction::North => 'N',
            Direction::East => 'E',
            Direction::South => 'S',
            Direction::West => 'W',
        });
    }
    letters
}

fn describe_event(event: &Event) -> Option<String> {
    match event {
        Event::TimeAdvanced { .. } => None,
        Event::DifficultyChanged { difficulty } => {
            Some(format!("difficulty set to {difficulty:?}"))
        }
        Event::LevelLoaded { index, size, entry } => Some(format!(
            "level {} loaded, {}x{} cells, entry at ({}, {})",
            index.get(),
            size.width(),
            size.height(),
            entry.x(),
            entry.y(),
        )),
        Event::MoveRequested { first_step, .. } => Some(format!(
            "resolving route toward ({}, {})",
            first_step.x(),
            first_step.y(),
        )),
        Event::MoveRejected { reason } => Some(format!("move rejected: {reason:?}")),
        Event::PathAssigned { length, completion } => {
            Some(format!("route of {length} cell(s) assigned ({completion:?})"))
        }
        Event::PathTruncated { limit } => Some(format!(
            "warning: route truncated after {limit} cells, check the level data"
        )),
        Event::CarAdvanced { to, .. } => {
            Some(format!("car rolled into ({}, {})", to.x(), to.y()))
        }
        Event::FuelChanged { remaining } => {
            Some(format!("fuel at {} unit(s)", remaining.get()))
        }
        Event::PickupCollected { cell } => Some(format!(
            "fuel canister collected at ({}, {})",
            cell.x(),
            cell.y(),
        )),
        Event::FuelDepleted => Some("tank empty, level failed".to_owned()),
        Event::LevelCompleted { index } => {
            Some(format!("level {} complete", index.get()))
        }
        Event::CampaignWon => Some("campaign won".to_owned()),
    }
}
