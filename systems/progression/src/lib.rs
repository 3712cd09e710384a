#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure campaign sequencing system for Maze Drive.
//!
//! Reacts to level outcomes: a completed level advances the campaign, a dry
//! tank restarts the current level, and the final completion marks the whole
//! campaign as won. Adapters that want to pause between levels (for victory
//! or retry screens) can hold back the emitted commands instead of
//! forwarding them straight to the world.

use maze_drive_core::{Command, Event};

/// Overall state of the campaign being played.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CampaignOutcome {
    /// Levels remain to be completed.
    #[default]
    InProgress,
    /// Every level of the campaign was completed.
    Won,
}

/// Pure system that turns level outcomes into campaign commands.
#[derive(Clone, Copy, Debug, Default)]
pub struct Progression {
    outcome: CampaignOutcome,
    failures: u32,
}

impl Progression {
    /// Creates a progression system for a fresh campaign.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            outcome: CampaignOutcome::InProgress,
            failures: 0,
        }
    }

    /// Overall outcome observed so far.
    #[must_use]
    pub const fn outcome(&self) -> CampaignOutcome {
        self.outcome
    }

    /// Number of fuel-exhaustion failures observed so far.
    #[must_use]
    pub const fn failures(&self) -> u32 {
        self.failures
    }

    /// Consumes world events and emits campaign sequencing commands.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::DifficultyChanged { .. } => {
                    self.outcome = CampaignOutcome::InProgress;
                    self.failures = 0;
                }
                Event::LevelCompleted { .. } => {
                    out.push(Command::AdvanceLevel);
                }
                Event::FuelDepleted => {
                    self.failures = self.failures.saturating_add(1);
                    out.push(Command::RestartLevel);
                }
                Event::CampaignWon => {
                    self.outcome = CampaignOutcome::Won;
                }
                _ => {}
            }
        }
    }
}
