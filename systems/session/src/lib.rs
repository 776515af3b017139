#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session commands exposed to host adapters.
//!
//! A session owns exactly one world and one game loop. Host input is routed
//! through the loop controller, which decides whether a command reaches the
//! world, and every resulting world event is returned to the host so that
//! renderers can redraw incrementally.

use std::time::Duration;

use life_core::{Command, Event, LoopState, Position};
use life_system_game_loop::{GameLoop, LoopError};
use life_system_speed::{SpeedError, SpeedSetting};
use life_world::{self as world, World};
use thiserror::Error;
use tracing::warn;

/// Errors surfaced to the host when a session command is rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum SessionError {
    /// The loop controller rejected the command in its current state.
    #[error(transparent)]
    Loop(#[from] LoopError),
    /// The speed control supplied a value outside its calibrated domain.
    #[error(transparent)]
    Speed(#[from] SpeedError),
}

/// Single simulation session: one world, one loop controller.
#[derive(Debug, Default)]
pub struct Session {
    world: World,
    game_loop: GameLoop,
}

impl Session {
    /// Creates a paused, empty session running at the provided speed.
    #[must_use]
    pub fn new(speed: SpeedSetting) -> Self {
        Self {
            world: World::new(),
            game_loop: GameLoop::new(speed),
        }
    }

    /// Read-only access to the world for queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Current loop state.
    #[must_use]
    pub fn state(&self) -> LoopState {
        self.game_loop.state()
    }

    /// Current speed setting.
    #[must_use]
    pub fn speed(&self) -> SpeedSetting {
        self.game_loop.speed()
    }

    /// Writes the authored initial state and performs the initial scan.
    ///
    /// Seeding is an edit, so it is only accepted while paused.
    pub fn load<I>(&mut self, cells: I) -> Result<Vec<Event>, SessionError>
    where
        I: IntoIterator<Item = Position>,
    {
        let mut commands = Vec::new();
        self.game_loop
            .authorize_seed(cells.into_iter().collect(), &mut commands)?;
        let mut events = Vec::new();
        self.execute(commands, &mut events);
        Ok(events)
    }

    /// Pauses or resumes continuous play.
    pub fn toggle_pause(&mut self) -> LoopState {
        self.game_loop.toggle_pause()
    }

    /// Stops continuous play; a no-op while already paused.
    pub fn pause(&mut self) -> LoopState {
        self.game_loop.pause()
    }

    /// Starts continuous play; a no-op while already running.
    pub fn resume(&mut self) -> LoopState {
        self.game_loop.resume()
    }

    /// Schedules a single generation; only valid while paused.
    pub fn step_once(&mut self) -> Result<(), SessionError> {
        self.game_loop.step_once().map_err(|error| {
            warn!(%error, "single step rejected");
            SessionError::from(error)
        })
    }

    /// Clears the grid and forces the loop back to paused.
    pub fn reset(&mut self) -> Vec<Event> {
        let mut commands = Vec::new();
        self.game_loop.reset(&mut commands);
        let mut events = Vec::new();
        self.execute(commands, &mut events);
        events
    }

    /// Flips the cell at `position`; only valid while paused.
    pub fn toggle_cell(&mut self, position: Position) -> Result<Vec<Event>, SessionError> {
        let mut commands = Vec::new();
        self.game_loop.authorize_edit(position, &mut commands)?;
        let mut events = Vec::new();
        self.execute(commands, &mut events);
        Ok(events)
    }

    /// Applies a new speed slider value.
    pub fn set_speed(&mut self, value: f64) -> Result<SpeedSetting, SessionError> {
        Ok(self.game_loop.set_speed(value)?)
    }

    /// Advances host time, running every generation that falls due.
    pub fn tick(&mut self, dt: Duration) -> Vec<Event> {
        self.tick_up_to(dt, u64::MAX)
    }

    /// Advances host time, running at most `max_generations` of the
    /// generations that fall due; the surplus is dropped.
    pub fn tick_up_to(&mut self, dt: Duration, max_generations: u64) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);

        let mut commands = Vec::new();
        self.game_loop.handle(&events, &mut commands);

        let mut remaining = max_generations;
        commands.retain(|command| {
            if !matches!(command, Command::AdvanceGeneration) {
                return true;
            }
            if remaining == 0 {
                return false;
            }
            remaining -= 1;
            true
        });
        self.execute(commands, &mut events);
        events
    }

    fn execute(&mut self, commands: Vec<Command>, out: &mut Vec<Event>) {
        for command in commands {
            world::apply(&mut self.world, command, out);
        }
    }
}
