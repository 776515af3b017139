#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Play / pause / single-step state machine that schedules generations.
//!
//! The controller consumes [`Event::TimeAdvanced`] notifications, accumulates
//! host time, and emits [`Command::AdvanceGeneration`] once per elapsed tick
//! period while running. Scheduling is expressed as "next advance at
//! `T + period`"; the controller never blocks.

use std::time::Duration;

use life_core::{Command, Event, LoopState, Position};
use life_system_speed::{SpeedError, SpeedSetting};
use thiserror::Error;
use tracing::debug;

/// Errors raised when an operation is not valid in the current loop state.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum LoopError {
    /// The operation requires the loop to be paused.
    #[error("cannot {operation} while the loop is {state:?}")]
    InvalidState {
        /// Operation that was rejected.
        operation: &'static str,
        /// State the loop was in when the operation was requested.
        state: LoopState,
    },
}

/// Controller owning the loop state and the speed setting.
#[derive(Debug)]
pub struct GameLoop {
    state: LoopState,
    speed: SpeedSetting,
    accumulator: Duration,
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new(SpeedSetting::default())
    }
}

impl GameLoop {
    /// Creates a paused controller using the provided speed.
    #[must_use]
    pub fn new(speed: SpeedSetting) -> Self {
        Self {
            state: LoopState::Paused,
            speed,
            accumulator: Duration::ZERO,
        }
    }

    /// Current loop state.
    #[must_use]
    pub const fn state(&self) -> LoopState {
        self.state
    }

    /// Current speed setting.
    #[must_use]
    pub const fn speed(&self) -> SpeedSetting {
        self.speed
    }

    /// Replaces the speed setting after validating the slider value.
    ///
    /// The previous setting stays active when the value is rejected.
    pub fn set_speed(&mut self, value: f64) -> Result<SpeedSetting, SpeedError> {
        self.speed = SpeedSetting::new(value)?;
        debug!(value, label = %self.speed.label(), "speed changed");
        Ok(self.speed)
    }

    /// Switches between running and paused.
    ///
    /// A pending single step is upgraded to continuous play.
    pub fn toggle_pause(&mut self) -> LoopState {
        let next = match self.state {
            LoopState::Paused | LoopState::SteppingOnce => LoopState::Running,
            LoopState::Running => LoopState::Paused,
        };
        self.transition(next);
        next
    }

    /// Stops continuous play; a pending single step is cancelled.
    ///
    /// Has no effect when the loop is already paused.
    pub fn pause(&mut self) -> LoopState {
        self.transition(LoopState::Paused);
        self.state
    }

    /// Starts continuous play; has no effect when already running.
    pub fn resume(&mut self) -> LoopState {
        self.transition(LoopState::Running);
        self.state
    }

    /// Schedules exactly one generation at the next tick boundary.
    pub fn step_once(&mut self) -> Result<(), LoopError> {
        self.require_paused("step once")?;
        self.transition(LoopState::SteppingOnce);
        Ok(())
    }

    /// Requests a full clear and forces the loop back to paused.
    ///
    /// Time accumulated towards the next tick boundary is discarded.
    pub fn reset(&mut self, out: &mut Vec<Command>) {
        self.transition(LoopState::Paused);
        self.accumulator = Duration::ZERO;
        out.push(Command::ClearGrid);
    }

    /// Forwards a cell edit, which is only accepted while paused.
    pub fn authorize_edit(&self, position: Position, out: &mut Vec<Command>) -> Result<(), LoopError> {
        self.require_paused("edit a cell")?;
        out.push(Command::ToggleCell { position });
        Ok(())
    }

    /// Forwards authored initial cells and the initial scan, which are only
    /// accepted while paused.
    pub fn authorize_seed(
        &self,
        cells: Vec<Position>,
        out: &mut Vec<Command>,
    ) -> Result<(), LoopError> {
        self.require_paused("seed cells")?;
        out.push(Command::SeedCells { cells });
        out.push(Command::ScanInitialState);
        Ok(())
    }

    /// Consumes world events and emits generation commands at tick boundaries.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        let mut accumulated = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                accumulated = accumulated.saturating_add(*dt);
            }
        }

        if accumulated.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        let period = self.speed.tick_period();
        if period.is_zero() {
            return;
        }

        while self.accumulator >= period {
            self.accumulator -= period;
            match self.state {
                LoopState::Running => out.push(Command::AdvanceGeneration),
                LoopState::SteppingOnce => {
                    out.push(Command::AdvanceGeneration);
                    self.transition(LoopState::Paused);
                }
                LoopState::Paused => {}
            }
        }
    }

    fn require_paused(&self, operation: &'static str) -> Result<(), LoopError> {
        if self.state == LoopState::Paused {
            Ok(())
        } else {
            Err(LoopError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn transition(&mut self, next: LoopState) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, "loop state changed");
            self.state = next;
        }
    }
}
