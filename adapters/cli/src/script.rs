//! Scripted session commands for unattended runs.
//!
//! A script is a text file with one command per line. Blank lines and lines
//! starting with `#` are ignored.
//!
//! ```text
//! toggle 3 4   # flip a cell (only honoured while paused)
//! step         # run a single generation
//! resume       # start continuous play
//! pause        # stop continuous play
//! toggle-pause # flip between running and paused
//! speed 0.05   # move the speed slider
//! wait 500     # let host time pass, in milliseconds
//! reset        # clear the grid and pause
//! ```

use std::{collections::VecDeque, time::Duration};

use life_core::Position;
use thiserror::Error;

/// Single host action replayed against the session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Action {
    /// Stop continuous play.
    Pause,
    /// Start continuous play.
    Resume,
    /// Flip between running and paused.
    TogglePause,
    /// Schedule exactly one generation.
    Step,
    /// Clear the grid and force the loop to pause.
    Reset,
    /// Flip the cell at the position.
    Toggle(Position),
    /// Apply a new speed slider value.
    Speed(f64),
    /// Let host time pass before the next action.
    Wait(Duration),
}

/// Errors reported while parsing a script.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub(crate) enum ScriptError {
    /// The line starts with a word that is not a command.
    #[error("line {line}: unknown command `{command}`")]
    UnknownCommand {
        /// One-based line number.
        line: usize,
        /// Offending word.
        command: String,
    },
    /// The command received the wrong number or kind of arguments.
    #[error("line {line}: `{command}` expects {expected}")]
    InvalidArguments {
        /// One-based line number.
        line: usize,
        /// Command whose arguments were rejected.
        command: &'static str,
        /// Human readable description of the expected arguments.
        expected: &'static str,
    },
}

/// Ordered queue of actions.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Script {
    actions: VecDeque<Action>,
}

impl Script {
    /// Parses a script from text.
    pub(crate) fn parse(source: &str) -> Result<Self, ScriptError> {
        let mut actions = VecDeque::new();
        for (index, raw) in source.lines().enumerate() {
            let line = index + 1;
            let content = raw.split('#').next().unwrap_or_default().trim();
            if content.is_empty() {
                continue;
            }

            let mut words = content.split_whitespace();
            let Some(command) = words.next() else {
                continue;
            };
            let arguments: Vec<&str> = words.collect();
            actions.push_back(parse_action(line, command, &arguments)?);
        }
        Ok(Self { actions })
    }

    /// Removes and returns the next action.
    pub(crate) fn next_action(&mut self) -> Option<Action> {
        self.actions.pop_front()
    }

    /// Reports whether every action was consumed.
    #[must_use]
    pub(crate) fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

fn parse_action(line: usize, command: &str, arguments: &[&str]) -> Result<Action, ScriptError> {
    let invalid = |command: &'static str, expected: &'static str| ScriptError::InvalidArguments {
        line,
        command,
        expected,
    };

    match command.to_ascii_lowercase().as_str() {
        "pause" => match arguments {
            [] => Ok(Action::Pause),
            _ => Err(invalid("pause", "no arguments")),
        },
        "resume" => match arguments {
            [] => Ok(Action::Resume),
            _ => Err(invalid("resume", "no arguments")),
        },
        "toggle-pause" => match arguments {
            [] => Ok(Action::TogglePause),
            _ => Err(invalid("toggle-pause", "no arguments")),
        },
        "step" => match arguments {
            [] => Ok(Action::Step),
            _ => Err(invalid("step", "no arguments")),
        },
        "reset" => match arguments {
            [] => Ok(Action::Reset),
            _ => Err(invalid("reset", "no arguments")),
        },
        "toggle" => match arguments {
            [x, y] => match (x.parse(), y.parse()) {
                (Ok(x), Ok(y)) => Ok(Action::Toggle(Position::new(x, y))),
                _ => Err(invalid("toggle", "two integer coordinates")),
            },
            _ => Err(invalid("toggle", "two integer coordinates")),
        },
        "speed" => match arguments {
            [value] => value
                .parse()
                .map(Action::Speed)
                .map_err(|_| invalid("speed", "one decimal slider value")),
            _ => Err(invalid("speed", "one decimal slider value")),
        },
        "wait" => match arguments {
            [millis] => millis
                .parse()
                .map(|millis| Action::Wait(Duration::from_millis(millis)))
                .map_err(|_| invalid("wait", "a duration in whole milliseconds")),
            _ => Err(invalid("wait", "a duration in whole milliseconds")),
        },
        _ => Err(ScriptError::UnknownCommand {
            line,
            command: command.to_owned(),
        }),
    }
}
