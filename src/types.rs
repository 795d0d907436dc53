//! This module defines the core data structures and types shared by the tape, the rule table
//! and the machine: symbols, states, transitions, step/run outcomes and error types.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Rule;

/// An atomic tape value.
pub type Symbol = char;
/// A control-state identifier. Rule files may use negative states.
pub type State = i32;

/// The reserved blank symbol used to fill cells that were never written.
pub const BLANK_SYMBOL: Symbol = '_';
/// The control state a machine starts in unless told otherwise.
pub const DEFAULT_INITIAL_STATE: State = 0;
/// The maximum allowed size for a rule file in bytes. Long tapes live on the first line, so
/// this only guards against feeding arbitrary large files to the parser.
pub const MAX_PROGRAM_SIZE: usize = 16 * 1024 * 1024; // 16MB

/// A complete machine description as produced by the parser or a JSON document.
///
/// The accepting states are kept as written (duplicates included) so that the
/// analyzer can report on them; the machine itself only needs the set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Program {
    /// Human readable name. Empty for programs parsed from rule files.
    #[serde(default)]
    pub name: String,
    /// Initial tape content; address 0 is the first symbol.
    pub tape: String,
    /// The control state the machine starts in.
    pub initial_state: State,
    /// Transition rules in file order.
    pub rules: Vec<Transition>,
    /// Accepting (final) states.
    #[serde(default)]
    pub accepting: Vec<State>,
}

/// The `(state, symbol)` pair a transition matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Trigger {
    pub state: State,
    pub symbol: Symbol,
}

impl Trigger {
    pub fn new(state: State, symbol: Symbol) -> Self {
        Self { state, symbol }
    }
}

/// What a matched transition does to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// The state the machine transitions to.
    pub next_state: State,
    /// The symbol written under the head.
    pub write: Symbol,
    /// Where the head goes.
    pub direction: Direction,
    /// Whether the write happens before or after the head moves.
    pub order: WriteOrder,
}

impl Action {
    pub fn new(next_state: State, write: Symbol, direction: Direction, order: WriteOrder) -> Self {
        Self {
            next_state,
            write,
            direction,
            order,
        }
    }
}

/// A single transition rule: a trigger and the action it prescribes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub trigger: Trigger,
    pub action: Action,
}

impl Transition {
    pub fn new(trigger: Trigger, action: Action) -> Self {
        Self { trigger, action }
    }
}

/// Formats a transition as a rule file line: `move_first from to read write delta`.
impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let move_first = match self.action.order {
            WriteOrder::MoveThenWrite => 1,
            WriteOrder::WriteThenMove => 0,
        };

        write!(
            f,
            "{} {} {} {} {} {}",
            move_first,
            self.trigger.state,
            self.action.next_state,
            self.trigger.symbol,
            self.action.write,
            self.action.direction.delta()
        )
    }
}

/// Represents the possible directions the head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Keep the head in the same position.
    Stay,
    /// Move the head one position to the right.
    Right,
}

impl Direction {
    /// The signed address delta of this direction.
    pub fn delta(self) -> i64 {
        match self {
            Direction::Left => -1,
            Direction::Stay => 0,
            Direction::Right => 1,
        }
    }

    /// Converts a signed delta (`-1`, `0` or `1`) into a direction.
    pub fn from_delta(delta: i64) -> Option<Self> {
        match delta {
            -1 => Some(Direction::Left),
            0 => Some(Direction::Stay),
            1 => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Order in which a transition writes its symbol and moves the head.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteOrder {
    /// Write under the current head, then move.
    #[default]
    WriteThenMove,
    /// Move first, then write under the new head position.
    MoveThenWrite,
}

/// Represents the outcome of a single `Machine::step` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    /// A transition was applied and the machine keeps running.
    Advanced,
    /// The current state is accepting; nothing was executed.
    Accepted,
    /// No transition matches the current `(state, symbol)`; nothing was executed.
    Stuck,
}

/// Terminal classification of a halted machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Halt {
    Accepted,
    Stuck,
}

impl From<Halt> for StepOutcome {
    fn from(halt: Halt) -> Self {
        match halt {
            Halt::Accepted => StepOutcome::Accepted,
            Halt::Stuck => StepOutcome::Stuck,
        }
    }
}

/// Why a call to `Machine::run` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HaltReason {
    /// The machine reached an accepting state.
    Accepted,
    /// No transition matched the current trigger.
    Stuck,
    /// The caller's step limit was reached; the machine is still running.
    LimitExceeded,
    /// The caller's cancellation token fired; the machine is still running.
    Cancelled,
}

impl From<Halt> for HaltReason {
    fn from(halt: Halt) -> Self {
        match halt {
            Halt::Accepted => HaltReason::Accepted,
            Halt::Stuck => HaltReason::Stuck,
        }
    }
}

/// Represents various errors that can occur around the machine: loading, parsing and validating programs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuringMachineError {
    /// Indicates an error during the parsing of a rule file.
    #[error("Program parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates a program that parsed but was rejected by validation.
    #[error("Program validation error: {0}")]
    ValidationError(String),
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    FileError(String),
    /// Indicates a malformed JSON program document.
    #[error("JSON error: {0}")]
    JsonError(String),
}

impl From<serde_json::Error> for TuringMachineError {
    fn from(error: serde_json::Error) -> Self {
        TuringMachineError::JsonError(error.to_string())
    }
}
