//! This module defines the core data structures and types used throughout the interpreter,
//! including transition records, head directions, execution outcomes, and error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Rule;

/// The default blank symbol used on the tape.
pub const DEFAULT_BLANK_SYMBOL: char = 'B';
/// The default wildcard symbol, used as a fallback read key and as a "leave unchanged" write.
pub const DEFAULT_WILDCARD_SYMBOL: char = '*';
/// Everything from this character to the end of a program line is discarded.
pub const COMMENT_MARKER: char = ';';
/// The maximum allowed size for a transition program in bytes.
pub const MAX_PROGRAM_SIZE: usize = 65536; // 64KB

/// Represents a single transition rule, stored under its `(state, symbol)` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The symbol written under the head. The wildcard leaves the cell unchanged.
    pub write: char,
    /// The direction the head moves after writing.
    pub direction: Direction,
    /// The state the machine transitions to.
    pub next_state: String,
}

/// Represents the possible directions the head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

impl Direction {
    /// Parses a direction token.
    ///
    /// `L`, `l` and `<` move left, `R`, `r` and `>` move right, and `*`, `S`, `s`,
    /// `N`, `n` and `-` keep the head in place. Any other token is rejected.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "L" | "l" | "<" => Some(Direction::Left),
            "R" | "r" | ">" => Some(Direction::Right),
            "*" | "S" | "s" | "N" | "n" | "-" => Some(Direction::Stay),
            _ => None,
        }
    }

    /// Returns the signed head offset for this direction.
    pub fn offset(self) -> isize {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
            Direction::Stay => 0,
        }
    }
}

/// Controls how the table builder treats a `(state, symbol)` pair defined twice.
///
/// - `Normal` (default): the last definition wins and the overwritten one is recorded
///   as a [`Duplicate`] anomaly on the table.
/// - `Strict`: a duplicate definition is a construction error.
#[derive(Debug, Default, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum Mode {
    /// Last definition wins.
    #[default]
    Normal,
    /// Duplicate definitions are rejected.
    Strict,
}

/// A `(state, symbol)` pair that was defined more than once in a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duplicate {
    /// 1-based line of the definition that replaced an earlier one.
    pub line: usize,
    pub state: String,
    pub symbol: char,
}

/// Represents the outcome of a single execution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The machine performed a transition into a non-final state.
    Continue,
    /// The machine is in a final state.
    Halt,
}

/// Represents various errors that can occur while building or running a machine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuringMachineError {
    /// A program line did not split into exactly five fields.
    #[error("Malformed line {line}: expected 5 fields, got {fields}: '{content}'")]
    MalformedLine {
        line: usize,
        fields: usize,
        content: String,
    },
    /// A symbol field was not a single character.
    #[error("Invalid symbol on line {line}: '{token}' is not a single character")]
    InvalidSymbol { line: usize, token: String },
    /// A direction field was outside the accepted token set.
    #[error("Unsupported direction on line {line}: '{token}'")]
    UnsupportedDirection { line: usize, token: String },
    /// A `(state, symbol)` pair was defined twice while building in strict mode.
    #[error("Duplicate transition on line {line}: state '{state}' and symbol '{symbol}'")]
    DuplicateTransition {
        line: usize,
        state: String,
        symbol: char,
    },
    /// The program contained no rule lines.
    #[error("Program contains no transition rules")]
    EmptyProgram,
    /// Indicates an error raised by the program grammar.
    #[error("Program parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// No exact or wildcard rule exists for the current state and symbol.
    #[error("No transition defined for state '{state}' and symbol '{symbol}'")]
    UndefinedTransition { state: String, symbol: char },
    /// The machine did not reach a final state within the requested step ceiling.
    #[error("Step limit of {0} exceeded before reaching a final state")]
    StepLimitExceeded(usize),
    /// A tape could not be decoded.
    #[error("Invalid tape: {0}")]
    InvalidTape(String),
    /// An operand bit width outside `1..=63` was requested.
    #[error("Invalid operand bit width: {0}")]
    InvalidBitWidth(u32),
    /// No embedded program is registered under the given name.
    #[error("Unknown program: {0}")]
    UnknownProgram(String),
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    FileError(String),
}
