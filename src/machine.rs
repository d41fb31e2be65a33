//! This module defines the `TuringMachine` struct, which executes a [`TransitionTable`]
//! against an unbounded single tape. It handles the run state (current state, tape, head),
//! single steps, and full runs until a final state is reached.

use crate::output::RunSink;
use crate::table::TransitionTable;
use crate::tape::Tape;
use crate::types::{Step, TuringMachineError};
use std::fmt;
use std::sync::Arc;

/// A single-tape Turing Machine.
///
/// The transition table is shared read-only through an `Arc`, so one table can back many
/// machines (for example one per worker thread). The run state is owned by the machine and
/// replaced at the start of every [`TuringMachine::run`].
pub struct TuringMachine {
    table: Arc<TransitionTable>,
    initial_head: isize,
    state: String,
    tape: Tape,
    step_count: usize,
    sink: Option<Box<dyn RunSink + Send>>,
}

impl TuringMachine {
    /// Creates a new machine over `table`, positioned on an empty tape.
    pub fn new(table: Arc<TransitionTable>) -> Self {
        Self {
            state: table.initial_state().to_string(),
            tape: Tape::new("", 0, table.blank()),
            table,
            initial_head: 0,
            step_count: 0,
            sink: None,
        }
    }

    /// Sets the head offset each run starts from (default: `0`).
    pub fn with_head(mut self, head: isize) -> Self {
        self.initial_head = head;
        self.tape = Tape::new("", head, self.table.blank());
        self
    }

    /// Attaches a sink notified once after every completed run.
    pub fn with_sink(mut self, sink: impl RunSink + Send + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Loads a fresh run state: initial state, initial head, and a copy of `input`.
    pub fn reset(&mut self, input: &str) {
        self.state = self.table.initial_state().to_string();
        self.tape = Tape::new(input, self.initial_head, self.table.blank());
        self.step_count = 0;
    }

    /// Executes a single transition.
    ///
    /// The tape is extended under the head before reading, the rule for the current state
    /// and symbol is looked up (falling back to the wildcard rule), its symbol is written
    /// (a wildcard write keeps the symbol that was read), the state is updated and the
    /// head moves.
    ///
    /// # Returns
    ///
    /// * `Ok(Step::Continue)` if the machine moved into a non-final state.
    /// * `Ok(Step::Halt)` if the machine is in a final state. A machine that is already
    ///   halted is left untouched.
    /// * `Err(TuringMachineError::UndefinedTransition)` if no rule applies.
    pub fn step(&mut self) -> Result<Step, TuringMachineError> {
        if self.is_halted() {
            return Ok(Step::Halt);
        }

        self.tape.extend_to_head();
        let symbol = self.tape.read();

        let Some(transition) = self.table.get(&self.state, symbol) else {
            return Err(TuringMachineError::UndefinedTransition {
                state: self.state.clone(),
                symbol,
            });
        };

        let write = if transition.write == self.table.wildcard() {
            symbol
        } else {
            transition.write
        };

        self.tape.write(write);
        self.state.clone_from(&transition.next_state);
        self.tape.shift(transition.direction.offset());
        self.step_count += 1;

        if self.is_halted() {
            Ok(Step::Halt)
        } else {
            Ok(Step::Continue)
        }
    }

    /// Runs the machine on `input` until it reaches a final state.
    ///
    /// There is no step ceiling: a table that never reaches a final state loops forever.
    /// Use [`TuringMachine::run_with_limit`] to bound execution.
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` with the number of steps executed.
    /// * `Err(TuringMachineError::UndefinedTransition)` if the run got stuck.
    pub fn run(&mut self, input: &str) -> Result<usize, TuringMachineError> {
        self.run_with_limit(input, None)
    }

    /// Runs the machine on `input`, failing with `StepLimitExceeded` if it has not halted
    /// after `limit` steps. `None` means unbounded.
    pub fn run_with_limit(
        &mut self,
        input: &str,
        limit: Option<usize>,
    ) -> Result<usize, TuringMachineError> {
        self.run_observed(input, limit, |_| {})
    }

    /// Like [`TuringMachine::run_with_limit`], but calls `observer` with the machine once
    /// after the reset and again after every step. The sink is notified as usual once the
    /// run halts.
    pub fn run_observed(
        &mut self,
        input: &str,
        limit: Option<usize>,
        mut observer: impl FnMut(&TuringMachine),
    ) -> Result<usize, TuringMachineError> {
        self.reset(input);
        observer(self);

        while !self.is_halted() {
            if limit.is_some_and(|limit| self.step_count >= limit) {
                return Err(TuringMachineError::StepLimitExceeded(self.step_count));
            }
            self.step()?;
            observer(self);
        }

        if let Some(sink) = self.sink.as_mut() {
            sink.on_halt(&self.tape.content(), self.step_count)?;
        }

        Ok(self.step_count)
    }

    /// Returns the current state of the machine.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns the initial state of the machine.
    pub fn initial_state(&self) -> &str {
        self.table.initial_state()
    }

    /// Checks if the machine is in a final state.
    pub fn is_halted(&self) -> bool {
        self.table.is_final(&self.state)
    }

    /// Returns the number of steps executed since the last reset.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Returns the head index into the materialized tape. It may be `-1` or one past the
    /// end between steps; the next step extends the tape before reading.
    pub fn head(&self) -> isize {
        self.tape.head()
    }

    /// Returns the symbol under the head.
    pub fn symbol(&self) -> char {
        self.tape.read()
    }

    /// Returns the materialized tape, blanks included.
    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Returns the tape with leading and trailing blanks trimmed.
    pub fn tape_content(&self) -> String {
        self.tape.content()
    }

    /// Returns the shared transition table.
    pub fn table(&self) -> &Arc<TransitionTable> {
        &self.table
    }

    /// Counts the distinct states referenced by the transition table.
    pub fn state_count(&self) -> usize {
        self.table.state_count()
    }
}

impl fmt::Debug for TuringMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TuringMachine")
            .field("state", &self.state)
            .field("head", &self.tape.head())
            .field("tape", &self.tape.cells())
            .field("step_count", &self.step_count)
            .finish()
    }
}
