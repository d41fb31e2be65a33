//! This crate provides a single-tape Turing Machine interpreter.
//! It includes modules for parsing line-oriented transition programs, building immutable
//! transition tables, executing them on an unbounded tape, and sampling the step counts
//! of the embedded binary multiplication program.

pub mod encoder;
pub mod loader;
pub mod machine;
pub mod output;
pub mod parser;
pub mod programs;
pub mod sampler;
pub mod table;
pub mod tape;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the operand encoding functions from the encoder module.
pub use encoder::{decode_product, encode_operands, multiply};
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the `TuringMachine` struct from the machine module.
pub use machine::TuringMachine;
/// Re-exports the run sinks from the output module.
pub use output::{write_state_count, RunSink, TapeLog};
/// Re-exports the embedded program registry.
pub use programs::{multiplication, ProgramInfo, ProgramManager};
/// Re-exports the sampling driver and its summaries.
pub use sampler::{histogram, Bin, Heatmap, Sampler, Summary};
/// Re-exports the transition table and its builder.
pub use table::{TableBuilder, TransitionTable};
/// Re-exports the tape.
pub use tape::Tape;
/// Re-exports the core types.
pub use types::{Direction, Duplicate, Mode, Step, Transition, TuringMachineError};
