//! This crate provides a deterministic single-tape Turing machine simulator.
//! It includes the tape, the transition rule table and the execution engine, together with
//! a parser and encoder for line-oriented rule files, a program analyzer and a small set of
//! built-in programs.

pub mod analyzer;
pub mod encoder;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod rules;
pub mod tape;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the analysis entry points.
pub use analyzer::{analyze, check_strict, AnalysisWarning};
/// Re-exports the rule file encoder.
pub use encoder::encode;
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the machine and its run configuration.
pub use machine::{CancelToken, Machine, RunOptions, RunOutcome, Snapshot, Trace};
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports `ProgramManager` and `PROGRAMS` from the programs module.
pub use programs::{ProgramManager, PROGRAMS};
/// Re-exports the rule table.
pub use rules::{Edit, RuleTable};
/// Re-exports the tape.
pub use tape::Tape;
/// Re-exports the shared types.
pub use types::{
    Action, Direction, Halt, HaltReason, Program, State, StepOutcome, Symbol, Transition,
    Trigger, TuringMachineError, WriteOrder, BLANK_SYMBOL, MAX_PROGRAM_SIZE,
};
