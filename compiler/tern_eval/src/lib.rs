//! Tern Eval - reference evaluator for type-checked programs.
//!
//! Runs the top level and the finalized instantiations of a
//! [`TypedProgram`](tern_types::TypedProgram). No method lookup happens at
//! run time: every call selects its target from the dispatch table the type
//! checker recorded for that call site, keyed by the exact runtime types of
//! the receiver and arguments. A program that type-checked cleanly therefore
//! never misses a dispatch entry.

mod config;
pub mod errors;
mod interpreter;
mod operators;
mod value;

#[cfg(test)]
mod test_helpers;

pub use config::EvalConfig;
pub use errors::{EvalError, EvalErrorKind};
pub use interpreter::{run, run_with_config, Interpreter};
pub use value::{Object, Value};
