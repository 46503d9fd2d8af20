//! # Evaluation System
//!
//! Executes a parsed snippet against a typed table. The evaluator is a
//! synchronous tree walker over the [`crate::ast`] nodes with a deliberately
//! small runtime:
//!
//! * [`value`]: The runtime value type and its lowering to plain JSON
//! * [`builtins`]: The whitelisted table, list, string, and numeric methods
//! * [`evaluator`]: Statement/expression evaluation under a fuel budget and
//!   wall-clock deadline
//!
//! The only names visible to a snippet are its locals and its single table
//! parameter. There is no import surface, no host function table, and no way
//! to reach the filesystem, network, or process state from inside a snippet;
//! resource use is bounded by fuel and the deadline rather than trust.

pub mod builtins;
pub mod evaluator;
pub mod value;

pub use evaluator::{EvalError, EvalResult, Evaluator};
pub use value::Value;
