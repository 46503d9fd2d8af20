//! Sandboxed execution of extracted snippet source.
//!
//! This is the totality boundary of the system: whatever text comes in,
//! `execute` returns an [`ExecutionOutcome`], never an error and never a
//! panic. Tokenizer, parser, and evaluator faults are all folded into
//! `Failure` with a diagnosable message; the evaluator's fuel and deadline
//! bounds keep pathological snippets from blocking the worker.

use std::sync::Arc;

use tracing::debug;

use crate::analyzer::parse_snippet;
use crate::config::ExecutorConfig;
use crate::eval::{Evaluator, Value};
use crate::table::normalize::TypedTable;
use crate::tokenizer::token::Tokenizer;

/// Expected callable name; a snippet defining anything else has not honored
/// the contract.
const ENTRY_POINT: &str = "answer";

/// Outcome of one sandboxed invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    Success {
        answer: Value,
        columns_used: Vec<String>,
        explanation: String,
    },
    Failure {
        error: String,
    },
}

impl ExecutionOutcome {
    fn error(message: impl Into<String>) -> Self {
        ExecutionOutcome::Failure {
            error: message.into(),
        }
    }
}

/// Runs snippet source against a typed table inside a closed scope.
///
/// The scope built per invocation contains only the table argument and the
/// builtin whitelist; it is discarded afterwards, so nothing carries over
/// between questions.
#[derive(Debug, Clone)]
pub struct SandboxedExecutor {
    evaluator: Evaluator,
}

impl SandboxedExecutor {
    pub fn new(config: &ExecutorConfig) -> Self {
        Self {
            evaluator: Evaluator::new(config.max_fuel, config.timeout),
        }
    }

    pub fn execute(&self, source: &str, table: Arc<TypedTable>) -> ExecutionOutcome {
        let tokens = match Tokenizer::new().tokenize(source) {
            Ok(tokens) => tokens,
            Err(err) => {
                debug!(error = %err, "snippet failed to tokenize");
                return ExecutionOutcome::error(format!("Error executing code: {}", err));
            }
        };

        let def = match parse_snippet(&tokens) {
            Ok(def) => def,
            Err(err) => {
                debug!(error = %err, "snippet failed to parse");
                return ExecutionOutcome::error(format!("Error executing code: {}", err));
            }
        };

        if def.name != ENTRY_POINT {
            return ExecutionOutcome::error(
                "Function answer(table) was not defined in the generated code.",
            );
        }

        let result = match self.evaluator.call(&def, table) {
            Ok(value) => value,
            Err(err) => {
                debug!(error = %err, "snippet raised during evaluation");
                return ExecutionOutcome::error(format!("Error executing code: {}", err));
            }
        };

        let Value::Map(mut map) = result else {
            return ExecutionOutcome::error("Generated function did not return a map.");
        };

        let answer = map.remove("answer").unwrap_or(Value::Null);
        let columns_used = match map.remove("columns_used") {
            Some(Value::List(items)) => items.iter().map(|v| v.to_string()).collect(),
            Some(Value::String(single)) => vec![single],
            _ => Vec::new(),
        };
        let explanation = match map.remove("explanation") {
            Some(Value::String(text)) => text,
            Some(other) => other.to_string(),
            None => String::new(),
        };

        ExecutionOutcome::Success {
            answer,
            columns_used,
            explanation,
        }
    }
}
