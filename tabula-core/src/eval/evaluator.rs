//! Statement and expression evaluation.
//!
//! The evaluator walks a [`FnDef`] body with a local scope seeded from the
//! single table argument. Every node evaluation charges one unit of fuel and
//! the wall clock is checked alongside, so a hostile or runaway snippet
//! terminates with an error instead of blocking its worker.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

use super::builtins;
use super::value::Value;
use crate::ast::{BinaryOperator, Expression, FnDef, Literal, Statement, UnaryOperator};
use crate::table::normalize::TypedTable;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("Unknown variable `{0}`")]
    UnknownVariable(String),
    #[error("Unknown column `{0}`")]
    UnknownColumn(String),
    #[error("Unknown method `{method}` on {target}")]
    UnknownMethod { target: &'static str, method: String },
    #[error("Method `{method}` expects {expected} argument(s), got {found}")]
    Arity {
        method: String,
        expected: usize,
        found: usize,
    },
    #[error("Type error: {0}")]
    TypeMismatch(String),
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Integer overflow")]
    Overflow,
    #[error("Index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: i64, len: usize },
    #[error("Cannot compute `{method}` of an empty list")]
    EmptyAggregate { method: String },
    #[error("Evaluation exceeded the fuel budget")]
    FuelExhausted,
    #[error("Evaluation exceeded the time budget")]
    DeadlineExceeded,
    #[error("Function finished without returning a value")]
    MissingReturn,
}

pub type EvalResult<T> = Result<T, EvalError>;

/// Result of evaluating one statement: either the block continues, or a
/// `return` unwinds with its value.
enum StatementResult {
    Continue,
    Return(Value),
}

struct ExecContext {
    scope: HashMap<String, Value>,
    fuel: u64,
    deadline: Instant,
}

impl ExecContext {
    /// One unit of fuel per evaluated node; the deadline is polled on a
    /// coarse stride so the common path stays cheap.
    fn charge(&mut self) -> EvalResult<()> {
        if self.fuel == 0 {
            return Err(EvalError::FuelExhausted);
        }
        self.fuel -= 1;
        if self.fuel % 1024 == 0 && Instant::now() >= self.deadline {
            return Err(EvalError::DeadlineExceeded);
        }
        Ok(())
    }
}

/// Evaluates snippet function definitions under fixed resource bounds. The
/// evaluator itself is stateless; a fresh scope is built per call.
#[derive(Debug, Clone)]
pub struct Evaluator {
    max_fuel: u64,
    timeout: Duration,
}

impl Evaluator {
    pub fn new(max_fuel: u64, timeout: Duration) -> Self {
        Self { max_fuel, timeout }
    }

    /// Invokes `def` with the typed table as its sole argument.
    pub fn call(&self, def: &FnDef, table: Arc<TypedTable>) -> EvalResult<Value> {
        let mut ctx = ExecContext {
            scope: HashMap::from([(def.param.clone(), Value::Table(table))]),
            fuel: self.max_fuel,
            deadline: Instant::now() + self.timeout,
        };
        match self.eval_block(&def.body, &mut ctx)? {
            StatementResult::Return(value) => Ok(value),
            StatementResult::Continue => Err(EvalError::MissingReturn),
        }
    }

    fn eval_block(&self, block: &[Statement], ctx: &mut ExecContext) -> EvalResult<StatementResult> {
        for statement in block {
            if let StatementResult::Return(value) = self.eval_statement(statement, ctx)? {
                return Ok(StatementResult::Return(value));
            }
        }
        Ok(StatementResult::Continue)
    }

    fn eval_statement(
        &self,
        statement: &Statement,
        ctx: &mut ExecContext,
    ) -> EvalResult<StatementResult> {
        ctx.charge()?;
        match statement {
            Statement::Let { name, value } | Statement::Assign { name, value } => {
                let value = self.eval_expression(value, ctx)?;
                ctx.scope.insert(name.clone(), value);
                Ok(StatementResult::Continue)
            }
            Statement::Return(expr) => {
                let value = self.eval_expression(expr, ctx)?;
                Ok(StatementResult::Return(value))
            }
            Statement::If {
                condition,
                then_block,
                else_block,
            } => {
                if self.eval_condition(condition, ctx)? {
                    self.eval_block(then_block, ctx)
                } else if let Some(else_block) = else_block {
                    self.eval_block(else_block, ctx)
                } else {
                    Ok(StatementResult::Continue)
                }
            }
            Statement::While { condition, body } => {
                while self.eval_condition(condition, ctx)? {
                    if let StatementResult::Return(value) = self.eval_block(body, ctx)? {
                        return Ok(StatementResult::Return(value));
                    }
                }
                Ok(StatementResult::Continue)
            }
            Statement::Expression(expr) => {
                self.eval_expression(expr, ctx)?;
                Ok(StatementResult::Continue)
            }
        }
    }

    fn eval_condition(&self, condition: &Expression, ctx: &mut ExecContext) -> EvalResult<bool> {
        match self.eval_expression(condition, ctx)? {
            Value::Boolean(b) => Ok(b),
            other => Err(EvalError::TypeMismatch(format!(
                "condition must be a boolean, got {}",
                other.type_name()
            ))),
        }
    }

    fn eval_expression(&self, expr: &Expression, ctx: &mut ExecContext) -> EvalResult<Value> {
        ctx.charge()?;
        match expr {
            Expression::Literal(lit) => Ok(eval_literal(lit)),
            Expression::Variable(name) => ctx
                .scope
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::UnknownVariable(name.clone())),
            Expression::Index { target, index } => {
                let target = self.eval_expression(target, ctx)?;
                let index = self.eval_expression(index, ctx)?;
                builtins::index(&target, &index)
            }
            Expression::MethodCall {
                target,
                method,
                arguments,
            } => {
                let target = self.eval_expression(target, ctx)?;
                let mut args = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    args.push(self.eval_expression(argument, ctx)?);
                }
                debug!(method = %method, target = target.type_name(), "builtin call");
                builtins::call_method(&target, method, &args)
            }
            Expression::BinaryOp { op, left, right } => self.eval_binary_op(*op, left, right, ctx),
            Expression::UnaryOp { op, operand } => {
                let operand = self.eval_expression(operand, ctx)?;
                eval_unary_op(*op, &operand)
            }
            Expression::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval_expression(item, ctx)?);
                }
                Ok(Value::List(values))
            }
            Expression::Map(entries) => {
                let mut map = HashMap::new();
                for (key, value) in entries {
                    let value = self.eval_expression(value, ctx)?;
                    map.insert(key.clone(), value);
                }
                Ok(Value::Map(map))
            }
        }
    }

    fn eval_binary_op(
        &self,
        op: BinaryOperator,
        left: &Expression,
        right: &Expression,
        ctx: &mut ExecContext,
    ) -> EvalResult<Value> {
        // Logical operators short-circuit; everything else is strict.
        if matches!(op, BinaryOperator::And | BinaryOperator::Or) {
            let left = match self.eval_expression(left, ctx)? {
                Value::Boolean(b) => b,
                other => {
                    return Err(EvalError::TypeMismatch(format!(
                        "`{}` expects booleans, got {}",
                        op,
                        other.type_name()
                    )));
                }
            };
            if op == BinaryOperator::And && !left {
                return Ok(Value::Boolean(false));
            }
            if op == BinaryOperator::Or && left {
                return Ok(Value::Boolean(true));
            }
            return match self.eval_expression(right, ctx)? {
                Value::Boolean(b) => Ok(Value::Boolean(b)),
                other => Err(EvalError::TypeMismatch(format!(
                    "`{}` expects booleans, got {}",
                    op,
                    other.type_name()
                ))),
            };
        }

        let left = self.eval_expression(left, ctx)?;
        let right = self.eval_expression(right, ctx)?;
        eval_strict_binary_op(op, &left, &right)
    }
}

fn eval_literal(lit: &Literal) -> Value {
    match lit {
        Literal::Integer(i) => Value::Integer(*i),
        Literal::Float(f) => Value::Float(*f),
        Literal::String(s) => Value::String(s.clone()),
        Literal::Boolean(b) => Value::Boolean(*b),
        Literal::Null => Value::Null,
    }
}

fn eval_unary_op(op: UnaryOperator, operand: &Value) -> EvalResult<Value> {
    match (op, operand) {
        (UnaryOperator::Negate, Value::Integer(i)) => {
            i.checked_neg().map(Value::Integer).ok_or(EvalError::Overflow)
        }
        (UnaryOperator::Negate, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOperator::Not, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
        _ => Err(EvalError::TypeMismatch(format!(
            "`{}` cannot be applied to {}",
            op,
            operand.type_name()
        ))),
    }
}

fn eval_strict_binary_op(op: BinaryOperator, left: &Value, right: &Value) -> EvalResult<Value> {
    use BinaryOperator::*;
    match op {
        Equal => Ok(Value::Boolean(left == right)),
        NotEqual => Ok(Value::Boolean(left != right)),
        Greater | GreaterEqual | Less | LessEqual => compare_ordering(op, left, right),
        Add => match (left, right) {
            (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),
            _ => arithmetic(op, left, right),
        },
        Subtract | Multiply | Divide | Modulo => arithmetic(op, left, right),
        And | Or => unreachable!("logical operators are handled with short-circuiting"),
    }
}

fn compare_ordering(op: BinaryOperator, left: &Value, right: &Value) -> EvalResult<Value> {
    let ordering = match (left, right) {
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => {
            let (a, b) = both_numbers(op, left, right)?;
            a.partial_cmp(&b)
                .ok_or_else(|| EvalError::TypeMismatch("cannot order NaN".to_string()))?
        }
    };
    let result = match op {
        BinaryOperator::Greater => ordering.is_gt(),
        BinaryOperator::GreaterEqual => ordering.is_ge(),
        BinaryOperator::Less => ordering.is_lt(),
        BinaryOperator::LessEqual => ordering.is_le(),
        _ => unreachable!(),
    };
    Ok(Value::Boolean(result))
}

fn arithmetic(op: BinaryOperator, left: &Value, right: &Value) -> EvalResult<Value> {
    use BinaryOperator::*;
    // Integer pairs stay integral except for division, which is true
    // division as in the prompt examples.
    if let (Value::Integer(a), Value::Integer(b)) = (left, right) {
        return match op {
            Add => a.checked_add(*b).map(Value::Integer).ok_or(EvalError::Overflow),
            Subtract => a.checked_sub(*b).map(Value::Integer).ok_or(EvalError::Overflow),
            Multiply => a.checked_mul(*b).map(Value::Integer).ok_or(EvalError::Overflow),
            Divide => {
                if *b == 0 {
                    Err(EvalError::DivisionByZero)
                } else {
                    Ok(Value::Float(*a as f64 / *b as f64))
                }
            }
            Modulo => {
                if *b == 0 {
                    Err(EvalError::DivisionByZero)
                } else {
                    a.checked_rem(*b).map(Value::Integer).ok_or(EvalError::Overflow)
                }
            }
            _ => unreachable!(),
        };
    }

    let (a, b) = both_numbers(op, left, right)?;
    match op {
        Add => Ok(Value::Float(a + b)),
        Subtract => Ok(Value::Float(a - b)),
        Multiply => Ok(Value::Float(a * b)),
        Divide => {
            if b == 0.0 {
                Err(EvalError::DivisionByZero)
            } else {
                Ok(Value::Float(a / b))
            }
        }
        Modulo => {
            if b == 0.0 {
                Err(EvalError::DivisionByZero)
            } else {
                Ok(Value::Float(a % b))
            }
        }
        _ => unreachable!(),
    }
}

fn both_numbers(op: BinaryOperator, left: &Value, right: &Value) -> EvalResult<(f64, f64)> {
    match (left.as_number(), right.as_number()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(EvalError::TypeMismatch(format!(
            "`{}` cannot be applied to {} and {}",
            op,
            left.type_name(),
            right.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::parse_snippet;
    use crate::table::normalize::{NUMERIC_COLUMN_THRESHOLD, normalize};
    use crate::table::Table;
    use crate::tokenizer::token::Tokenizer;
    use pretty_assertions::assert_eq;

    fn typed_table() -> Arc<TypedTable> {
        let table = Table::new(
            "cities",
            vec!["age".into(), "city".into()],
            vec![
                vec!["34".into(), "NY".into()],
                vec!["".into(), "LA".into()],
                vec!["29".into(), "NY".into()],
            ],
        );
        Arc::new(normalize(&table, NUMERIC_COLUMN_THRESHOLD))
    }

    fn run(source: &str) -> EvalResult<Value> {
        let tokens = Tokenizer::new().tokenize(source).expect("tokenize");
        let def = parse_snippet(&tokens).expect("parse");
        Evaluator::new(100_000, Duration::from_secs(2)).call(&def, typed_table())
    }

    fn answer_of(value: Value) -> Value {
        let Value::Map(mut map) = value else {
            panic!("expected map result");
        };
        map.remove("answer").expect("answer key")
    }

    #[test]
    fn test_mean_over_imputed_column() {
        let result = run(r#"fn answer(table) {
            return { answer: table["age"].mean() };
        }"#)
        .unwrap();
        let Value::Float(mean) = answer_of(result) else {
            panic!("expected float");
        };
        // (34 + 31.5 + 29) / 3
        assert!((mean - 31.5).abs() < 1e-9);
    }

    #[test]
    fn test_argmax_row_lookup() {
        let result = run(r#"fn answer(table) {
            let ages = table["age"];
            return { answer: table["city"][ages.argmax()] };
        }"#)
        .unwrap();
        assert_eq!(answer_of(result), Value::String("NY".into()));
    }

    #[test]
    fn test_while_loop_accumulates() {
        let result = run(r#"fn answer(table) {
            let total = 0;
            let i = 0;
            while i < table.rows() {
                total = total + table["age"][i];
                i = i + 1;
            }
            return { answer: total };
        }"#)
        .unwrap();
        let Value::Float(total) = answer_of(result) else {
            panic!("expected float");
        };
        assert!((total - 94.5).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_column() {
        let err = run(r#"fn answer(table) {
            return { answer: table["salary"].mean() };
        }"#)
        .unwrap_err();
        assert_eq!(err, EvalError::UnknownColumn("salary".into()));
    }

    #[test]
    fn test_unknown_variable() {
        let err = run(r#"fn answer(table) { return { answer: missing }; }"#).unwrap_err();
        assert_eq!(err, EvalError::UnknownVariable("missing".into()));
    }

    #[test]
    fn test_division_by_zero() {
        let err = run(r#"fn answer(table) { return { answer: 1 / 0 }; }"#).unwrap_err();
        assert_eq!(err, EvalError::DivisionByZero);
    }

    #[test]
    fn test_infinite_loop_runs_out_of_fuel() {
        let err = run(r#"fn answer(table) {
            while true {
                let x = 1;
            }
            return { answer: 0 };
        }"#)
        .unwrap_err();
        assert_eq!(err, EvalError::FuelExhausted);
    }

    #[test]
    fn test_missing_return() {
        let err = run(r#"fn answer(table) { let x = 1; }"#).unwrap_err();
        assert_eq!(err, EvalError::MissingReturn);
    }

    #[test]
    fn test_condition_must_be_boolean() {
        let err = run(r#"fn answer(table) {
            if 1 { return { answer: 1 }; }
            return { answer: 0 };
        }"#)
        .unwrap_err();
        assert!(matches!(err, EvalError::TypeMismatch(_)));
    }

    #[test]
    fn test_string_concatenation_and_comparison() {
        let result = run(r#"fn answer(table) {
            let name = "New" + " York";
            return { answer: name, ordered: "a" < "b" };
        }"#)
        .unwrap();
        let Value::Map(map) = result else {
            panic!("expected map");
        };
        assert_eq!(map["answer"], Value::String("New York".into()));
        assert_eq!(map["ordered"], Value::Boolean(true));
    }

    #[test]
    fn test_integer_arithmetic_stays_integral() {
        let result = run(r#"fn answer(table) { return { answer: 2 + 3 * 4 }; }"#).unwrap();
        assert_eq!(answer_of(result), Value::Integer(14));
    }

    #[test]
    fn test_scope_does_not_leak_between_calls() {
        let tokens = Tokenizer::new()
            .tokenize(r#"fn answer(table) { let x = 1; return { answer: x }; }"#)
            .unwrap();
        let def = parse_snippet(&tokens).unwrap();
        let evaluator = Evaluator::new(1_000, Duration::from_secs(1));
        evaluator.call(&def, typed_table()).unwrap();

        let tokens = Tokenizer::new()
            .tokenize(r#"fn answer(table) { return { answer: x }; }"#)
            .unwrap();
        let def = parse_snippet(&tokens).unwrap();
        assert_eq!(
            evaluator.call(&def, typed_table()).unwrap_err(),
            EvalError::UnknownVariable("x".into())
        );
    }
}
