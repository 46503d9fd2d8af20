//! Whitelisted builtin operations.
//!
//! These are the only capabilities a snippet can reach beyond arithmetic:
//! table shape and filtering, list aggregation, and a few string/number
//! helpers. Anything outside this set is an `UnknownMethod` failure, which
//! is what makes the execution scope closed.

use std::sync::Arc;

use super::evaluator::{EvalError, EvalResult};
use super::value::Value;
use crate::table::normalize::{ColumnValues, TypedTable};

/// `target[index]`: column lookup on tables, positional access on lists.
pub(crate) fn index(target: &Value, index: &Value) -> EvalResult<Value> {
    match (target, index) {
        (Value::Table(table), Value::String(name)) => column_values(table, name),
        (Value::Table(_), other) => Err(EvalError::TypeMismatch(format!(
            "table index must be a column name string, got {}",
            other.type_name()
        ))),
        (Value::List(items), Value::Integer(i)) => {
            let idx = usize::try_from(*i).map_err(|_| EvalError::IndexOutOfBounds {
                index: *i,
                len: items.len(),
            })?;
            items.get(idx).cloned().ok_or(EvalError::IndexOutOfBounds {
                index: *i,
                len: items.len(),
            })
        }
        (Value::List(_), other) => Err(EvalError::TypeMismatch(format!(
            "list index must be an integer, got {}",
            other.type_name()
        ))),
        (other, _) => Err(EvalError::TypeMismatch(format!(
            "{} cannot be indexed",
            other.type_name()
        ))),
    }
}

pub(crate) fn call_method(target: &Value, method: &str, args: &[Value]) -> EvalResult<Value> {
    match target {
        Value::Table(table) => table_method(table, method, args),
        Value::List(items) => list_method(items, method, args),
        Value::String(s) => string_method(s, method, args),
        Value::Integer(_) | Value::Float(_) => number_method(target, method, args),
        other => Err(EvalError::UnknownMethod {
            target: other.type_name(),
            method: method.to_string(),
        }),
    }
}

fn expect_arity(method: &str, args: &[Value], expected: usize) -> EvalResult<()> {
    if args.len() != expected {
        return Err(EvalError::Arity {
            method: method.to_string(),
            expected,
            found: args.len(),
        });
    }
    Ok(())
}

fn column_values(table: &TypedTable, name: &str) -> EvalResult<Value> {
    let column = table
        .column(name)
        .ok_or_else(|| EvalError::UnknownColumn(name.to_string()))?;
    let values = match &column.values {
        ColumnValues::Numeric(v) => v.iter().map(|n| Value::Float(*n)).collect(),
        ColumnValues::Text(v) => v.iter().map(|s| Value::String(s.clone())).collect(),
    };
    Ok(Value::List(values))
}

fn table_method(table: &Arc<TypedTable>, method: &str, args: &[Value]) -> EvalResult<Value> {
    match method {
        "rows" => {
            expect_arity(method, args, 0)?;
            Ok(Value::Integer(table.row_count() as i64))
        }
        "columns" => {
            expect_arity(method, args, 0)?;
            Ok(Value::List(
                table
                    .column_names()
                    .into_iter()
                    .map(Value::String)
                    .collect(),
            ))
        }
        "column" => {
            expect_arity(method, args, 1)?;
            match &args[0] {
                Value::String(name) => column_values(table, name),
                other => Err(EvalError::TypeMismatch(format!(
                    "column name must be a string, got {}",
                    other.type_name()
                ))),
            }
        }
        "where" => {
            expect_arity(method, args, 3)?;
            table_where(table, &args[0], &args[1], &args[2])
        }
        _ => Err(EvalError::UnknownMethod {
            target: "table",
            method: method.to_string(),
        }),
    }
}

/// `table.where(column, op, value)` returns a new table holding the rows
/// whose cell satisfies the predicate.
fn table_where(
    table: &Arc<TypedTable>,
    column: &Value,
    op: &Value,
    needle: &Value,
) -> EvalResult<Value> {
    let Value::String(column) = column else {
        return Err(EvalError::TypeMismatch(format!(
            "where() column must be a string, got {}",
            column.type_name()
        )));
    };
    let Value::String(op) = op else {
        return Err(EvalError::TypeMismatch(format!(
            "where() operator must be a string, got {}",
            op.type_name()
        )));
    };
    let typed_column = table
        .column(column)
        .ok_or_else(|| EvalError::UnknownColumn(column.clone()))?;

    let keep: Vec<usize> = match &typed_column.values {
        ColumnValues::Numeric(cells) => {
            let target = needle.as_number().ok_or_else(|| {
                EvalError::TypeMismatch(format!(
                    "where() on numeric column `{}` needs a number, got {}",
                    column,
                    needle.type_name()
                ))
            })?;
            cells
                .iter()
                .enumerate()
                .filter(|(_, cell)| numeric_predicate(op, **cell, target).unwrap_or(false))
                .map(|(i, _)| i)
                .collect()
        }
        ColumnValues::Text(cells) => {
            let Value::String(target) = needle else {
                return Err(EvalError::TypeMismatch(format!(
                    "where() on text column `{}` needs a string, got {}",
                    column,
                    needle.type_name()
                )));
            };
            cells
                .iter()
                .enumerate()
                .filter(|(_, cell)| text_predicate(op, cell, target).unwrap_or(false))
                .map(|(i, _)| i)
                .collect()
        }
    };

    // Unknown operators fail loudly rather than matching nothing.
    match &typed_column.values {
        ColumnValues::Numeric(_) if numeric_predicate(op, 0.0, 0.0).is_none() => {
            return Err(EvalError::TypeMismatch(format!(
                "unsupported where() operator `{}`",
                op
            )));
        }
        ColumnValues::Text(_) if text_predicate(op, "", "").is_none() => {
            return Err(EvalError::TypeMismatch(format!(
                "unsupported where() operator `{}`",
                op
            )));
        }
        _ => {}
    }

    Ok(Value::Table(Arc::new(table.select_rows(&keep))))
}

fn numeric_predicate(op: &str, cell: f64, target: f64) -> Option<bool> {
    match op {
        "==" => Some(cell == target),
        "!=" => Some(cell != target),
        ">" => Some(cell > target),
        ">=" => Some(cell >= target),
        "<" => Some(cell < target),
        "<=" => Some(cell <= target),
        _ => None,
    }
}

fn text_predicate(op: &str, cell: &str, target: &str) -> Option<bool> {
    match op {
        "==" => Some(cell == target),
        "!=" => Some(cell != target),
        "contains" => Some(cell.contains(target)),
        _ => None,
    }
}

fn list_method(items: &[Value], method: &str, args: &[Value]) -> EvalResult<Value> {
    match method {
        "count" => {
            expect_arity(method, args, 0)?;
            Ok(Value::Integer(items.len() as i64))
        }
        "sum" => {
            expect_arity(method, args, 0)?;
            Ok(Value::Float(numeric_items(items, method)?.iter().sum()))
        }
        "mean" => {
            expect_arity(method, args, 0)?;
            let numbers = non_empty(numeric_items(items, method)?, method)?;
            Ok(Value::Float(numbers.iter().sum::<f64>() / numbers.len() as f64))
        }
        "median" => {
            expect_arity(method, args, 0)?;
            let mut numbers = non_empty(numeric_items(items, method)?, method)?;
            numbers.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let mid = numbers.len() / 2;
            let median = if numbers.len() % 2 == 0 {
                (numbers[mid - 1] + numbers[mid]) / 2.0
            } else {
                numbers[mid]
            };
            Ok(Value::Float(median))
        }
        "min" | "max" => {
            expect_arity(method, args, 0)?;
            extremum(items, method)
        }
        "argmax" | "argmin" => {
            expect_arity(method, args, 0)?;
            let numbers = non_empty(numeric_items(items, method)?, method)?;
            let mut best = 0usize;
            for (i, n) in numbers.iter().enumerate() {
                let better = if method == "argmax" {
                    *n > numbers[best]
                } else {
                    *n < numbers[best]
                };
                if better {
                    best = i;
                }
            }
            Ok(Value::Integer(best as i64))
        }
        "unique" => {
            expect_arity(method, args, 0)?;
            let mut seen: Vec<Value> = Vec::new();
            for item in items {
                if !seen.contains(item) {
                    seen.push(item.clone());
                }
            }
            Ok(Value::List(seen))
        }
        "sorted" => {
            expect_arity(method, args, 0)?;
            sorted(items, method)
        }
        "reversed" => {
            expect_arity(method, args, 0)?;
            Ok(Value::List(items.iter().rev().cloned().collect()))
        }
        "first" | "last" => {
            expect_arity(method, args, 0)?;
            let item = if method == "first" {
                items.first()
            } else {
                items.last()
            };
            item.cloned().ok_or_else(|| EvalError::EmptyAggregate {
                method: method.to_string(),
            })
        }
        "contains" => {
            expect_arity(method, args, 1)?;
            Ok(Value::Boolean(items.contains(&args[0])))
        }
        _ => Err(EvalError::UnknownMethod {
            target: "list",
            method: method.to_string(),
        }),
    }
}

fn numeric_items(items: &[Value], method: &str) -> EvalResult<Vec<f64>> {
    items
        .iter()
        .map(|item| {
            item.as_number().ok_or_else(|| {
                EvalError::TypeMismatch(format!(
                    "`{}` needs numeric elements, found {}",
                    method,
                    item.type_name()
                ))
            })
        })
        .collect()
}

fn non_empty(numbers: Vec<f64>, method: &str) -> EvalResult<Vec<f64>> {
    if numbers.is_empty() {
        return Err(EvalError::EmptyAggregate {
            method: method.to_string(),
        });
    }
    Ok(numbers)
}

fn extremum(items: &[Value], method: &str) -> EvalResult<Value> {
    if items.is_empty() {
        return Err(EvalError::EmptyAggregate {
            method: method.to_string(),
        });
    }
    if items.iter().all(Value::is_numeric) {
        let numbers = numeric_items(items, method)?;
        let mut best = 0usize;
        for (i, n) in numbers.iter().enumerate() {
            let better = if method == "max" {
                *n > numbers[best]
            } else {
                *n < numbers[best]
            };
            if better {
                best = i;
            }
        }
        return Ok(items[best].clone());
    }
    if let Some(strings) = all_strings(items) {
        let best = if method == "max" {
            strings.iter().max()
        } else {
            strings.iter().min()
        };
        return Ok(Value::String((*best.expect("non-empty")).clone()));
    }
    Err(EvalError::TypeMismatch(format!(
        "`{}` needs a list of numbers or a list of strings",
        method
    )))
}

fn sorted(items: &[Value], method: &str) -> EvalResult<Value> {
    if items.iter().all(Value::is_numeric) {
        let mut sorted_items = items.to_vec();
        sorted_items.sort_by(|a, b| {
            a.as_number()
                .partial_cmp(&b.as_number())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        return Ok(Value::List(sorted_items));
    }
    if let Some(mut strings) = all_strings(items) {
        strings.sort();
        return Ok(Value::List(
            strings.into_iter().map(|s| Value::String(s.clone())).collect(),
        ));
    }
    if items.is_empty() {
        return Ok(Value::List(Vec::new()));
    }
    Err(EvalError::TypeMismatch(format!(
        "`{}` needs a list of numbers or a list of strings",
        method
    )))
}

fn all_strings(items: &[Value]) -> Option<Vec<&String>> {
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect()
}

fn string_method(s: &str, method: &str, args: &[Value]) -> EvalResult<Value> {
    match method {
        "lower" => {
            expect_arity(method, args, 0)?;
            Ok(Value::String(s.to_lowercase()))
        }
        "upper" => {
            expect_arity(method, args, 0)?;
            Ok(Value::String(s.to_uppercase()))
        }
        "len" => {
            expect_arity(method, args, 0)?;
            Ok(Value::Integer(s.chars().count() as i64))
        }
        "trim" => {
            expect_arity(method, args, 0)?;
            Ok(Value::String(s.trim().to_string()))
        }
        _ => Err(EvalError::UnknownMethod {
            target: "string",
            method: method.to_string(),
        }),
    }
}

fn number_method(target: &Value, method: &str, args: &[Value]) -> EvalResult<Value> {
    let n = target.as_number().expect("numeric target");
    match method {
        "abs" => {
            expect_arity(method, args, 0)?;
            Ok(match target {
                Value::Integer(i) => Value::Integer(i.checked_abs().ok_or(EvalError::Overflow)?),
                _ => Value::Float(n.abs()),
            })
        }
        "round" => match args {
            [] => Ok(Value::Integer(n.round() as i64)),
            [Value::Integer(digits)] => {
                let factor = 10f64.powi((*digits).clamp(0, 12) as i32);
                Ok(Value::Float((n * factor).round() / factor))
            }
            [other] => Err(EvalError::TypeMismatch(format!(
                "round() digits must be an integer, got {}",
                other.type_name()
            ))),
            _ => Err(EvalError::Arity {
                method: method.to_string(),
                expected: 1,
                found: args.len(),
            }),
        },
        "floor" => {
            expect_arity(method, args, 0)?;
            Ok(Value::Float(n.floor()))
        }
        "ceil" => {
            expect_arity(method, args, 0)?;
            Ok(Value::Float(n.ceil()))
        }
        "sqrt" => {
            expect_arity(method, args, 0)?;
            if n < 0.0 {
                return Err(EvalError::TypeMismatch(
                    "sqrt() of a negative number".to_string(),
                ));
            }
            Ok(Value::Float(n.sqrt()))
        }
        _ => Err(EvalError::UnknownMethod {
            target: target.type_name(),
            method: method.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Table;
    use crate::table::normalize::{NUMERIC_COLUMN_THRESHOLD, normalize};
    use pretty_assertions::assert_eq;

    fn table() -> Arc<TypedTable> {
        let raw = Table::new(
            "prices",
            vec!["city".into(), "price".into()],
            vec![
                vec!["NY".into(), "300".into()],
                vec!["LA".into(), "250".into()],
                vec!["SF".into(), "400".into()],
            ],
        );
        Arc::new(normalize(&raw, NUMERIC_COLUMN_THRESHOLD))
    }

    fn floats(values: &[f64]) -> Vec<Value> {
        values.iter().map(|f| Value::Float(*f)).collect()
    }

    #[test]
    fn test_table_where_numeric() {
        let filtered = table_where(
            &table(),
            &Value::String("price".into()),
            &Value::String(">".into()),
            &Value::Integer(260),
        )
        .unwrap();
        let Value::Table(filtered) = filtered else {
            panic!("expected table");
        };
        assert_eq!(filtered.row_count(), 2);
        let cities = column_values(&filtered, "city").unwrap();
        assert_eq!(
            cities,
            Value::List(vec![Value::String("NY".into()), Value::String("SF".into())])
        );
    }

    #[test]
    fn test_table_where_text_contains() {
        let filtered = table_where(
            &table(),
            &Value::String("city".into()),
            &Value::String("contains".into()),
            &Value::String("N".into()),
        )
        .unwrap();
        let Value::Table(filtered) = filtered else {
            panic!("expected table");
        };
        assert_eq!(filtered.row_count(), 1);
    }

    #[test]
    fn test_table_where_unknown_operator() {
        let err = table_where(
            &table(),
            &Value::String("price".into()),
            &Value::String("between".into()),
            &Value::Integer(1),
        )
        .unwrap_err();
        assert!(matches!(err, EvalError::TypeMismatch(_)));
    }

    #[test]
    fn test_list_aggregates() {
        let items = floats(&[3.0, 1.0, 2.0]);
        assert_eq!(
            list_method(&items, "sum", &[]).unwrap(),
            Value::Float(6.0)
        );
        assert_eq!(
            list_method(&items, "mean", &[]).unwrap(),
            Value::Float(2.0)
        );
        assert_eq!(
            list_method(&items, "median", &[]).unwrap(),
            Value::Float(2.0)
        );
        assert_eq!(
            list_method(&items, "argmax", &[]).unwrap(),
            Value::Integer(0)
        );
        assert_eq!(
            list_method(&items, "sorted", &[]).unwrap(),
            Value::List(floats(&[1.0, 2.0, 3.0]))
        );
    }

    #[test]
    fn test_empty_aggregate_fails() {
        let err = list_method(&[], "mean", &[]).unwrap_err();
        assert!(matches!(err, EvalError::EmptyAggregate { .. }));
        // Sum over nothing is zero, as in the prompt examples.
        assert_eq!(list_method(&[], "sum", &[]).unwrap(), Value::Float(0.0));
    }

    #[test]
    fn test_unique_preserves_first_seen_order() {
        let items = vec![
            Value::String("NY".into()),
            Value::String("LA".into()),
            Value::String("NY".into()),
        ];
        assert_eq!(
            list_method(&items, "unique", &[]).unwrap(),
            Value::List(vec![Value::String("NY".into()), Value::String("LA".into())])
        );
    }

    #[test]
    fn test_string_extremum() {
        let items = vec![Value::String("b".into()), Value::String("a".into())];
        assert_eq!(
            list_method(&items, "min", &[]).unwrap(),
            Value::String("a".into())
        );
    }

    #[test]
    fn test_mixed_list_aggregate_fails() {
        let items = vec![Value::Integer(1), Value::String("x".into())];
        let err = list_method(&items, "mean", &[]).unwrap_err();
        assert!(matches!(err, EvalError::TypeMismatch(_)));
    }

    #[test]
    fn test_list_index_bounds() {
        let items = Value::List(floats(&[1.0]));
        assert_eq!(index(&items, &Value::Integer(0)).unwrap(), Value::Float(1.0));
        assert!(matches!(
            index(&items, &Value::Integer(5)).unwrap_err(),
            EvalError::IndexOutOfBounds { .. }
        ));
        assert!(matches!(
            index(&items, &Value::Integer(-1)).unwrap_err(),
            EvalError::IndexOutOfBounds { .. }
        ));
    }

    #[test]
    fn test_number_round() {
        assert_eq!(
            number_method(&Value::Float(31.337), "round", &[Value::Integer(2)]).unwrap(),
            Value::Float(31.34)
        );
        assert_eq!(
            number_method(&Value::Float(31.5), "round", &[]).unwrap(),
            Value::Integer(32)
        );
    }

    #[test]
    fn test_unknown_method() {
        let err = call_method(&Value::Table(table()), "drop", &[]).unwrap_err();
        assert_eq!(
            err,
            EvalError::UnknownMethod {
                target: "table",
                method: "drop".into()
            }
        );
    }
}
