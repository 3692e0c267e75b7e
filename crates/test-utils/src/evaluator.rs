// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Reference filter evaluator
//!
//! [`evaluate`] decides a [`Filter`] against one in-memory row. Paths are
//! looked up by their full dotted name; target qualifiers are ignored.
//! Comparisons involving a null are false.
//!
//! [`rebind`] replaces the constants of a filter with bound parameter values
//! taken in allocation order. Evaluating the original filter and the rebound
//! one over the same rows gives the same answers exactly when every constant
//! reached the parameter that its position in the statement expects.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use thiserror::Error;
use unified_query_ir::{CompareOp, Expression, Filter, FunctionKind, MatchMode, Value};

/// One in-memory row keyed by property path
pub type Row = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("unknown property '{0}'")]
    UnknownProperty(String),

    #[error("cannot evaluate {0}")]
    Unsupported(String),

    #[error("parameter count mismatch: filter uses {used}, {bound} bound")]
    ParameterCount { used: usize, bound: usize },

    #[error("pattern '{0}' does not fit its match mode")]
    MalformedPattern(String),
}

/// Evaluate `filter` against `row`
pub fn evaluate(filter: &Filter, row: &Row) -> Result<bool, EvalError> {
    match filter {
        Filter::IsNull(expr) => Ok(operand(expr, row)?.is_null()),
        Filter::IsNotNull(expr) => Ok(!operand(expr, row)?.is_null()),
        Filter::Compare { left, op, right } => {
            let ordering = compare(&operand(left, row)?, &operand(right, row)?);
            Ok(match (op, ordering) {
                (_, None) => false,
                (CompareOp::Equal, Some(o)) => o == Ordering::Equal,
                (CompareOp::NotEqual, Some(o)) => o != Ordering::Equal,
                (CompareOp::Greater { inclusive }, Some(o)) => {
                    o == Ordering::Greater || (*inclusive && o == Ordering::Equal)
                }
                (CompareOp::Less { inclusive }, Some(o)) => {
                    o == Ordering::Less || (*inclusive && o == Ordering::Equal)
                }
            })
        }
        Filter::Between { expr, from, to } => {
            let value = operand(expr, row)?;
            let lower = compare(&value, &operand(from, row)?);
            let upper = compare(&value, &operand(to, row)?);
            Ok(matches!(lower, Some(Ordering::Greater | Ordering::Equal))
                && matches!(upper, Some(Ordering::Less | Ordering::Equal)))
        }
        Filter::In { left, right } => membership(left, right, row),
        Filter::NotIn { left, right } => {
            let value = operand(left, row)?;
            if value.is_null() {
                return Ok(false);
            }
            membership(left, right, row).map(|found| !found)
        }
        Filter::StringMatch {
            left,
            value,
            mode,
            ignore_case,
        } => {
            let (Value::String(text), Value::String(needle)) = (operand(left, row)?, operand(value, row)?)
            else {
                return Ok(false);
            };
            let (text, needle) = if *ignore_case {
                (text.to_lowercase(), needle.to_lowercase())
            } else {
                (text, needle)
            };
            Ok(match mode {
                MatchMode::Contains => text.contains(&needle),
                MatchMode::StartsWith => text.starts_with(&needle),
                MatchMode::EndsWith => text.ends_with(&needle),
            })
        }
        Filter::And(children) => {
            for child in children {
                if !evaluate(child, row)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Filter::Or(children) => {
            for child in children {
                if evaluate(child, row)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Filter::Not(inner) => evaluate(inner, row).map(|b| !b),
        Filter::Exists(_) | Filter::NotExists(_) => Err(EvalError::Unsupported("sub-query".into())),
    }
}

fn membership(left: &Expression, right: &Expression, row: &Row) -> Result<bool, EvalError> {
    let value = operand(left, row)?;
    let candidates = match operand(right, row)? {
        Value::List(items) => items,
        single => vec![single],
    };
    Ok(candidates
        .iter()
        .any(|candidate| compare(&value, candidate) == Some(Ordering::Equal)))
}

fn operand(expr: &Expression, row: &Row) -> Result<Value, EvalError> {
    match expr {
        Expression::Path(path) => {
            let name = path.full_name();
            row.get(&name)
                .cloned()
                .ok_or(EvalError::UnknownProperty(name))
        }
        Expression::Constant(value) => Ok(value.clone()),
        Expression::Function(function) => {
            let [arg] = function.args.as_slice() else {
                return Err(EvalError::Unsupported(function.kind.name().to_string()));
            };
            let value = operand(arg, row)?;
            match (function.kind, value) {
                (_, Value::Null) => Ok(Value::Null),
                (FunctionKind::Lower, Value::String(s)) => Ok(Value::String(s.to_lowercase())),
                (FunctionKind::Upper, Value::String(s)) => Ok(Value::String(s.to_uppercase())),
                (kind, _) => Err(EvalError::Unsupported(kind.name().to_string())),
            }
        }
        other => Err(EvalError::Unsupported(other.kind().to_string())),
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Null, _) | (_, Value::Null) => None,
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::String(a), Value::String(b)) | (Value::Enum(a), Value::Enum(b)) => Some(a.cmp(b)),
        (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
        (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
        (Value::Time(a), Value::Time(b)) => Some(a.cmp(b)),
        (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
        (a, b) => a.as_f64()?.partial_cmp(&b.as_f64()?),
    }
}

/// Substitute bound parameter values for the constants of `filter`
///
/// Constants are visited in the order a statement binds them: left to right
/// and depth first, one value per list element. Null constants are inlined
/// and consume nothing. String-match values are bound as escaped `LIKE`
/// patterns; `escape` is the escape character used to build them.
pub fn rebind(filter: &Filter, values: &[Value], escape: char) -> Result<Filter, EvalError> {
    let mut binder = Rebinder {
        values,
        next: 0,
        escape,
    };
    let rebound = binder.filter(filter)?;
    if binder.next != values.len() {
        return Err(EvalError::ParameterCount {
            used: binder.next,
            bound: values.len(),
        });
    }
    Ok(rebound)
}

struct Rebinder<'v> {
    values: &'v [Value],
    next: usize,
    escape: char,
}

impl Rebinder<'_> {
    fn take(&mut self) -> Result<Value, EvalError> {
        let value = self
            .values
            .get(self.next)
            .cloned()
            .ok_or(EvalError::ParameterCount {
                used: self.next + 1,
                bound: self.values.len(),
            })?;
        self.next += 1;
        Ok(value)
    }

    fn filter(&mut self, filter: &Filter) -> Result<Filter, EvalError> {
        Ok(match filter {
            Filter::IsNull(expr) => Filter::IsNull(self.expr(expr)?),
            Filter::IsNotNull(expr) => Filter::IsNotNull(self.expr(expr)?),
            Filter::Compare { left, op, right } => Filter::Compare {
                left: self.expr(left)?,
                op: *op,
                right: self.expr(right)?,
            },
            Filter::Between { expr, from, to } => Filter::Between {
                expr: self.expr(expr)?,
                from: self.expr(from)?,
                to: self.expr(to)?,
            },
            Filter::In { left, right } => Filter::In {
                left: self.expr(left)?,
                right: self.expr(right)?,
            },
            Filter::NotIn { left, right } => Filter::NotIn {
                left: self.expr(left)?,
                right: self.expr(right)?,
            },
            Filter::StringMatch {
                left,
                value: _,
                mode,
                ignore_case,
            } => {
                let left = self.expr(left)?;
                let pattern = self.take()?;
                let raw = unwrap_pattern(&pattern, *mode, self.escape)?;
                Filter::StringMatch {
                    left,
                    value: Expression::Constant(Value::String(raw)),
                    mode: *mode,
                    ignore_case: *ignore_case,
                }
            }
            Filter::And(children) => Filter::And(self.filters(children)?),
            Filter::Or(children) => Filter::Or(self.filters(children)?),
            Filter::Not(inner) => Filter::not(self.filter(inner)?),
            Filter::Exists(_) | Filter::NotExists(_) => {
                return Err(EvalError::Unsupported("sub-query".into()));
            }
        })
    }

    fn filters(&mut self, filters: &[Filter]) -> Result<Vec<Filter>, EvalError> {
        filters.iter().map(|f| self.filter(f)).collect()
    }

    fn expr(&mut self, expr: &Expression) -> Result<Expression, EvalError> {
        match expr {
            Expression::Constant(Value::Null) => Ok(expr.clone()),
            Expression::Constant(Value::List(items)) => {
                let items = items
                    .iter()
                    .map(|item| match item {
                        Value::Null => Ok(Value::Null),
                        _ => self.take(),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Expression::Constant(Value::List(items)))
            }
            Expression::Constant(_) => Ok(Expression::Constant(self.take()?)),
            Expression::Function(function) => {
                let mut function = function.clone();
                for arg in &mut function.args {
                    *arg = self.expr(arg)?;
                }
                Ok(Expression::Function(function))
            }
            Expression::SubQuery(_) => Err(EvalError::Unsupported("sub-query".into())),
            _ => Ok(expr.clone()),
        }
    }
}

/// Strip match-mode wildcards and escape characters from a bound pattern
fn unwrap_pattern(pattern: &Value, mode: MatchMode, escape: char) -> Result<String, EvalError> {
    let Value::String(pattern) = pattern else {
        return Err(EvalError::MalformedPattern(pattern.to_string()));
    };
    let malformed = || EvalError::MalformedPattern(pattern.clone());
    let body = match mode {
        MatchMode::Contains => pattern.strip_prefix('%').and_then(|p| p.strip_suffix('%')),
        MatchMode::StartsWith => pattern.strip_suffix('%'),
        MatchMode::EndsWith => pattern.strip_prefix('%'),
    }
    .ok_or_else(malformed)?;

    let mut raw = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == escape {
            raw.push(chars.next().ok_or_else(malformed)?);
        } else {
            raw.push(c);
        }
    }
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use unified_query_ir::{Function, Path, ValueType};

    fn row() -> Row {
        Row::from([
            ("status".to_string(), Value::from("Open")),
            ("total".to_string(), Value::Decimal("120.50".into())),
            ("items".to_string(), Value::from(3)),
            ("note".to_string(), Value::Null),
            ("customer.name".to_string(), Value::from("50% Off_Club")),
        ])
    }

    #[test]
    fn test_evaluate_comparisons() {
        let total = Path::new("total", ValueType::Decimal);
        assert!(evaluate(&Filter::gt(total.clone(), Value::from(100)), &row()).unwrap());
        assert!(!evaluate(&Filter::lte(total.clone(), Value::from(120)), &row()).unwrap());
        assert!(evaluate(&Filter::between(Path::untyped("items"), Value::from(1), Value::from(3)), &row()).unwrap());
        assert!(evaluate(&Filter::is_null(Path::untyped("note")), &row()).unwrap());
        assert!(!evaluate(&Filter::eq(Path::untyped("note"), Value::from(1)), &row()).unwrap());
        assert!(evaluate(&Filter::in_list(Path::untyped("items"), vec![1, 3]), &row()).unwrap());
    }

    #[test]
    fn test_evaluate_string_match() {
        let status = Path::new("status", ValueType::String);
        assert!(!evaluate(&Filter::starts_with(status.clone(), "op"), &row()).unwrap());
        assert!(evaluate(&Filter::starts_with(status.clone(), "op").ignore_case(), &row()).unwrap());
        assert!(evaluate(&Filter::eq(Function::lower(status), Value::from("open")), &row()).unwrap());
    }

    #[test]
    fn test_unknown_property() {
        let err = evaluate(&Filter::is_null(Path::untyped("missing")), &row()).unwrap_err();
        assert_eq!(err, EvalError::UnknownProperty("missing".into()));
    }

    #[test]
    fn test_rebind_in_binding_order() {
        let filter = Filter::and([
            Filter::in_list(Path::untyped("items"), vec![1, 2]),
            Filter::between(Path::untyped("total"), Value::from(10), Value::from(20)),
        ]);
        let values: Vec<Value> = [7, 8, 9, 10].into_iter().map(Value::from).collect();
        let rebound = rebind(&filter, &values, '!').unwrap();
        assert_eq!(
            rebound,
            Filter::and([
                Filter::in_list(Path::untyped("items"), vec![7, 8]),
                Filter::between(Path::untyped("total"), Value::from(9), Value::from(10)),
            ])
        );
        assert_eq!(
            rebind(&filter, &values[..3], '!').unwrap_err(),
            EvalError::ParameterCount { used: 4, bound: 3 }
        );
    }

    #[test]
    fn test_rebind_unwraps_like_patterns() {
        let name = Path::new("name", ValueType::String).with_parent(Path::untyped("customer"));
        let filter = Filter::contains(name.clone(), "50% Off_");
        let rebound = rebind(&filter, &[Value::from("%50!% Off!_%")], '!').unwrap();
        assert_eq!(rebound, Filter::contains(name, "50% Off_"));
        assert!(evaluate(&rebound, &row()).unwrap());

        let err = rebind(&Filter::starts_with(Path::untyped("x"), "a"), &[Value::from("a")], '!');
        assert!(matches!(err, Err(EvalError::MalformedPattern(_))));
    }
}
