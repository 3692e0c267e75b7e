// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Function calls
//!
//! Functions are identified by a closed [`FunctionKind`]. How a kind is
//! spelled on a given platform is decided by the function registry, never
//! by the node itself.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::InvalidExpression;
use crate::expr::{Expression, Validate};
use crate::value::ValueType;

/// Function identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum FunctionKind {
    Count,
    Sum,
    Avg,
    Min,
    Max,
    Lower,
    Upper,
    Year,
    Month,
    Day,
    Hour,
    CurrentDate,
    CurrentTime,
    CurrentTimestamp,
}

impl FunctionKind {
    pub const ALL: [FunctionKind; 14] = [
        FunctionKind::Count,
        FunctionKind::Sum,
        FunctionKind::Avg,
        FunctionKind::Min,
        FunctionKind::Max,
        FunctionKind::Lower,
        FunctionKind::Upper,
        FunctionKind::Year,
        FunctionKind::Month,
        FunctionKind::Day,
        FunctionKind::Hour,
        FunctionKind::CurrentDate,
        FunctionKind::CurrentTime,
        FunctionKind::CurrentTimestamp,
    ];

    pub fn is_aggregate(&self) -> bool {
        matches!(
            self,
            FunctionKind::Count
                | FunctionKind::Sum
                | FunctionKind::Avg
                | FunctionKind::Min
                | FunctionKind::Max
        )
    }

    /// Number of arguments the function takes
    pub fn arity(&self) -> usize {
        match self {
            FunctionKind::CurrentDate | FunctionKind::CurrentTime | FunctionKind::CurrentTimestamp => 0,
            _ => 1,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FunctionKind::Count => "count",
            FunctionKind::Sum => "sum",
            FunctionKind::Avg => "avg",
            FunctionKind::Min => "min",
            FunctionKind::Max => "max",
            FunctionKind::Lower => "lower",
            FunctionKind::Upper => "upper",
            FunctionKind::Year => "year",
            FunctionKind::Month => "month",
            FunctionKind::Day => "day",
            FunctionKind::Hour => "hour",
            FunctionKind::CurrentDate => "current_date",
            FunctionKind::CurrentTime => "current_time",
            FunctionKind::CurrentTimestamp => "current_timestamp",
        }
    }
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A function call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub kind: FunctionKind,
    pub args: Vec<Expression>,
    /// `DISTINCT` modifier, only meaningful for aggregates
    pub distinct: bool,
}

impl Function {
    pub fn new(kind: FunctionKind, args: Vec<Expression>) -> Self {
        Self {
            kind,
            args,
            distinct: false,
        }
    }

    pub fn count(arg: impl Into<Expression>) -> Self {
        Self::new(FunctionKind::Count, vec![arg.into()])
    }

    pub fn count_distinct(arg: impl Into<Expression>) -> Self {
        Self::count(arg).with_distinct()
    }

    pub fn sum(arg: impl Into<Expression>) -> Self {
        Self::new(FunctionKind::Sum, vec![arg.into()])
    }

    pub fn avg(arg: impl Into<Expression>) -> Self {
        Self::new(FunctionKind::Avg, vec![arg.into()])
    }

    pub fn min(arg: impl Into<Expression>) -> Self {
        Self::new(FunctionKind::Min, vec![arg.into()])
    }

    pub fn max(arg: impl Into<Expression>) -> Self {
        Self::new(FunctionKind::Max, vec![arg.into()])
    }

    pub fn lower(arg: impl Into<Expression>) -> Self {
        Self::new(FunctionKind::Lower, vec![arg.into()])
    }

    pub fn upper(arg: impl Into<Expression>) -> Self {
        Self::new(FunctionKind::Upper, vec![arg.into()])
    }

    pub fn year(arg: impl Into<Expression>) -> Self {
        Self::new(FunctionKind::Year, vec![arg.into()])
    }

    pub fn month(arg: impl Into<Expression>) -> Self {
        Self::new(FunctionKind::Month, vec![arg.into()])
    }

    pub fn day(arg: impl Into<Expression>) -> Self {
        Self::new(FunctionKind::Day, vec![arg.into()])
    }

    pub fn hour(arg: impl Into<Expression>) -> Self {
        Self::new(FunctionKind::Hour, vec![arg.into()])
    }

    pub fn current_date() -> Self {
        Self::new(FunctionKind::CurrentDate, Vec::new())
    }

    pub fn current_time() -> Self {
        Self::new(FunctionKind::CurrentTime, Vec::new())
    }

    pub fn current_timestamp() -> Self {
        Self::new(FunctionKind::CurrentTimestamp, Vec::new())
    }

    pub fn with_distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Static type of the function result
    pub fn result_type(&self) -> ValueType {
        let arg_type = || {
            self.args
                .first()
                .map(Expression::value_type)
                .unwrap_or(ValueType::Any)
        };
        match self.kind {
            FunctionKind::Count => ValueType::Integer,
            FunctionKind::Avg => ValueType::Float,
            FunctionKind::Sum | FunctionKind::Min | FunctionKind::Max => arg_type(),
            FunctionKind::Lower | FunctionKind::Upper => ValueType::String,
            FunctionKind::Year | FunctionKind::Month | FunctionKind::Day | FunctionKind::Hour => {
                ValueType::Integer
            }
            FunctionKind::CurrentDate => ValueType::Date,
            FunctionKind::CurrentTime => ValueType::Time,
            FunctionKind::CurrentTimestamp => ValueType::DateTime,
        }
    }
}

impl Validate for Function {
    fn validate(&self) -> Result<(), InvalidExpression> {
        if self.args.len() != self.kind.arity() {
            return Err(InvalidExpression::new(
                "function",
                format!(
                    "{} expects {} argument(s), got {}",
                    self.kind,
                    self.kind.arity(),
                    self.args.len()
                ),
            ));
        }
        if self.distinct && !self.kind.is_aggregate() {
            return Err(InvalidExpression::new(
                "function",
                format!("DISTINCT is not allowed on {}", self.kind),
            ));
        }
        for arg in &self.args {
            if !arg.is_operand() {
                return Err(InvalidExpression::new(
                    "function",
                    format!("{} argument of {} is not a value", arg.kind(), self.kind),
                ));
            }
            arg.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Path;

    #[test]
    fn test_arity_validation() {
        assert!(Function::count(Path::untyped("id")).validate().is_ok());
        assert!(Function::current_date().validate().is_ok());

        let bad = Function::new(FunctionKind::Year, Vec::new());
        let err = bad.validate().unwrap_err();
        assert!(err.reason.contains("expects 1"));
    }

    #[test]
    fn test_distinct_only_on_aggregates() {
        assert!(Function::count_distinct(Path::untyped("id")).validate().is_ok());
        assert!(
            Function::lower(Path::untyped("name"))
                .with_distinct()
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_result_type() {
        assert_eq!(Function::count(Path::untyped("id")).result_type(), ValueType::Integer);
        assert_eq!(
            Function::max(Path::new("price", ValueType::Decimal)).result_type(),
            ValueType::Decimal
        );
        assert_eq!(Function::current_timestamp().result_type(), ValueType::DateTime);
    }
}
