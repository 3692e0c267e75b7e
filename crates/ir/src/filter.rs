// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Filters
//!
//! [`Filter`] is the boolean predicate tree of an operation. Leaves compare
//! operand expressions; `And`/`Or`/`Not` compose sub-filters, and
//! `Exists`/`NotExists` test a correlated sub-query.
//!
//! ## Validation
//!
//! A filter rejects:
//! - the null constant as a comparison operand (use `IsNull`/`IsNotNull`)
//! - an empty `IN` list
//! - a string match whose value is not a non-null string constant
//! - non-value operands (e.g. a sort on the left of `=`)
//!
//! `And`/`Or` with zero children are structurally valid; resolving one
//! yields an empty predicate, which the composition builder rejects.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::InvalidExpression;
use crate::expr::{Expression, Validate};
use crate::operation::SubQuery;
use crate::value::Value;

/// Ordering/equality operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Equal,
    NotEqual,
    Greater { inclusive: bool },
    Less { inclusive: bool },
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Equal => "=",
            CompareOp::NotEqual => "<>",
            CompareOp::Greater { inclusive: false } => ">",
            CompareOp::Greater { inclusive: true } => ">=",
            CompareOp::Less { inclusive: false } => "<",
            CompareOp::Less { inclusive: true } => "<=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Where wildcards go in a string match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    Contains,
    StartsWith,
    EndsWith,
}

/// Boolean predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    IsNull(Expression),
    IsNotNull(Expression),
    Compare {
        left: Expression,
        op: CompareOp,
        right: Expression,
    },
    Between {
        expr: Expression,
        from: Expression,
        to: Expression,
    },
    /// Right side is a list constant or a sub-query
    In {
        left: Expression,
        right: Expression,
    },
    NotIn {
        left: Expression,
        right: Expression,
    },
    StringMatch {
        left: Expression,
        value: Expression,
        mode: MatchMode,
        ignore_case: bool,
    },
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Exists(Box<SubQuery>),
    NotExists(Box<SubQuery>),
}

impl Filter {
    fn compare(left: impl Into<Expression>, op: CompareOp, right: impl Into<Expression>) -> Self {
        Filter::Compare {
            left: left.into(),
            op,
            right: right.into(),
        }
    }

    pub fn eq(left: impl Into<Expression>, right: impl Into<Expression>) -> Self {
        Self::compare(left, CompareOp::Equal, right)
    }

    pub fn ne(left: impl Into<Expression>, right: impl Into<Expression>) -> Self {
        Self::compare(left, CompareOp::NotEqual, right)
    }

    pub fn gt(left: impl Into<Expression>, right: impl Into<Expression>) -> Self {
        Self::compare(left, CompareOp::Greater { inclusive: false }, right)
    }

    pub fn gte(left: impl Into<Expression>, right: impl Into<Expression>) -> Self {
        Self::compare(left, CompareOp::Greater { inclusive: true }, right)
    }

    pub fn lt(left: impl Into<Expression>, right: impl Into<Expression>) -> Self {
        Self::compare(left, CompareOp::Less { inclusive: false }, right)
    }

    pub fn lte(left: impl Into<Expression>, right: impl Into<Expression>) -> Self {
        Self::compare(left, CompareOp::Less { inclusive: true }, right)
    }

    pub fn is_null(expr: impl Into<Expression>) -> Self {
        Filter::IsNull(expr.into())
    }

    pub fn is_not_null(expr: impl Into<Expression>) -> Self {
        Filter::IsNotNull(expr.into())
    }

    pub fn between(
        expr: impl Into<Expression>,
        from: impl Into<Expression>,
        to: impl Into<Expression>,
    ) -> Self {
        Filter::Between {
            expr: expr.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    /// `left IN (values...)`
    pub fn in_list(left: impl Into<Expression>, values: impl Into<Value>) -> Self {
        Filter::In {
            left: left.into(),
            right: Expression::Constant(values.into()),
        }
    }

    pub fn not_in(left: impl Into<Expression>, values: impl Into<Value>) -> Self {
        Filter::NotIn {
            left: left.into(),
            right: Expression::Constant(values.into()),
        }
    }

    /// `left IN (SELECT ...)`
    pub fn in_query(left: impl Into<Expression>, query: SubQuery) -> Self {
        Filter::In {
            left: left.into(),
            right: Expression::SubQuery(Box::new(query)),
        }
    }

    fn string_match(left: impl Into<Expression>, value: &str, mode: MatchMode) -> Self {
        Filter::StringMatch {
            left: left.into(),
            value: Expression::constant(value),
            mode,
            ignore_case: false,
        }
    }

    pub fn contains(left: impl Into<Expression>, value: &str) -> Self {
        Self::string_match(left, value, MatchMode::Contains)
    }

    pub fn starts_with(left: impl Into<Expression>, value: &str) -> Self {
        Self::string_match(left, value, MatchMode::StartsWith)
    }

    pub fn ends_with(left: impl Into<Expression>, value: &str) -> Self {
        Self::string_match(left, value, MatchMode::EndsWith)
    }

    /// Make a string match case-insensitive; no-op on other variants
    pub fn ignore_case(mut self) -> Self {
        if let Filter::StringMatch { ignore_case, .. } = &mut self {
            *ignore_case = true;
        }
        self
    }

    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::And(filters.into_iter().collect())
    }

    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::Or(filters.into_iter().collect())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(filter: Filter) -> Self {
        Filter::Not(Box::new(filter))
    }

    pub fn exists(query: SubQuery) -> Self {
        Filter::Exists(Box::new(query))
    }

    pub fn not_exists(query: SubQuery) -> Self {
        Filter::NotExists(Box::new(query))
    }

    /// `And`/`Or` without children
    pub fn is_empty_junction(&self) -> bool {
        matches!(self, Filter::And(children) | Filter::Or(children) if children.is_empty())
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            Filter::IsNull(_) => "is-null",
            Filter::IsNotNull(_) => "is-not-null",
            Filter::Compare { .. } => "compare",
            Filter::Between { .. } => "between",
            Filter::In { .. } => "in",
            Filter::NotIn { .. } => "not-in",
            Filter::StringMatch { .. } => "string-match",
            Filter::And(_) => "and",
            Filter::Or(_) => "or",
            Filter::Not(_) => "not",
            Filter::Exists(_) => "exists",
            Filter::NotExists(_) => "not-exists",
        }
    }
}

fn invalid(reason: impl Into<String>) -> InvalidExpression {
    InvalidExpression::new("filter", reason)
}

fn check_operand(expr: &Expression, role: &str) -> Result<(), InvalidExpression> {
    if !expr.is_operand() {
        return Err(invalid(format!("{} operand is a {}, not a value", role, expr.kind())));
    }
    if matches!(expr, Expression::Constant(Value::Null)) {
        return Err(invalid(format!("{} operand is the null constant", role)));
    }
    expr.validate()
}

fn check_membership(left: &Expression, right: &Expression) -> Result<(), InvalidExpression> {
    check_operand(left, "left")?;
    match right {
        Expression::Constant(Value::List(items)) => {
            if items.is_empty() {
                return Err(invalid("IN list is empty"));
            }
            if items.iter().any(Value::is_null) {
                return Err(invalid("IN list contains null"));
            }
            Ok(())
        }
        Expression::Constant(Value::Null) => Err(invalid("IN operand is the null constant")),
        Expression::Constant(_) => Ok(()),
        Expression::SubQuery(query) => query.validate(),
        other => check_operand(other, "right"),
    }
}

impl Validate for Filter {
    fn validate(&self) -> Result<(), InvalidExpression> {
        match self {
            Filter::IsNull(expr) | Filter::IsNotNull(expr) => {
                if !expr.is_operand() {
                    return Err(invalid(format!("null test on a {}", expr.kind())));
                }
                expr.validate()
            }
            Filter::Compare { left, right, .. } => {
                check_operand(left, "left")?;
                check_operand(right, "right")?;
                if matches!(right, Expression::Constant(Value::List(_))) {
                    return Err(invalid("comparison against a list, use IN"));
                }
                Ok(())
            }
            Filter::Between { expr, from, to } => {
                check_operand(expr, "between")?;
                check_operand(from, "lower bound")?;
                check_operand(to, "upper bound")
            }
            Filter::In { left, right } | Filter::NotIn { left, right } => {
                check_membership(left, right)
            }
            Filter::StringMatch { left, value, .. } => {
                check_operand(left, "left")?;
                match value {
                    Expression::Constant(Value::String(_)) => Ok(()),
                    Expression::Constant(Value::Null) => {
                        Err(invalid("string match has no right operand"))
                    }
                    _ => Err(invalid("string match value must be a string constant")),
                }
            }
            Filter::And(children) | Filter::Or(children) => {
                children.iter().try_for_each(Validate::validate)
            }
            Filter::Not(child) => child.validate(),
            Filter::Exists(query) | Filter::NotExists(query) => query.validate(),
        }
    }
}
