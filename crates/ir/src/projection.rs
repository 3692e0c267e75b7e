// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Projections: what a read operation returns
//!
//! The node only states *what* is selected. The selection fragments, the
//! row shape and the result converter are produced during resolution.

use serde::{Deserialize, Serialize};

use crate::error::InvalidExpression;
use crate::expr::{Expression, Path, Validate, is_identifier};
use crate::function::Function;
use crate::value::{Value, ValueType};

/// One named item of a [`Projection::Properties`] selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionItem {
    /// Name under which the value appears in the converted record
    pub name: String,
    pub expression: Expression,
}

impl ProjectionItem {
    pub fn new(name: impl Into<String>, expression: impl Into<Expression>) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
        }
    }
}

/// What each result row holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    /// Single property value
    Path(Path),

    /// Single function value
    Function(Function),

    /// Constant value, inlined into the select list
    Constant(Value),

    /// Whole entity of the named target (the root target when `None`)
    Target { name: Option<String> },

    /// Named set of properties, converted into a record
    Properties(Vec<ProjectionItem>),

    /// Every attribute of the root target, as listed by the catalog
    SelectAll,

    /// Number of matching rows
    CountAll,
}

impl Projection {
    /// Whole entity of the root target
    pub fn entity() -> Self {
        Projection::Target { name: None }
    }

    pub fn properties(items: impl IntoIterator<Item = ProjectionItem>) -> Self {
        Projection::Properties(items.into_iter().collect())
    }

    /// Static type of a single-valued projection, `Any` otherwise
    pub fn value_type(&self) -> ValueType {
        match self {
            Projection::Path(path) => path.value_type.clone(),
            Projection::Function(function) => function.result_type(),
            Projection::Constant(value) => value.value_type(),
            Projection::CountAll => ValueType::Integer,
            _ => ValueType::Any,
        }
    }

    /// Whether rows have more than one column
    pub fn is_multi_valued(&self) -> bool {
        matches!(self, Projection::Properties(_) | Projection::SelectAll)
    }
}

impl Validate for Projection {
    fn validate(&self) -> Result<(), InvalidExpression> {
        match self {
            Projection::Path(path) => path.validate(),
            Projection::Function(function) => function.validate(),
            Projection::Constant(Value::List(_)) => Err(InvalidExpression::new(
                "projection",
                "a list cannot be projected as a constant",
            )),
            Projection::Properties(items) => {
                if items.is_empty() {
                    return Err(InvalidExpression::new("projection", "property list is empty"));
                }
                for (i, item) in items.iter().enumerate() {
                    if !is_identifier(&item.name) {
                        return Err(InvalidExpression::new(
                            "projection",
                            format!("item name '{}' is not a valid identifier", item.name),
                        ));
                    }
                    if items[..i].iter().any(|prev| prev.name == item.name) {
                        return Err(InvalidExpression::new(
                            "projection",
                            format!("duplicate item name '{}'", item.name),
                        ));
                    }
                    if !item.expression.is_operand() {
                        return Err(InvalidExpression::new(
                            "projection",
                            format!("item '{}' is not a value", item.name),
                        ));
                    }
                    item.expression.validate()?;
                }
                Ok(())
            }
            Projection::Target { name: Some(name) } if name.is_empty() => Err(
                InvalidExpression::new("projection", "target name is empty"),
            ),
            _ => Ok(()),
        }
    }
}
