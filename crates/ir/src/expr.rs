// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Expressions
//!
//! This module defines the closed set of expression nodes understood by the
//! resolver chain, plus one extension variant for user-defined nodes.
//!
//! ## Design
//!
//! - [`Expression`] owns its sub-trees and is what callers build.
//! - [`ExpressionRef`] is a borrowed view over any node, so the resolver
//!   chain can recurse into a filter's children without cloning them.
//! - [`ExpressionKind`] is the dispatch key used by the resolver registry.
//!   Built-in kinds are enum variants; custom kinds are keyed by [`TypeId`].
//!
//! ## Paths
//!
//! [`Path`] is a dotted logical name with a static [`ValueType`]:
//!
//! ```text
//! address.city        -- Path("city") with parent Path("address")
//! o.total             -- Path("total") qualified by target "o"
//! ```
//!
//! Every node implements [`Validate`] and rejects structurally invalid data
//! before any resolver sees it.

use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::error::InvalidExpression;
use crate::filter::Filter;
use crate::function::Function;
use crate::operation::{Aggregation, Sort, SubQuery, Target};
use crate::projection::Projection;
use crate::value::{Value, ValueType};

/// Self-validation contract shared by every IR node
pub trait Validate {
    /// Fail fast on structurally invalid state
    fn validate(&self) -> Result<(), InvalidExpression>;
}

/// An expression node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    /// Property path (e.g. `name`, `address.city`)
    Path(Path),

    /// Constant value, bound as a named parameter
    Constant(Value),

    /// Scalar or aggregate function call
    Function(Function),

    /// Nested query used as an operand
    SubQuery(Box<SubQuery>),

    /// Boolean predicate
    Filter(Box<Filter>),

    /// Result ordering
    Sort(Sort),

    /// Grouping keys and having filter
    Aggregation(Box<Aggregation>),

    /// What each result row holds
    Projection(Box<Projection>),

    /// Query target with its joins
    Target(Box<Target>),

    /// User-defined node, resolved only by registered resolvers
    #[serde(skip)]
    Custom(CustomNode),
}

impl Expression {
    /// Shorthand for a constant expression
    pub fn constant(value: impl Into<Value>) -> Self {
        Expression::Constant(value.into())
    }

    pub fn kind(&self) -> ExpressionKind {
        self.view().kind()
    }

    pub fn view(&self) -> ExpressionRef<'_> {
        ExpressionRef::from(self)
    }

    /// Whether the node can appear as an operand of a predicate or function
    pub fn is_operand(&self) -> bool {
        matches!(
            self,
            Expression::Path(_)
                | Expression::Constant(_)
                | Expression::Function(_)
                | Expression::SubQuery(_)
                | Expression::Custom(_)
        )
    }

    /// Static type of the value this expression produces
    pub fn value_type(&self) -> ValueType {
        match self {
            Expression::Path(path) => path.value_type.clone(),
            Expression::Constant(value) => value.value_type(),
            Expression::Function(function) => function.result_type(),
            Expression::SubQuery(query) => query.projection.value_type(),
            Expression::Custom(node) => node.value_type(),
            _ => ValueType::Any,
        }
    }

    /// Return the constant value if this is a constant
    pub fn as_constant(&self) -> Option<&Value> {
        match self {
            Expression::Constant(value) => Some(value),
            _ => None,
        }
    }
}

impl Validate for Expression {
    fn validate(&self) -> Result<(), InvalidExpression> {
        self.view().validate()
    }
}

impl From<Path> for Expression {
    fn from(path: Path) -> Self {
        Expression::Path(path)
    }
}

impl From<Value> for Expression {
    fn from(value: Value) -> Self {
        Expression::Constant(value)
    }
}

impl From<Function> for Expression {
    fn from(function: Function) -> Self {
        Expression::Function(function)
    }
}

impl From<SubQuery> for Expression {
    fn from(query: SubQuery) -> Self {
        Expression::SubQuery(Box::new(query))
    }
}

impl From<Filter> for Expression {
    fn from(filter: Filter) -> Self {
        Expression::Filter(Box::new(filter))
    }
}

impl From<Aggregation> for Expression {
    fn from(aggregation: Aggregation) -> Self {
        Expression::Aggregation(Box::new(aggregation))
    }
}

impl From<CustomNode> for Expression {
    fn from(node: CustomNode) -> Self {
        Expression::Custom(node)
    }
}

/// Borrowed view over any expression node
#[derive(Debug, Clone, Copy)]
pub enum ExpressionRef<'a> {
    Path(&'a Path),
    Constant(&'a Value),
    Function(&'a Function),
    SubQuery(&'a SubQuery),
    Filter(&'a Filter),
    Sort(&'a Sort),
    Aggregation(&'a Aggregation),
    Projection(&'a Projection),
    Target(&'a Target),
    Custom(&'a CustomNode),
}

impl<'a> ExpressionRef<'a> {
    pub fn kind(&self) -> ExpressionKind {
        match self {
            ExpressionRef::Path(_) => ExpressionKind::Path,
            ExpressionRef::Constant(_) => ExpressionKind::Constant,
            ExpressionRef::Function(_) => ExpressionKind::Function,
            ExpressionRef::SubQuery(_) => ExpressionKind::SubQuery,
            ExpressionRef::Filter(_) => ExpressionKind::Filter,
            ExpressionRef::Sort(_) => ExpressionKind::Sort,
            ExpressionRef::Aggregation(_) => ExpressionKind::Aggregation,
            ExpressionRef::Projection(_) => ExpressionKind::Projection,
            ExpressionRef::Target(_) => ExpressionKind::Target,
            ExpressionRef::Custom(node) => node.kind(),
        }
    }

    pub fn validate(&self) -> Result<(), InvalidExpression> {
        match self {
            ExpressionRef::Path(path) => path.validate(),
            ExpressionRef::Constant(_) => Ok(()),
            ExpressionRef::Function(function) => function.validate(),
            ExpressionRef::SubQuery(query) => query.validate(),
            ExpressionRef::Filter(filter) => filter.validate(),
            ExpressionRef::Sort(sort) => sort.validate(),
            ExpressionRef::Aggregation(aggregation) => aggregation.validate(),
            ExpressionRef::Projection(projection) => projection.validate(),
            ExpressionRef::Target(target) => target.validate(),
            ExpressionRef::Custom(node) => node.validate(),
        }
    }
}

impl<'a> From<&'a Expression> for ExpressionRef<'a> {
    fn from(expression: &'a Expression) -> Self {
        match expression {
            Expression::Path(path) => ExpressionRef::Path(path),
            Expression::Constant(value) => ExpressionRef::Constant(value),
            Expression::Function(function) => ExpressionRef::Function(function),
            Expression::SubQuery(query) => ExpressionRef::SubQuery(query),
            Expression::Filter(filter) => ExpressionRef::Filter(filter),
            Expression::Sort(sort) => ExpressionRef::Sort(sort),
            Expression::Aggregation(aggregation) => ExpressionRef::Aggregation(aggregation),
            Expression::Projection(projection) => ExpressionRef::Projection(projection),
            Expression::Target(target) => ExpressionRef::Target(target),
            Expression::Custom(node) => ExpressionRef::Custom(node),
        }
    }
}

macro_rules! expression_ref_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl<'a> From<&'a $ty> for ExpressionRef<'a> {
                fn from(node: &'a $ty) -> Self {
                    ExpressionRef::$variant(node)
                }
            }
        )*
    };
}

expression_ref_from! {
    Path => Path,
    Value => Constant,
    Function => Function,
    SubQuery => SubQuery,
    Filter => Filter,
    Sort => Sort,
    Aggregation => Aggregation,
    Projection => Projection,
    Target => Target,
    CustomNode => Custom,
}

/// Dispatch key of an expression node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpressionKind {
    Path,
    Constant,
    Function,
    SubQuery,
    Filter,
    Sort,
    Aggregation,
    Projection,
    Target,
    /// User-defined node type
    Custom { type_id: TypeId, name: &'static str },
}

impl ExpressionKind {
    /// Kind key for a custom node type
    pub fn custom<T: CustomExpression>(name: &'static str) -> Self {
        ExpressionKind::Custom {
            type_id: TypeId::of::<T>(),
            name,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExpressionKind::Path => "path",
            ExpressionKind::Constant => "constant",
            ExpressionKind::Function => "function",
            ExpressionKind::SubQuery => "sub-query",
            ExpressionKind::Filter => "filter",
            ExpressionKind::Sort => "sort",
            ExpressionKind::Aggregation => "aggregation",
            ExpressionKind::Projection => "projection",
            ExpressionKind::Target => "target",
            ExpressionKind::Custom { name, .. } => name,
        }
    }
}

impl fmt::Display for ExpressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A dotted logical property name with a static value type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path {
    /// Final name segment (may itself be dotted)
    pub name: String,

    /// Static type of the values held by this path
    pub value_type: ValueType,

    /// Enclosing path for embedded/composite fields
    pub parent: Option<Box<Path>>,

    /// Name or alias of the data target this path belongs to
    pub target: Option<String>,

    /// Explicit selection alias
    pub alias: Option<String>,
}

impl Path {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            parent: None,
            target: None,
            alias: None,
        }
    }

    /// Path whose type is not known statically
    pub fn untyped(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Any)
    }

    pub fn with_parent(mut self, parent: Path) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    /// Qualify the path with the target it belongs to
    pub fn of_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Full dotted name including parent segments
    pub fn full_name(&self) -> String {
        match &self.parent {
            Some(parent) => format!("{}.{}", parent.full_name(), self.name),
            None => self.name.clone(),
        }
    }

    /// Target qualifier of the outermost path in the chain
    pub fn target_qualifier(&self) -> Option<&str> {
        match &self.parent {
            Some(parent) => parent.target_qualifier().or(self.target.as_deref()),
            None => self.target.as_deref(),
        }
    }
}

impl Validate for Path {
    fn validate(&self) -> Result<(), InvalidExpression> {
        if self.name.is_empty() {
            return Err(InvalidExpression::new("path", "path name is empty"));
        }
        if self.name.chars().any(char::is_whitespace) {
            return Err(InvalidExpression::new(
                "path",
                format!("path name '{}' contains whitespace", self.name),
            ));
        }
        if self.name.split('.').any(str::is_empty) {
            return Err(InvalidExpression::new(
                "path",
                format!("path name '{}' has an empty segment", self.name),
            ));
        }
        if let Some(alias) = &self.alias {
            if !is_identifier(alias) {
                return Err(InvalidExpression::new(
                    "path",
                    format!("alias '{}' is not a valid identifier", alias),
                ));
            }
        }
        match &self.parent {
            Some(parent) => parent.validate(),
            None => Ok(()),
        }
    }
}

/// Whether `s` can be used verbatim as an alias or identification variable
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Contract for user-defined expression nodes
pub trait CustomExpression: fmt::Debug + Send + Sync + 'static {
    /// Human readable kind name, used in error messages
    fn kind_name(&self) -> &'static str;

    fn validate(&self) -> Result<(), InvalidExpression> {
        Ok(())
    }

    fn value_type(&self) -> ValueType {
        ValueType::Any
    }

    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to a user-defined expression node
#[derive(Clone)]
pub struct CustomNode(Arc<dyn CustomExpression>);

impl CustomNode {
    pub fn new<T: CustomExpression>(node: T) -> Self {
        Self(Arc::new(node))
    }

    pub fn kind(&self) -> ExpressionKind {
        ExpressionKind::Custom {
            type_id: self.0.as_any().type_id(),
            name: self.0.kind_name(),
        }
    }

    pub fn validate(&self) -> Result<(), InvalidExpression> {
        self.0.validate()
    }

    pub fn value_type(&self) -> ValueType {
        self.0.value_type()
    }

    pub fn downcast_ref<T: CustomExpression>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }
}

impl fmt::Debug for CustomNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CustomNode").field(&self.0).finish()
    }
}

impl PartialEq for CustomNode {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Coalesce;

    impl CustomExpression for Coalesce {
        fn kind_name(&self) -> &'static str {
            "coalesce"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_path_full_name() {
        let city = Path::new("city", ValueType::String).with_parent(Path::untyped("address"));
        assert_eq!(city.full_name(), "address.city");
        assert!(city.target_qualifier().is_none());

        let qualified = Path::untyped("total")
            .with_parent(Path::untyped("order").of_target("o"));
        assert_eq!(qualified.target_qualifier(), Some("o"));
    }

    #[test]
    fn test_path_validation() {
        assert!(Path::untyped("key").validate().is_ok());
        assert!(Path::untyped("").validate().is_err());
        assert!(Path::untyped("a b").validate().is_err());
        assert!(Path::untyped("a..b").validate().is_err());
        assert!(Path::untyped("a").with_alias("1x").validate().is_err());
    }

    #[test]
    fn test_custom_kind_uses_type_identity() {
        let node = CustomNode::new(Coalesce);
        assert_eq!(node.kind(), ExpressionKind::custom::<Coalesce>("coalesce"));
        assert!(node.downcast_ref::<Coalesce>().is_some());
        assert_eq!(Expression::from(node).kind().name(), "coalesce");
    }

    #[test]
    fn test_operand_classification() {
        assert!(Expression::from(Path::untyped("a")).is_operand());
        assert!(Expression::constant(1).is_operand());
        assert!(!Expression::from(Filter::is_null(Path::untyped("a"))).is_operand());
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("a_0_0"));
        assert!(is_identifier("_x"));
        assert!(!is_identifier("0a"));
        assert!(!is_identifier("a-b"));
        assert!(!is_identifier(""));
    }
}
