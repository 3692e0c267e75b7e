// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Operations
//!
//! An [`Operation`] is the top-level unit handed to the compiler. It is
//! anchored on a [`Target`] and carries the optional filter, grouping,
//! ordering and projection of a read, or the assignments of a write.
//!
//! ## Structure
//!
//! ```text
//! Operation
//! ├── kind          Select | Update | Delete | Insert
//! ├── target        Target ── joins: [Join { Target, on: Filter }]
//! ├── filter        Filter
//! ├── aggregation   group by + having
//! ├── sort          [(expression, direction)]
//! ├── projection    Projection (defaults to the whole root entity)
//! ├── values        [(Path, Expression)] for updates
//! └── limit/offset, distinct, lock mode, hints
//! ```
//!
//! A [`SubQuery`] is a reduced operation (target, filter, projection) that
//! can be used as an operand or inside `EXISTS`. Its `correlations` list
//! the parent targets it reads, which must be bound in an enclosing scope.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::InvalidExpression;
use crate::expr::{Expression, Path, Validate, is_identifier};
use crate::filter::Filter;
use crate::projection::Projection;

/// Join kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinType {
    Inner,
    Left,
    Right,
}

impl JoinType {
    pub fn keyword(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
        }
    }
}

/// A named logical relation and the relations joined to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Logical name, resolved to an entity through the catalog
    pub name: String,
    /// Explicit physical entity, bypassing the catalog
    pub entity: Option<String>,
    /// Explicit identification variable
    pub alias: Option<String>,
    pub joins: Vec<Join>,
}

impl Target {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity: None,
            alias: None,
            joins: Vec::new(),
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn join(mut self, join_type: JoinType, target: Target, on: Option<Filter>) -> Self {
        self.joins.push(Join {
            join_type,
            target,
            on,
        });
        self
    }

    pub fn inner_join(self, target: Target, on: Filter) -> Self {
        self.join(JoinType::Inner, target, Some(on))
    }

    pub fn left_join(self, target: Target, on: Filter) -> Self {
        self.join(JoinType::Left, target, Some(on))
    }

    /// Total number of targets in this join graph, including self
    pub fn target_count(&self) -> usize {
        1 + self
            .joins
            .iter()
            .map(|join| join.target.target_count())
            .sum::<usize>()
    }
}

impl Validate for Target {
    fn validate(&self) -> Result<(), InvalidExpression> {
        if self.name.trim().is_empty() {
            return Err(InvalidExpression::new("target", "target name is empty"));
        }
        if self.name.chars().any(char::is_whitespace) {
            return Err(InvalidExpression::new(
                "target",
                format!("target name '{}' contains whitespace", self.name),
            ));
        }
        if let Some(alias) = &self.alias {
            if !is_identifier(alias) {
                return Err(InvalidExpression::new(
                    "target",
                    format!("alias '{}' is not a valid identifier", alias),
                ));
            }
        }
        for join in &self.joins {
            join.target.validate()?;
            if let Some(on) = &join.on {
                on.validate()?;
            }
        }
        Ok(())
    }
}

/// A joined relation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    pub join_type: JoinType,
    pub target: Target,
    pub on: Option<Filter>,
}

/// Ordering direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortItem {
    pub expression: Expression,
    pub direction: SortDirection,
}

/// Ordered list of sort keys
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Sort {
    pub items: Vec<SortItem>,
}

impl Sort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn asc(mut self, expression: impl Into<Expression>) -> Self {
        self.items.push(SortItem {
            expression: expression.into(),
            direction: SortDirection::Asc,
        });
        self
    }

    pub fn desc(mut self, expression: impl Into<Expression>) -> Self {
        self.items.push(SortItem {
            expression: expression.into(),
            direction: SortDirection::Desc,
        });
        self
    }
}

impl Validate for Sort {
    fn validate(&self) -> Result<(), InvalidExpression> {
        if self.items.is_empty() {
            return Err(InvalidExpression::new("sort", "no sort keys"));
        }
        for item in &self.items {
            if !item.expression.is_operand() || item.expression.as_constant().is_some() {
                return Err(InvalidExpression::new(
                    "sort",
                    format!("cannot sort by a {}", item.expression.kind()),
                ));
            }
            item.expression.validate()?;
        }
        Ok(())
    }
}

/// Group-by keys and an optional having filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub group_by: Vec<Expression>,
    pub having: Option<Filter>,
}

impl Aggregation {
    pub fn group_by(keys: impl IntoIterator<Item = Expression>) -> Self {
        Self {
            group_by: keys.into_iter().collect(),
            having: None,
        }
    }

    pub fn having(mut self, filter: Filter) -> Self {
        self.having = Some(filter);
        self
    }
}

impl Validate for Aggregation {
    fn validate(&self) -> Result<(), InvalidExpression> {
        if self.group_by.is_empty() {
            return Err(InvalidExpression::new("aggregation", "no group-by keys"));
        }
        for key in &self.group_by {
            if !key.is_operand() || key.as_constant().is_some() {
                return Err(InvalidExpression::new(
                    "aggregation",
                    format!("cannot group by a {}", key.kind()),
                ));
            }
            key.validate()?;
        }
        match &self.having {
            Some(having) => having.validate(),
            None => Ok(()),
        }
    }
}

/// Nested query usable as an operand or inside `EXISTS`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubQuery {
    pub target: Target,
    pub filter: Option<Filter>,
    pub projection: Projection,
    /// Names or aliases of enclosing targets referenced by this query
    pub correlations: Vec<String>,
}

impl SubQuery {
    pub fn new(target: Target, projection: Projection) -> Self {
        Self {
            target,
            filter: None,
            projection,
            correlations: Vec::new(),
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn correlated_with(mut self, target: impl Into<String>) -> Self {
        self.correlations.push(target.into());
        self
    }
}

impl Validate for SubQuery {
    fn validate(&self) -> Result<(), InvalidExpression> {
        self.target.validate()?;
        if let Some(filter) = &self.filter {
            filter.validate()?;
        }
        if self.projection.is_multi_valued() {
            return Err(InvalidExpression::new(
                "sub-query",
                "a sub-query must select a single value",
            ));
        }
        self.projection.validate()
    }
}

/// Statement kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    #[default]
    Select,
    Update,
    Delete,
    /// Row-level insert; has no bulk statement form
    Insert,
}

impl OperationKind {
    pub fn is_write(&self) -> bool {
        !matches!(self, OperationKind::Select)
    }
}

/// Locking hint passed through to the executor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockMode {
    #[default]
    None,
    Optimistic,
    PessimisticRead,
    PessimisticWrite,
}

/// Top-level data operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub kind: OperationKind,
    pub target: Target,
    pub filter: Option<Filter>,
    pub aggregation: Option<Aggregation>,
    pub sort: Option<Sort>,
    /// Defaults to the whole root entity
    pub projection: Option<Projection>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub distinct: bool,
    /// Assignments of an update
    pub values: Vec<(Path, Expression)>,
    pub lock_mode: LockMode,
    /// Free-form executor hints, passed through unchanged
    pub hints: BTreeMap<String, String>,
}

impl Operation {
    fn new(kind: OperationKind, target: Target) -> Self {
        Self {
            kind,
            target,
            filter: None,
            aggregation: None,
            sort: None,
            projection: None,
            limit: None,
            offset: None,
            distinct: false,
            values: Vec::new(),
            lock_mode: LockMode::None,
            hints: BTreeMap::new(),
        }
    }

    pub fn select(target: Target) -> Self {
        Self::new(OperationKind::Select, target)
    }

    pub fn update(target: Target) -> Self {
        Self::new(OperationKind::Update, target)
    }

    pub fn delete(target: Target) -> Self {
        Self::new(OperationKind::Delete, target)
    }

    pub fn insert(target: Target) -> Self {
        Self::new(OperationKind::Insert, target)
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = Some(aggregation);
        self
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Add an update assignment
    pub fn set(mut self, path: Path, value: impl Into<Expression>) -> Self {
        self.values.push((path, value.into()));
        self
    }

    pub fn with_lock_mode(mut self, lock_mode: LockMode) -> Self {
        self.lock_mode = lock_mode;
        self
    }

    pub fn with_hint(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.hints.insert(name.into(), value.into());
        self
    }
}

impl Validate for Operation {
    fn validate(&self) -> Result<(), InvalidExpression> {
        self.target.validate()?;
        if let Some(filter) = &self.filter {
            filter.validate()?;
        }
        if let Some(aggregation) = &self.aggregation {
            aggregation.validate()?;
        }
        if let Some(sort) = &self.sort {
            sort.validate()?;
        }
        if let Some(projection) = &self.projection {
            projection.validate()?;
        }
        if self.kind != OperationKind::Update && !self.values.is_empty() {
            return Err(InvalidExpression::new(
                "operation",
                format!("assignments are only allowed on updates, not {:?}", self.kind),
            ));
        }
        for (path, value) in &self.values {
            path.validate()?;
            if !value.is_operand() {
                return Err(InvalidExpression::new(
                    "operation",
                    format!("assigned value for '{}' is not a value", path.full_name()),
                ));
            }
            value.validate()?;
        }
        Ok(())
    }
}
