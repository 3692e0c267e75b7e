// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Query composition
//!
//! [`QueryComposition`] drives the resolvers for one `SELECT` in a fixed
//! order and assembles the clauses:
//!
//! ```text
//! target ─▶ filter ─▶ aggregation ─▶ sort ─▶ projection ─▶ assemble
//! ```
//!
//! Only the target and projection stages are mandatory. Skipping optional
//! stages is fine, going back is not: a stage called after a later one is
//! a [`ResolveError::Build`]. The target must be bound first because every
//! other stage refers to its alias.
//!
//! [`WriteComposition`] is the bulk `UPDATE` / `DELETE` counterpart.
//! [`compose_operation`] dispatches an [`Operation`] to one of the two.

use std::fmt;

use tracing::debug;
use unified_query_ir::{
    Aggregation, Expression, Filter, Operation, OperationKind, Path, Projection, Sort, Target,
    Validate, Value,
};

use crate::context::{AliasMode, ResolutionContext};
use crate::converter::ProjectionContext;
use crate::error::{ResolveError, ResolveResult};
use crate::registry::ResolverRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Stage {
    Start,
    Target,
    Filter,
    Aggregation,
    Sort,
    Projection,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::Target => "target",
            Stage::Filter => "filter",
            Stage::Aggregation => "aggregation",
            Stage::Sort => "sort",
            Stage::Projection => "projection",
        };
        f.write_str(name)
    }
}

/// Assembled `SELECT`
#[derive(Debug, Clone)]
pub struct ComposedQuery {
    pub text: String,
    pub projection: ProjectionContext,
}

/// Staged builder for a `SELECT` statement
pub struct QueryComposition<'c, 'a> {
    registry: &'c ResolverRegistry,
    ctx: &'c mut ResolutionContext<'a>,
    stage: Stage,
    distinct: bool,
    from: Option<String>,
    filter: Option<String>,
    group_by: Option<String>,
    order_by: Option<String>,
    projection: Option<ProjectionContext>,
}

impl<'c, 'a> QueryComposition<'c, 'a> {
    pub fn new(registry: &'c ResolverRegistry, ctx: &'c mut ResolutionContext<'a>) -> Self {
        Self {
            registry,
            ctx,
            stage: Stage::Start,
            distinct: false,
            from: None,
            filter: None,
            group_by: None,
            order_by: None,
            projection: None,
        }
    }

    fn advance(&mut self, next: Stage) -> ResolveResult<()> {
        if next <= self.stage {
            return Err(ResolveError::Build(format!(
                "{} stage requested after {} stage",
                next, self.stage
            )));
        }
        if self.stage == Stage::Start && next != Stage::Target {
            return Err(ResolveError::Build(format!(
                "{} stage requested before the target is bound",
                next
            )));
        }
        self.stage = next;
        Ok(())
    }

    pub fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    /// Bind the target and its joins
    pub fn target(mut self, target: &Target) -> ResolveResult<Self> {
        self.advance(Stage::Target)?;
        self.from = Some(self.registry.resolve_fragment(target, self.ctx)?);
        Ok(self)
    }

    /// Add the `WHERE` condition; an empty `And`/`Or` is rejected
    pub fn filter(mut self, filter: &Filter) -> ResolveResult<Self> {
        self.advance(Stage::Filter)?;
        let condition = self
            .registry
            .resolve_predicate(filter, self.ctx)?
            .ok_or(ResolveError::EmptyPredicate)?;
        self.filter = Some(condition);
        Ok(self)
    }

    pub fn aggregation(mut self, aggregation: &Aggregation) -> ResolveResult<Self> {
        self.advance(Stage::Aggregation)?;
        self.group_by = Some(self.registry.resolve_fragment(aggregation, self.ctx)?);
        Ok(self)
    }

    pub fn sort(mut self, sort: &Sort) -> ResolveResult<Self> {
        self.advance(Stage::Sort)?;
        self.order_by = Some(self.registry.resolve_fragment(sort, self.ctx)?);
        Ok(self)
    }

    pub fn projection(mut self, projection: &Projection) -> ResolveResult<Self> {
        self.advance(Stage::Projection)?;
        self.projection = Some(self.registry.resolve_projection(projection, self.ctx)?);
        Ok(self)
    }

    /// Join the resolved clauses into statement text
    pub fn assemble(self) -> ResolveResult<ComposedQuery> {
        let from = self
            .from
            .filter(|from| !from.trim().is_empty())
            .ok_or_else(|| ResolveError::Build("from clause is empty".to_string()))?;
        let projection = self
            .projection
            .filter(|projection| !projection.selections.is_empty())
            .ok_or_else(|| ResolveError::Build("select list is empty".to_string()))?;

        let mut text = String::from("SELECT ");
        if self.distinct {
            text.push_str("DISTINCT ");
        }
        text.push_str(&projection.select_list());
        text.push_str(" FROM ");
        text.push_str(&from);
        if let Some(filter) = &self.filter {
            text.push_str(" WHERE ");
            text.push_str(filter);
        }
        for clause in [&self.group_by, &self.order_by].into_iter().flatten() {
            text.push(' ');
            text.push_str(clause);
        }
        Ok(ComposedQuery { text, projection })
    }
}

/// Staged builder for bulk `UPDATE` and `DELETE`
///
/// The target is bound without joins. Assignment values that are already
/// parameter references (`:name`) are copied verbatim; everything else goes
/// through the resolvers with the assigned path's type as hint.
pub struct WriteComposition<'c, 'a> {
    registry: &'c ResolverRegistry,
    ctx: &'c mut ResolutionContext<'a>,
    kind: OperationKind,
    declaration: Option<String>,
    assignments: Vec<String>,
    filter: Option<String>,
}

impl<'c, 'a> WriteComposition<'c, 'a> {
    pub fn new(
        registry: &'c ResolverRegistry,
        ctx: &'c mut ResolutionContext<'a>,
        kind: OperationKind,
    ) -> ResolveResult<Self> {
        match kind {
            OperationKind::Update | OperationKind::Delete => Ok(Self {
                registry,
                ctx,
                kind,
                declaration: None,
                assignments: Vec::new(),
                filter: None,
            }),
            OperationKind::Insert => Err(ResolveError::unsupported(
                "bulk insert",
                ctx.dialect().platform(),
            )),
            OperationKind::Select => Err(ResolveError::Build(
                "select passed to a write composition".to_string(),
            )),
        }
    }

    pub fn target(mut self, target: &Target) -> ResolveResult<Self> {
        if self.declaration.is_some() {
            return Err(ResolveError::Build("target bound twice".to_string()));
        }
        if !target.joins.is_empty() {
            return Err(ResolveError::unsupported(
                format!("joins in bulk {:?}", self.kind).to_lowercase(),
                self.ctx.dialect().platform(),
            ));
        }
        let binding = self.ctx.bind_target(target)?;
        self.declaration = Some(match &binding.alias {
            Some(alias) => format!("{} {}", binding.entity, alias),
            None => binding.entity,
        });
        Ok(self)
    }

    /// Add `path=value` to the `SET` list
    pub fn set(mut self, path: &Path, value: &Expression) -> ResolveResult<Self> {
        if self.declaration.is_none() {
            return Err(ResolveError::Build(
                "assignment before the target is bound".to_string(),
            ));
        }
        if self.filter.is_some() {
            return Err(ResolveError::Build("assignment after the filter".to_string()));
        }
        let registry = self.registry;
        let column = registry.resolve_fragment(path, self.ctx)?;
        let dialect = self.ctx.dialect();
        let value_text = match value {
            Expression::Constant(Value::String(text)) if dialect.is_parameter_reference(text) => {
                text.clone()
            }
            _ => self.ctx.with_value_hint(path.value_type.clone(), |ctx| {
                registry.resolve_fragment(value, ctx)
            })?,
        };
        self.assignments.push(format!("{}={}", column, value_text));
        Ok(self)
    }

    pub fn filter(mut self, filter: &Filter) -> ResolveResult<Self> {
        if self.declaration.is_none() {
            return Err(ResolveError::Build(
                "filter before the target is bound".to_string(),
            ));
        }
        let condition = self
            .registry
            .resolve_predicate(filter, self.ctx)?
            .ok_or(ResolveError::EmptyPredicate)?;
        self.filter = Some(condition);
        Ok(self)
    }

    pub fn assemble(self) -> ResolveResult<String> {
        let declaration = self
            .declaration
            .ok_or_else(|| ResolveError::Build("target clause is empty".to_string()))?;
        let mut text = match self.kind {
            OperationKind::Update => {
                if self.assignments.is_empty() {
                    return Err(ResolveError::Build("update sets no values".to_string()));
                }
                format!("UPDATE {} SET {}", declaration, self.assignments.join(", "))
            }
            _ => format!("DELETE FROM {}", declaration),
        };
        if let Some(filter) = &self.filter {
            text.push_str(" WHERE ");
            text.push_str(filter);
        }
        Ok(text)
    }
}

/// Resolved statement text plus the projection of a `SELECT`
#[derive(Debug, Clone)]
pub struct ComposedStatement {
    pub text: String,
    /// `None` for write statements
    pub projection: Option<ProjectionContext>,
}

/// Compose any operation in a fresh root context
///
/// Selects without a projection return the whole root entity.
pub fn compose_operation(
    operation: &Operation,
    registry: &ResolverRegistry,
    ctx: &mut ResolutionContext<'_>,
) -> ResolveResult<ComposedStatement> {
    if !ctx.is_root() {
        return Err(ResolveError::Build(
            "operations are composed in a root context".to_string(),
        ));
    }
    operation.validate()?;

    let statement = match operation.kind {
        OperationKind::Select => {
            let mut composition = QueryComposition::new(registry, ctx)
                .distinct(operation.distinct)
                .target(&operation.target)?;
            if let Some(filter) = &operation.filter {
                composition = composition.filter(filter)?;
            }
            if let Some(aggregation) = &operation.aggregation {
                composition = composition.aggregation(aggregation)?;
            }
            if let Some(sort) = &operation.sort {
                composition = composition.sort(sort)?;
            }
            let default_projection = Projection::entity();
            let projection = operation.projection.as_ref().unwrap_or(&default_projection);
            let composed = composition.projection(projection)?.assemble()?;
            ComposedStatement {
                text: composed.text,
                projection: Some(composed.projection),
            }
        }
        kind => {
            let mut composition = WriteComposition::new(registry, ctx, kind)?.target(&operation.target)?;
            for (path, value) in &operation.values {
                composition = composition.set(path, value)?;
            }
            if let Some(filter) = &operation.filter {
                composition = composition.filter(filter)?;
            }
            ComposedStatement {
                text: composition.assemble()?,
                projection: None,
            }
        }
    };

    debug!(kind = ?operation.kind, text = %statement.text, "Composed statement");
    Ok(statement)
}

/// Alias mode for a statement kind
///
/// Writes fall back to `Unsupported` when the platform cannot alias the
/// target of a bulk update or delete.
pub fn alias_mode_for(kind: OperationKind, mode: AliasMode, write_alias_supported: bool) -> AliasMode {
    if kind.is_write() && !write_alias_supported {
        AliasMode::Unsupported
    } else {
        mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use unified_query_ir::{Function, Platform, ValueType};

    fn select_ctx(dialect: &Dialect) -> ResolutionContext<'_> {
        ResolutionContext::new(dialect, AliasMode::Auto)
    }

    #[test]
    fn test_full_select() {
        let dialect = Dialect::new(Platform::Hibernate);
        let registry = ResolverRegistry::new();
        let mut ctx = select_ctx(&dialect);
        let composed = QueryComposition::new(&registry, &mut ctx)
            .distinct(true)
            .target(&Target::new("Order"))
            .and_then(|c| c.filter(&Filter::eq(Path::new("status", ValueType::String), Value::from("open"))))
            .and_then(|c| c.aggregation(&Aggregation::group_by([Expression::from(Path::untyped("region"))])))
            .and_then(|c| c.sort(&Sort::new().asc(Path::untyped("region"))))
            .and_then(|c| {
                c.projection(&Projection::Function(Function::count(Path::untyped("id"))))
            })
            .and_then(QueryComposition::assemble)
            .unwrap();
        assert_eq!(
            composed.text,
            "SELECT DISTINCT count(orde_0_0.id) FROM Order orde_0_0 WHERE orde_0_0.status=:p0001 \
             GROUP BY orde_0_0.region ORDER BY orde_0_0.region ASC"
        );
    }

    #[test]
    fn test_stage_order_enforced() {
        let dialect = Dialect::default();
        let registry = ResolverRegistry::new();
        let mut ctx = select_ctx(&dialect);
        let result = QueryComposition::new(&registry, &mut ctx)
            .target(&Target::new("Order"))
            .and_then(|c| c.sort(&Sort::new().asc(Path::untyped("id"))))
            .and_then(|c| c.filter(&Filter::is_null(Path::untyped("id"))));
        assert!(matches!(result, Err(ResolveError::Build(_))));

        let mut ctx = select_ctx(&dialect);
        let result = QueryComposition::new(&registry, &mut ctx).projection(&Projection::CountAll);
        assert!(matches!(result, Err(ResolveError::Build(_))));
    }

    #[test]
    fn test_missing_clauses() {
        let dialect = Dialect::default();
        let registry = ResolverRegistry::new();
        let mut ctx = select_ctx(&dialect);
        let err = QueryComposition::new(&registry, &mut ctx)
            .target(&Target::new("Order"))
            .and_then(QueryComposition::assemble)
            .unwrap_err();
        assert_eq!(err, ResolveError::Build("select list is empty".to_string()));

        let mut ctx = select_ctx(&dialect);
        let err = QueryComposition::new(&registry, &mut ctx).assemble().unwrap_err();
        assert_eq!(err, ResolveError::Build("from clause is empty".to_string()));
    }

    #[test]
    fn test_top_level_empty_predicate() {
        let dialect = Dialect::default();
        let registry = ResolverRegistry::new();
        let mut ctx = select_ctx(&dialect);
        let err = QueryComposition::new(&registry, &mut ctx)
            .target(&Target::new("Order"))
            .and_then(|c| c.filter(&Filter::and([])))
            .err();
        assert_eq!(err, Some(ResolveError::EmptyPredicate));
    }

    #[test]
    fn test_update() {
        let dialect = Dialect::new(Platform::Hibernate);
        let registry = ResolverRegistry::new();
        let mut ctx = ResolutionContext::new(&dialect, AliasMode::Auto);
        let operation = Operation::update(Target::new("Order"))
            .set(Path::new("status", ValueType::String), Value::from("closed"))
            .set(Path::new("version", ValueType::Integer), Value::from(":version"))
            .with_filter(Filter::lt(Path::new("total", ValueType::Decimal), Value::from(0)));
        let composed = compose_operation(&operation, &registry, &mut ctx).unwrap();
        assert_eq!(
            composed.text,
            "UPDATE Order orde_0_0 SET orde_0_0.status=:p0001, orde_0_0.version=:version \
             WHERE orde_0_0.total<:p0002"
        );
        assert!(composed.projection.is_none());
        assert_eq!(ctx.parameters().get("p0002").unwrap().value_type, ValueType::Decimal);
    }

    #[test]
    fn test_delete_without_alias() {
        let dialect = Dialect::new(Platform::DataNucleus);
        let registry = ResolverRegistry::new();
        let mut ctx = ResolutionContext::new(&dialect, AliasMode::Unsupported);
        let operation = Operation::delete(Target::new("Session"))
            .with_filter(Filter::is_null(Path::untyped("user")));
        let composed = compose_operation(&operation, &registry, &mut ctx).unwrap();
        assert_eq!(composed.text, "DELETE FROM Session WHERE user IS NULL");
    }

    #[test]
    fn test_write_errors() {
        let dialect = Dialect::default();
        let registry = ResolverRegistry::new();

        let mut ctx = ResolutionContext::new(&dialect, AliasMode::Auto);
        let err = compose_operation(&Operation::insert(Target::new("A")), &registry, &mut ctx).unwrap_err();
        assert!(err.is_unsupported());

        let mut ctx = ResolutionContext::new(&dialect, AliasMode::Auto);
        let err = compose_operation(&Operation::update(Target::new("A")), &registry, &mut ctx).unwrap_err();
        assert_eq!(err, ResolveError::Build("update sets no values".to_string()));

        let mut ctx = ResolutionContext::new(&dialect, AliasMode::Auto);
        let joined = Target::new("A").inner_join(Target::new("B"), Filter::and([]));
        let err = compose_operation(&Operation::delete(joined), &registry, &mut ctx).unwrap_err();
        assert!(err.is_unsupported());
    }

    #[test]
    fn test_select_defaults_to_entity() {
        let dialect = Dialect::new(Platform::Hibernate);
        let registry = ResolverRegistry::new();
        let mut ctx = ResolutionContext::new(&dialect, AliasMode::Auto);
        let composed = compose_operation(&Operation::select(Target::new("Order")), &registry, &mut ctx).unwrap();
        assert_eq!(composed.text, "SELECT orde_0_0 FROM Order orde_0_0");
    }

    #[test]
    fn test_alias_mode_for_writes() {
        assert_eq!(
            alias_mode_for(OperationKind::Delete, AliasMode::Auto, false),
            AliasMode::Unsupported
        );
        assert_eq!(
            alias_mode_for(OperationKind::Delete, AliasMode::Auto, true),
            AliasMode::Auto
        );
        assert_eq!(
            alias_mode_for(OperationKind::Select, AliasMode::Default, false),
            AliasMode::Default
        );
    }
}
