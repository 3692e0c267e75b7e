// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Predicate rendering
//!
//! | Filter                 | Text                                   |
//! |------------------------|----------------------------------------|
//! | `IsNull` / `IsNotNull` | `x IS NULL` / `x IS NOT NULL`          |
//! | `Compare`              | `x=:p0001`, `x<>:p0001`, `x>=:p0001`   |
//! | `Between`              | `x BETWEEN :p0001 AND :p0002`          |
//! | `In` / `NotIn`         | `x IN (:p0001,:p0002)`, `x NOT IN (…)` |
//! | `StringMatch`          | `lower(x) LIKE :p0001 ESCAPE '!'`      |
//! | `And` / `Or`           | `(a) AND (b)`                          |
//! | `Not`                  | `NOT (a)`                              |
//! | `Exists` / `NotExists` | `EXISTS (SELECT …)`                    |
//!
//! Constants on the right of a comparison are bound with the static type of
//! the left operand.

use unified_query_ir::{
    CompareOp, Expression, ExpressionKind, ExpressionRef, Filter, FunctionKind, InvalidExpression,
    MatchMode, SubQuery, Value, ValueType,
};

use crate::context::ResolutionContext;
use crate::dialect::shared;
use crate::error::{ResolveError, ResolveResult};
use crate::registry::{OutputKind, Resolved, Resolver, ResolverRegistry};

#[derive(Debug, Default, Clone, Copy)]
pub struct FilterResolver;

impl Resolver for FilterResolver {
    fn name(&self) -> &str {
        "filter"
    }

    fn input_kind(&self) -> ExpressionKind {
        ExpressionKind::Filter
    }

    fn output_kind(&self) -> OutputKind {
        OutputKind::Fragment
    }

    fn resolve(
        &self,
        expr: ExpressionRef<'_>,
        ctx: &mut ResolutionContext<'_>,
        registry: &ResolverRegistry,
    ) -> ResolveResult<Option<Resolved>> {
        let ExpressionRef::Filter(filter) = expr else {
            return Ok(None);
        };
        if filter.is_empty_junction() {
            return Ok(Some(Resolved::EmptyPredicate));
        }
        let text = FilterWriter { ctx, registry }.write(filter)?;
        Ok(Some(Resolved::Fragment(text)))
    }
}

struct FilterWriter<'c, 'a, 'r> {
    ctx: &'c mut ResolutionContext<'a>,
    registry: &'r ResolverRegistry,
}

impl FilterWriter<'_, '_, '_> {
    fn write(&mut self, filter: &Filter) -> ResolveResult<String> {
        match filter {
            Filter::IsNull(expr) => Ok(format!("{} IS NULL", self.operand(expr)?)),
            Filter::IsNotNull(expr) => Ok(format!("{} IS NOT NULL", self.operand(expr)?)),
            Filter::Compare { left, op, right } => self.compare(left, *op, right),
            Filter::Between { expr, from, to } => {
                let text = self.operand(expr)?;
                let hint = expr.value_type();
                let from = self.typed_operand(from, &hint)?;
                let to = self.typed_operand(to, &hint)?;
                Ok(format!("{} BETWEEN {} AND {}", text, from, to))
            }
            Filter::In { left, right } => self.membership(left, right, "IN"),
            Filter::NotIn { left, right } => self.membership(left, right, "NOT IN"),
            Filter::StringMatch {
                left,
                value,
                mode,
                ignore_case,
            } => self.string_match(left, value, *mode, *ignore_case),
            Filter::And(children) => self.junction(children, "AND"),
            Filter::Or(children) => self.junction(children, "OR"),
            Filter::Not(inner) => Ok(format!("NOT ({})", self.child(inner)?)),
            Filter::Exists(query) => Ok(format!("EXISTS ({})", self.subquery(query)?)),
            Filter::NotExists(query) => Ok(format!("NOT EXISTS ({})", self.subquery(query)?)),
        }
    }

    /// Operand text; sub-queries are parenthesized
    fn operand(&mut self, expr: &Expression) -> ResolveResult<String> {
        let text = self.registry.resolve_fragment(expr, self.ctx)?;
        Ok(match expr {
            Expression::SubQuery(_) => format!("({})", text),
            _ => text,
        })
    }

    fn typed_operand(&mut self, expr: &Expression, hint: &ValueType) -> ResolveResult<String> {
        let registry = self.registry;
        let text = self
            .ctx
            .with_value_hint(hint.clone(), |ctx| registry.resolve_fragment(expr, ctx))?;
        Ok(match expr {
            Expression::SubQuery(_) => format!("({})", text),
            _ => text,
        })
    }

    fn compare(&mut self, left: &Expression, op: CompareOp, right: &Expression) -> ResolveResult<String> {
        let left_text = self.operand(left)?;
        let right_text = self.typed_operand(right, &left.value_type())?;
        Ok(format!("{}{}{}", left_text, op.symbol(), right_text))
    }

    fn membership(&mut self, left: &Expression, right: &Expression, keyword: &str) -> ResolveResult<String> {
        let left_text = self.operand(left)?;
        let registry = self.registry;
        let hint = left.value_type();
        // Both a list and a sub-query render bare here
        let right_text = self
            .ctx
            .with_value_hint(hint, |ctx| registry.resolve_fragment(right, ctx))?;
        Ok(format!("{} {} ({})", left_text, keyword, right_text))
    }

    fn string_match(
        &mut self,
        left: &Expression,
        value: &Expression,
        mode: MatchMode,
        ignore_case: bool,
    ) -> ResolveResult<String> {
        let Some(raw) = value.as_constant().and_then(Value::as_str) else {
            return Err(InvalidExpression::new("filter", "string match has no right operand").into());
        };

        let mut left_text = self.operand(left)?;
        let dialect = self.ctx.dialect();
        let mut escaped = dialect.escape_like(raw);
        if ignore_case {
            escaped = escaped.to_lowercase();
            left_text = dialect.render_function(FunctionKind::Lower, &[left_text], false)?;
        }
        let pattern = shared::wrap_wildcards(&escaped, mode);
        let parameter = self.ctx.bind_parameter(Value::String(pattern), ValueType::String);
        Ok(format!(
            "{} LIKE {} {}",
            left_text,
            parameter,
            dialect.escape_clause()
        ))
    }

    fn junction(&mut self, children: &[Filter], keyword: &str) -> ResolveResult<String> {
        let parts = children
            .iter()
            .map(|child| self.child(child))
            .collect::<ResolveResult<Vec<_>>>()?;
        Ok(shared::join_parenthesized(&parts, keyword))
    }

    /// Nested predicate; an empty composition cannot be dropped here
    fn child(&mut self, filter: &Filter) -> ResolveResult<String> {
        self.registry
            .resolve_predicate(filter, self.ctx)?
            .ok_or(ResolveError::EmptyPredicate)
    }

    fn subquery(&mut self, query: &SubQuery) -> ResolveResult<String> {
        self.registry.resolve_fragment(query, self.ctx)
    }
}
