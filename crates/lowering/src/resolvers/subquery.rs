// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use tracing::trace;
use unified_query_ir::{ExpressionKind, ExpressionRef};

use crate::compose::QueryComposition;
use crate::context::{AliasMode, ResolutionContext};
use crate::error::ResolveResult;
use crate::registry::{OutputKind, Resolved, Resolver, ResolverRegistry};

/// Composes a nested `SELECT` in a child scope
///
/// The text is returned without parentheses; the enclosing predicate adds
/// them. Correlated targets must already be bound in an enclosing scope.
#[derive(Debug, Default, Clone, Copy)]
pub struct SubQueryResolver;

impl Resolver for SubQueryResolver {
    fn name(&self) -> &str {
        "sub-query"
    }

    fn input_kind(&self) -> ExpressionKind {
        ExpressionKind::SubQuery
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
        let ExpressionRef::SubQuery(query) = expr else {
            return Ok(None);
        };
        // A sub-query may always alias its own targets
        let mode = match ctx.alias_mode() {
            AliasMode::Unsupported => AliasMode::Auto,
            mode => mode,
        };
        let text = ctx.with_child(mode, |ctx| {
            for correlation in &query.correlations {
                ctx.target_alias(correlation)?;
            }
            let mut composition = QueryComposition::new(registry, ctx).target(&query.target)?;
            if let Some(filter) = &query.filter {
                composition = composition.filter(filter)?;
            }
            composition.projection(&query.projection)?.assemble()
        })?;
        trace!(sub_query = %text.text, "Composed sub-query");
        Ok(Some(Resolved::Fragment(text.text)))
    }
}
