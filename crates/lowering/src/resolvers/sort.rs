// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use unified_query_ir::{ExpressionKind, ExpressionRef};

use crate::context::ResolutionContext;
use crate::error::ResolveResult;
use crate::registry::{OutputKind, Resolved, Resolver, ResolverRegistry};

/// `ORDER BY a ASC, b DESC`
#[derive(Debug, Default, Clone, Copy)]
pub struct SortResolver;

impl Resolver for SortResolver {
    fn name(&self) -> &str {
        "sort"
    }

    fn input_kind(&self) -> ExpressionKind {
        ExpressionKind::Sort
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
        let ExpressionRef::Sort(sort) = expr else {
            return Ok(None);
        };
        let items = sort
            .items
            .iter()
            .map(|item| {
                let text = registry.resolve_fragment(&item.expression, ctx)?;
                Ok(format!("{} {}", text, item.direction.keyword()))
            })
            .collect::<ResolveResult<Vec<_>>>()?;
        Ok(Some(Resolved::Fragment(format!("ORDER BY {}", items.join(", ")))))
    }
}
