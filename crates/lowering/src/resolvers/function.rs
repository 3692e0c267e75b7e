// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use unified_query_ir::{ExpressionKind, ExpressionRef};

use crate::context::ResolutionContext;
use crate::error::ResolveResult;
use crate::registry::{OutputKind, Resolved, Resolver, ResolverRegistry};

/// Renders function calls with the platform's spelling
#[derive(Debug, Default, Clone, Copy)]
pub struct FunctionResolver;

impl Resolver for FunctionResolver {
    fn name(&self) -> &str {
        "function"
    }

    fn input_kind(&self) -> ExpressionKind {
        ExpressionKind::Function
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
        let ExpressionRef::Function(function) = expr else {
            return Ok(None);
        };
        let args = function
            .args
            .iter()
            .map(|arg| registry.resolve_fragment(arg, ctx))
            .collect::<ResolveResult<Vec<_>>>()?;
        let text = ctx
            .dialect()
            .render_function(function.kind, &args, function.distinct)?;
        Ok(Some(Resolved::Fragment(text)))
    }
}
