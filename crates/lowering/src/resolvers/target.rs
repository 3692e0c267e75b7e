// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use unified_query_ir::{ExpressionKind, ExpressionRef, PlatformCapability, Target};

use crate::context::{AliasMode, ResolutionContext, TargetBinding};
use crate::error::{ResolveError, ResolveResult};
use crate::registry::{OutputKind, Resolved, Resolver, ResolverRegistry};

/// Binds a target and its joins, producing the range declaration
///
/// ```text
/// Order orde_0_0 LEFT JOIN Customer cust_0_1 ON orde_0_0.customerId=cust_0_1.id
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct TargetResolver;

fn declaration(binding: &TargetBinding) -> String {
    match &binding.alias {
        Some(alias) => format!("{} {}", binding.entity, alias),
        None => binding.entity.clone(),
    }
}

fn write_joins(
    target: &Target,
    ctx: &mut ResolutionContext<'_>,
    registry: &ResolverRegistry,
    text: &mut String,
) -> ResolveResult<()> {
    for join in &target.joins {
        let dialect = ctx.dialect();
        if !dialect.supports(PlatformCapability::EntityJoins) || ctx.alias_mode() == AliasMode::Unsupported {
            return Err(ResolveError::unsupported(
                format!("{} of {}", join.join_type.keyword(), join.target.name),
                dialect.platform(),
            ));
        }

        let binding = ctx.bind_target(&join.target)?;
        if binding.alias.is_none() {
            return Err(ResolveError::MissingContextState(format!(
                "joined target {} has no alias",
                join.target.name
            )));
        }
        text.push(' ');
        text.push_str(join.join_type.keyword());
        text.push(' ');
        text.push_str(&declaration(&binding));

        if let Some(on) = &join.on {
            let condition = registry
                .resolve_predicate(on, ctx)?
                .ok_or(ResolveError::EmptyPredicate)?;
            text.push_str(" ON ");
            text.push_str(&condition);
        }
        write_joins(&join.target, ctx, registry, text)?;
    }
    Ok(())
}

impl Resolver for TargetResolver {
    fn name(&self) -> &str {
        "target"
    }

    fn input_kind(&self) -> ExpressionKind {
        ExpressionKind::Target
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
        let ExpressionRef::Target(target) = expr else {
            return Ok(None);
        };
        let root = ctx.bind_target(target)?;
        let mut text = declaration(&root);
        write_joins(target, ctx, registry, &mut text)?;
        Ok(Some(Resolved::Fragment(text)))
    }
}
