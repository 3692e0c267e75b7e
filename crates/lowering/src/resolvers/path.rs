// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use unified_query_ir::{ExpressionKind, ExpressionRef, Path};

use crate::context::ResolutionContext;
use crate::error::ResolveResult;
use crate::registry::{OutputKind, Resolved, Resolver, ResolverRegistry};

/// `alias.full.name`, or the bare name when the target has no alias
#[derive(Debug, Default, Clone, Copy)]
pub struct PathResolver;

/// Render a path against the targets bound in `ctx`
///
/// A qualified path must name a bound target; an unqualified one belongs to
/// the root target of the current scope. Qualifying with an unaliased target
/// of an enclosing scope is unsupported.
pub fn render_path(path: &Path, ctx: &ResolutionContext<'_>) -> ResolveResult<String> {
    let full_name = path.full_name();
    let alias = match path.target_qualifier() {
        Some(qualifier) => ctx.path_qualifier(qualifier)?,
        None => ctx.current_target().and_then(|binding| binding.alias.clone()),
    };
    Ok(match alias {
        Some(alias) => format!("{}.{}", alias, full_name),
        None => full_name,
    })
}

impl Resolver for PathResolver {
    fn name(&self) -> &str {
        "path"
    }

    fn input_kind(&self) -> ExpressionKind {
        ExpressionKind::Path
    }

    fn output_kind(&self) -> OutputKind {
        OutputKind::Fragment
    }

    fn resolve(
        &self,
        expr: ExpressionRef<'_>,
        ctx: &mut ResolutionContext<'_>,
        _registry: &ResolverRegistry,
    ) -> ResolveResult<Option<Resolved>> {
        let ExpressionRef::Path(path) = expr else {
            return Ok(None);
        };
        render_path(path, ctx).map(|text| Some(Resolved::Fragment(text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AliasMode;
    use crate::dialect::Dialect;
    use crate::error::ResolveError;
    use unified_query_ir::{Target, ValueType};

    #[test]
    fn test_unqualified_path_uses_root_alias() {
        let dialect = Dialect::default();
        let mut ctx = ResolutionContext::new(&dialect, AliasMode::Auto);
        ctx.bind_target(&Target::new("Customer")).unwrap();
        let city = Path::new("city", ValueType::String).with_parent(Path::untyped("address"));
        assert_eq!(render_path(&city, &ctx).unwrap(), "cust_0_0.address.city");
    }

    #[test]
    fn test_qualified_path() {
        let dialect = Dialect::default();
        let mut ctx = ResolutionContext::new(&dialect, AliasMode::Auto);
        ctx.bind_target(&Target::new("Customer")).unwrap();
        ctx.bind_target(&Target::new("Order").with_alias("o")).unwrap();
        let total = Path::untyped("total").of_target("Order");
        assert_eq!(render_path(&total, &ctx).unwrap(), "o.total");

        let ghost = Path::untyped("x").of_target("Ghost");
        assert!(matches!(
            render_path(&ghost, &ctx),
            Err(ResolveError::MissingContextState(_))
        ));
    }

    #[test]
    fn test_unaliased_outer_target() {
        let dialect = Dialect::default();
        let mut ctx = ResolutionContext::new(&dialect, AliasMode::Unsupported);
        ctx.bind_target(&Target::new("Customer")).unwrap();
        assert_eq!(
            render_path(&Path::untyped("id").of_target("Customer"), &ctx).unwrap(),
            "id"
        );

        let err = ctx
            .with_child(AliasMode::Auto, |ctx| {
                ctx.bind_target(&Target::new("Blocked"))?;
                render_path(&Path::untyped("id").of_target("Customer"), ctx)
            })
            .unwrap_err();
        assert!(err.is_unsupported());
    }

    #[test]
    fn test_path_without_alias() {
        let dialect = Dialect::default();
        let mut ctx = ResolutionContext::new(&dialect, AliasMode::Unsupported);
        ctx.bind_target(&Target::new("Customer")).unwrap();
        assert_eq!(render_path(&Path::untyped("name"), &ctx).unwrap(), "name");
    }
}
