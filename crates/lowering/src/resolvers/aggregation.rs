// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use unified_query_ir::{ExpressionKind, ExpressionRef};

use crate::context::ResolutionContext;
use crate::error::{ResolveError, ResolveResult};
use crate::registry::{OutputKind, Resolved, Resolver, ResolverRegistry};

/// `GROUP BY a, b HAVING ...`
///
/// An empty having filter is a [`ResolveError::EmptyPredicate`].
#[derive(Debug, Default, Clone, Copy)]
pub struct AggregationResolver;

impl Resolver for AggregationResolver {
    fn name(&self) -> &str {
        "aggregation"
    }

    fn input_kind(&self) -> ExpressionKind {
        ExpressionKind::Aggregation
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
        let ExpressionRef::Aggregation(aggregation) = expr else {
            return Ok(None);
        };
        let keys = aggregation
            .group_by
            .iter()
            .map(|key| registry.resolve_fragment(key, ctx))
            .collect::<ResolveResult<Vec<_>>>()?;
        let mut text = format!("GROUP BY {}", keys.join(", "));
        if let Some(having) = &aggregation.having {
            let condition = registry
                .resolve_predicate(having, ctx)?
                .ok_or(ResolveError::EmptyPredicate)?;
            text.push_str(" HAVING ");
            text.push_str(&condition);
        }
        Ok(Some(Resolved::Fragment(text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AliasMode;
    use crate::dialect::Dialect;
    use unified_query_ir::{Aggregation, Expression, Filter, Function, Path, Target, Value, ValueType};

    fn resolve(aggregation: &Aggregation) -> ResolveResult<String> {
        let dialect = Dialect::default();
        let registry = ResolverRegistry::new();
        let mut ctx = ResolutionContext::new(&dialect, AliasMode::Auto);
        ctx.bind_target(&Target::new("Sale").with_alias("s")).unwrap();
        registry.resolve_fragment(aggregation, &mut ctx)
    }

    #[test]
    fn test_group_by_having() {
        let aggregation = Aggregation::group_by([
            Expression::from(Path::untyped("region")),
            Expression::from(Function::year(Path::new("day", ValueType::Date))),
        ])
        .having(Filter::gt(
            Function::sum(Path::new("amount", ValueType::Decimal)),
            Value::from(100),
        ));
        assert_eq!(
            resolve(&aggregation).unwrap(),
            "GROUP BY s.region, EXTRACT(YEAR FROM s.day) HAVING sum(s.amount)>:p0001"
        );
    }

    #[test]
    fn test_empty_having() {
        let aggregation =
            Aggregation::group_by([Expression::from(Path::untyped("region"))]).having(Filter::or([]));
        assert_eq!(resolve(&aggregation).unwrap_err(), ResolveError::EmptyPredicate);

        let plain = Aggregation::group_by([Expression::from(Path::untyped("region"))]);
        assert_eq!(resolve(&plain).unwrap(), "GROUP BY s.region");
    }
}
