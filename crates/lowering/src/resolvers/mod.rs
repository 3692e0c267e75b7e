// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Built-in resolvers, one per expression kind
//!
//! Every built-in answers `Ok(None)` for variants it does not handle so that
//! fallback resolvers get a chance.

mod aggregation;
mod constant;
mod filter;
mod function;
mod path;
mod projection;
mod sort;
mod subquery;
mod target;

use std::sync::Arc;

pub use aggregation::AggregationResolver;
pub use constant::ConstantResolver;
pub use filter::FilterResolver;
pub use function::FunctionResolver;
pub use path::{PathResolver, render_path};
pub use projection::ProjectionResolver;
pub use sort::SortResolver;
pub use subquery::SubQueryResolver;
pub use target::TargetResolver;

use crate::registry::Resolver;

/// Built-in resolvers in registration order
pub fn builtin() -> Vec<Arc<dyn Resolver>> {
    vec![
        Arc::new(PathResolver),
        Arc::new(ConstantResolver),
        Arc::new(FunctionResolver),
        Arc::new(FilterResolver),
        Arc::new(TargetResolver),
        Arc::new(SortResolver),
        Arc::new(AggregationResolver),
        Arc::new(ProjectionResolver),
        Arc::new(SubQueryResolver),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::OutputKind;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_kinds_are_unique() {
        let resolvers = builtin();
        let keys: HashSet<_> = resolvers
            .iter()
            .map(|r| (r.input_kind(), r.output_kind()))
            .collect();
        assert_eq!(keys.len(), resolvers.len());
        assert_eq!(
            resolvers
                .iter()
                .filter(|r| r.output_kind() == OutputKind::Projection)
                .count(),
            1
        );
    }
}
