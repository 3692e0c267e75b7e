// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use unified_query_ir::{ExpressionKind, ExpressionRef, Value, ValueType};

use crate::context::ResolutionContext;
use crate::error::ResolveResult;
use crate::registry::{OutputKind, Resolved, Resolver, ResolverRegistry};

/// Binds constants as named parameters
///
/// A list binds one parameter per element and renders them comma separated,
/// ready to be wrapped by `IN (...)`. The null constant is written inline.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConstantResolver;

/// Parameter type for a value, preferring the type of the other operand
fn parameter_type(hint: Option<&ValueType>, value: &Value) -> ValueType {
    match hint {
        Some(ValueType::List(inner)) if **inner != ValueType::Any => (**inner).clone(),
        Some(ValueType::Any) | Some(ValueType::List(_)) | None => value.value_type(),
        Some(hint) => hint.clone(),
    }
}

impl Resolver for ConstantResolver {
    fn name(&self) -> &str {
        "constant"
    }

    fn input_kind(&self) -> ExpressionKind {
        ExpressionKind::Constant
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
        let ExpressionRef::Constant(value) = expr else {
            return Ok(None);
        };
        let hint = ctx.value_hint().cloned();
        let text = match value {
            Value::Null => "NULL".to_string(),
            Value::List(items) => items
                .iter()
                .map(|item| {
                    let value_type = parameter_type(hint.as_ref(), item);
                    ctx.bind_parameter(item.clone(), value_type)
                })
                .collect::<Vec<_>>()
                .join(","),
            other => {
                let value_type = parameter_type(hint.as_ref(), other);
                ctx.bind_parameter(other.clone(), value_type)
            }
        };
        Ok(Some(Resolved::Fragment(text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AliasMode;
    use crate::dialect::Dialect;
    use unified_query_ir::Expression;

    #[test]
    fn test_list_binds_each_element() {
        let dialect = Dialect::default();
        let registry = ResolverRegistry::new();
        let mut ctx = ResolutionContext::new(&dialect, AliasMode::Auto);
        let list = Expression::constant(vec![3, 4, 5]);
        assert_eq!(
            registry.resolve_fragment(&list, &mut ctx).unwrap(),
            ":p0001,:p0002,:p0003"
        );
        let names: Vec<_> = ctx.parameters().names().collect();
        assert_eq!(names, ["p0001", "p0002", "p0003"]);
    }

    #[test]
    fn test_hint_overrides_inferred_type() {
        let dialect = Dialect::default();
        let registry = ResolverRegistry::new();
        let mut ctx = ResolutionContext::new(&dialect, AliasMode::Auto);
        let text = ctx
            .with_value_hint(ValueType::Decimal, |ctx| {
                registry.resolve_fragment(&Expression::constant(10), ctx)
            })
            .unwrap();
        assert_eq!(text, ":p0001");
        assert_eq!(ctx.parameters().get("p0001").unwrap().value_type, ValueType::Decimal);

        // An untyped hint keeps the value's own type
        ctx.with_value_hint(ValueType::Any, |ctx| {
            registry.resolve_fragment(&Expression::constant("a"), ctx)
        })
        .unwrap();
        assert_eq!(ctx.parameters().get("p0002").unwrap().value_type, ValueType::String);
    }

    #[test]
    fn test_null_is_inline() {
        let dialect = Dialect::default();
        let registry = ResolverRegistry::new();
        let mut ctx = ResolutionContext::new(&dialect, AliasMode::Auto);
        assert_eq!(
            registry.resolve_fragment(&Expression::Constant(Value::Null), &mut ctx).unwrap(),
            "NULL"
        );
        assert!(ctx.parameters().is_empty());
    }
}
