// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Projection resolution
//!
//! Produces the select list together with the row shape and the converter
//! that turns executor rows into results. Multi-column projections record
//! each column's alias and position so the converter can read both tuple
//! and array rows.

use unified_query_ir::{ExpressionKind, ExpressionRef, FunctionKind, Projection, ProjectionItem, ValueType};

use crate::context::ResolutionContext;
use crate::converter::{ProjectionContext, RecordColumn, ResultConverter, ResultShape, Selection};
use crate::error::{ResolveError, ResolveResult};
use crate::registry::{OutputKind, Resolved, Resolver, ResolverRegistry};

#[derive(Debug, Default, Clone, Copy)]
pub struct ProjectionResolver;

fn scalar(fragment: String, alias: Option<String>, value_type: ValueType) -> ProjectionContext {
    ProjectionContext {
        selections: vec![Selection::new(fragment).with_alias(alias)],
        shape: ResultShape::Scalar(value_type.clone()),
        converter: ResultConverter::Scalar { value_type },
    }
}

fn record(
    columns: Vec<(String, String, ValueType)>,
    ctx: &ResolutionContext<'_>,
) -> ProjectionContext {
    let mut selections = Vec::with_capacity(columns.len());
    let mut record_columns = Vec::with_capacity(columns.len());
    for (position, (name, fragment, value_type)) in columns.into_iter().enumerate() {
        selections.push(Selection::new(fragment).with_alias(Some(name.clone())));
        record_columns.push(RecordColumn {
            alias: Some(name.clone()),
            name,
            position,
            value_type,
        });
    }
    ProjectionContext {
        selections,
        shape: ctx.dialect().multi_value_shape(),
        converter: ResultConverter::Record {
            columns: record_columns,
        },
    }
}

fn resolve_projection(
    projection: &Projection,
    ctx: &mut ResolutionContext<'_>,
    registry: &ResolverRegistry,
) -> ResolveResult<ProjectionContext> {
    match projection {
        Projection::Path(path) => {
            let fragment = registry.resolve_fragment(path, ctx)?;
            Ok(scalar(fragment, path.alias.clone(), path.value_type.clone()))
        }
        Projection::Function(function) => {
            let fragment = registry.resolve_fragment(function, ctx)?;
            Ok(scalar(fragment, None, function.result_type()))
        }
        Projection::Constant(value) => {
            let fragment = ctx.dialect().render_literal(value)?;
            Ok(ProjectionContext {
                selections: vec![Selection::new(fragment)],
                shape: ResultShape::Scalar(value.value_type()),
                converter: ResultConverter::Constant(value.clone()),
            })
        }
        Projection::Target { name } => {
            let binding = match name {
                Some(name) => ctx.lookup(name)?,
                None => ctx
                    .current_target()
                    .ok_or_else(|| ResolveError::missing_target("root"))?,
            };
            Ok(ProjectionContext {
                selections: vec![Selection::new(binding.reference())],
                shape: ResultShape::Scalar(ValueType::Entity(binding.entity.clone())),
                converter: ResultConverter::Entity {
                    entity: binding.entity.clone(),
                },
            })
        }
        Projection::Properties(items) => {
            let columns = items
                .iter()
                .map(|ProjectionItem { name, expression }| {
                    let fragment = registry.resolve_fragment(expression, ctx)?;
                    Ok((name.clone(), fragment, expression.value_type()))
                })
                .collect::<ResolveResult<Vec<_>>>()?;
            Ok(record(columns, ctx))
        }
        Projection::SelectAll => {
            let binding = ctx
                .current_target()
                .ok_or_else(|| ResolveError::missing_target("root"))?;
            if binding.attributes.is_empty() {
                return Err(ResolveError::unsupported(
                    format!("select all of {} without catalog attributes", binding.entity),
                    ctx.dialect().platform(),
                ));
            }
            let columns = binding
                .attributes
                .iter()
                .map(|attr| (attr.name.clone(), binding.qualify(&attr.name), attr.value_type.clone()))
                .collect();
            Ok(record(columns, ctx))
        }
        Projection::CountAll => {
            let argument = ctx
                .current_target()
                .and_then(|binding| binding.alias.clone())
                .unwrap_or_else(|| "*".to_string());
            let fragment = ctx
                .dialect()
                .render_function(FunctionKind::Count, &[argument], false)?;
            Ok(scalar(fragment, None, ValueType::Integer))
        }
    }
}

impl Resolver for ProjectionResolver {
    fn name(&self) -> &str {
        "projection"
    }

    fn input_kind(&self) -> ExpressionKind {
        ExpressionKind::Projection
    }

    fn output_kind(&self) -> OutputKind {
        OutputKind::Projection
    }

    fn resolve(
        &self,
        expr: ExpressionRef<'_>,
        ctx: &mut ResolutionContext<'_>,
        registry: &ResolverRegistry,
    ) -> ResolveResult<Option<Resolved>> {
        let ExpressionRef::Projection(projection) = expr else {
            return Ok(None);
        };
        resolve_projection(projection, ctx, registry).map(|p| Some(Resolved::Projection(p)))
    }
}
