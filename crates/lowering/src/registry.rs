// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Resolver registry
//!
//! Resolvers turn one kind of expression into either a statement fragment or
//! a projection. The registry keeps three ordered lists and consults them
//! in this order:
//!
//! 1. user resolvers, first registered first
//! 2. built-in resolvers
//! 3. fallback resolvers, first registered first
//!
//! Only resolvers declaring the requested `(ExpressionKind, OutputKind)` pair
//! are asked. A resolver answers `Ok(None)` to pass, so a user resolver can
//! handle a narrow case of a built-in kind and leave the rest alone.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{trace, warn};
use unified_query_ir::{ExpressionKind, ExpressionRef};

use crate::context::ResolutionContext;
use crate::converter::ProjectionContext;
use crate::error::{ResolveError, ResolveResult};
use crate::resolvers;

/// What a resolver is asked to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    /// Statement text
    Fragment,
    /// Selection fragments, row shape and converter
    Projection,
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputKind::Fragment => write!(f, "fragment"),
            OutputKind::Projection => write!(f, "projection"),
        }
    }
}

/// Output of a resolver
#[derive(Debug, Clone)]
pub enum Resolved {
    Fragment(String),
    /// An `And`/`Or` without children; valid only where a caller can drop it
    EmptyPredicate,
    Projection(ProjectionContext),
}

impl Resolved {
    pub fn output_kind(&self) -> OutputKind {
        match self {
            Resolved::Fragment(_) | Resolved::EmptyPredicate => OutputKind::Fragment,
            Resolved::Projection(_) => OutputKind::Projection,
        }
    }

    /// Self-check applied to every resolver result
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Resolved::Fragment(text) if text.trim().is_empty() => {
                Err("resolved fragment is empty".to_string())
            }
            Resolved::Fragment(_) | Resolved::EmptyPredicate => Ok(()),
            Resolved::Projection(projection) => projection.validate(),
        }
    }
}

/// Converts one expression kind into one output kind
///
/// Implementations hold no per-statement state; everything mutable lives in
/// the [`ResolutionContext`]. The registry is passed in so a resolver can
/// resolve its children.
pub trait Resolver: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn input_kind(&self) -> ExpressionKind;

    fn output_kind(&self) -> OutputKind;

    /// Produce a result, or `Ok(None)` to let the next resolver try
    fn resolve(
        &self,
        expr: ExpressionRef<'_>,
        ctx: &mut ResolutionContext<'_>,
        registry: &ResolverRegistry,
    ) -> ResolveResult<Option<Resolved>>;
}

/// Ordered resolver lookup
#[derive(Debug, Clone)]
pub struct ResolverRegistry {
    user: Vec<Arc<dyn Resolver>>,
    builtin: Vec<Arc<dyn Resolver>>,
    fallback: Vec<Arc<dyn Resolver>>,
}

impl ResolverRegistry {
    /// Registry with every built-in resolver
    pub fn new() -> Self {
        Self {
            user: Vec::new(),
            builtin: resolvers::builtin(),
            fallback: Vec::new(),
        }
    }

    /// Registry without built-ins
    pub fn empty() -> Self {
        Self {
            user: Vec::new(),
            builtin: Vec::new(),
            fallback: Vec::new(),
        }
    }

    /// Add a resolver consulted before the built-ins
    pub fn register(&mut self, resolver: impl Resolver + 'static) -> &mut Self {
        trace!(resolver = resolver.name(), kind = %resolver.input_kind(), "Registering resolver");
        self.user.push(Arc::new(resolver));
        self
    }

    /// Add a resolver consulted after the built-ins
    pub fn register_fallback(&mut self, resolver: impl Resolver + 'static) -> &mut Self {
        trace!(resolver = resolver.name(), kind = %resolver.input_kind(), "Registering fallback resolver");
        self.fallback.push(Arc::new(resolver));
        self
    }

    pub fn len(&self) -> usize {
        self.user.len() + self.builtin.len() + self.fallback.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn candidates(
        &self,
        kind: ExpressionKind,
        output: OutputKind,
    ) -> impl Iterator<Item = &Arc<dyn Resolver>> {
        self.user
            .iter()
            .chain(&self.builtin)
            .chain(&self.fallback)
            .filter(move |r| r.input_kind() == kind && r.output_kind() == output)
    }

    /// Resolve an expression in the given context
    ///
    /// The expression is validated first. Results that fail their own
    /// validation are discarded and the next resolver is tried. Parameters
    /// bound by a resolver that passes or whose result is discarded are
    /// released again.
    pub fn resolve<'e>(
        &self,
        expr: impl Into<ExpressionRef<'e>>,
        output: OutputKind,
        ctx: &mut ResolutionContext<'_>,
    ) -> ResolveResult<Resolved> {
        let expr = expr.into();
        expr.validate()?;
        let kind = expr.kind();

        for resolver in self.candidates(kind, output) {
            let bound = ctx.parameters().len();
            let Some(resolved) = resolver.resolve(expr, ctx, self)? else {
                ctx.truncate_parameters(bound);
                continue;
            };
            if resolved.output_kind() != output {
                warn!(resolver = resolver.name(), %kind, %output, "Resolver produced the wrong output kind");
                ctx.truncate_parameters(bound);
                continue;
            }
            if let Err(reason) = resolved.validate() {
                warn!(resolver = resolver.name(), %kind, %reason, "Discarding invalid resolver result");
                ctx.truncate_parameters(bound);
                continue;
            }
            trace!(resolver = resolver.name(), %kind, %output, "Resolved expression");
            return Ok(resolved);
        }

        Err(ResolveError::unresolvable(kind, output))
    }

    /// Resolve to statement text; an empty predicate is an error here
    pub fn resolve_fragment<'e>(
        &self,
        expr: impl Into<ExpressionRef<'e>>,
        ctx: &mut ResolutionContext<'_>,
    ) -> ResolveResult<String> {
        match self.resolve(expr, OutputKind::Fragment, ctx)? {
            Resolved::Fragment(text) => Ok(text),
            Resolved::EmptyPredicate => Err(ResolveError::EmptyPredicate),
            Resolved::Projection(_) => Err(ResolveError::Build(
                "projection returned for a fragment".to_string(),
            )),
        }
    }

    /// Resolve a filter; `None` when it is an empty `And`/`Or`
    pub fn resolve_predicate<'e>(
        &self,
        expr: impl Into<ExpressionRef<'e>>,
        ctx: &mut ResolutionContext<'_>,
    ) -> ResolveResult<Option<String>> {
        match self.resolve(expr, OutputKind::Fragment, ctx)? {
            Resolved::Fragment(text) => Ok(Some(text)),
            Resolved::EmptyPredicate => Ok(None),
            Resolved::Projection(_) => Err(ResolveError::Build(
                "projection returned for a predicate".to_string(),
            )),
        }
    }

    pub fn resolve_projection<'e>(
        &self,
        expr: impl Into<ExpressionRef<'e>>,
        ctx: &mut ResolutionContext<'_>,
    ) -> ResolveResult<ProjectionContext> {
        match self.resolve(expr, OutputKind::Projection, ctx)? {
            Resolved::Projection(projection) => Ok(projection),
            _ => Err(ResolveError::Build(
                "fragment returned for a projection".to_string(),
            )),
        }
    }
}

impl Default for ResolverRegistry {
    fn default() -> Self {
        Self::new()
    }
}
