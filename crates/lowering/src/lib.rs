// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Unified Query - Resolution Layer
//!
//! This crate turns the expression tree of a data operation into
//! parameterized object-query text.
//!
//! ## Overview
//!
//! The resolution layer is responsible for:
//! - Dispatching every expression node to a [`Resolver`] through the
//!   [`ResolverRegistry`]
//! - Tracking aliases, bound targets and named parameters in a
//!   [`ResolutionContext`]
//! - Rendering platform-specific spellings through a [`Dialect`]
//! - Describing the shape of result rows and how to convert them
//! - Assembling clauses into `SELECT`, `UPDATE` and `DELETE` statements
//!
//! ## Resolution Process
//!
//! ```text
//! Operation → compose_operation → ResolverRegistry → statement text
//!                    │                   │
//!                    └── ResolutionContext (aliases, parameters, scopes)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use unified_query_ir::{Filter, Operation, Path, Platform, Target, Value, ValueType};
//! use unified_query_lowering::{AliasMode, Dialect, ResolutionContext, ResolverRegistry, compose_operation};
//!
//! let dialect = Dialect::new(Platform::Hibernate);
//! let registry = ResolverRegistry::new();
//! let mut ctx = ResolutionContext::new(&dialect, AliasMode::Auto);
//!
//! let operation = Operation::select(Target::new("Order"))
//!     .with_filter(Filter::eq(Path::new("status", ValueType::String), Value::from("open")));
//! let composed = compose_operation(&operation, &registry, &mut ctx)?;
//! // SELECT orde_0_0 FROM Order orde_0_0 WHERE orde_0_0.status=:p0001
//! ```

pub mod compose;
pub mod context;
pub mod converter;
pub mod dialect;
pub mod error;
pub mod parameter;
pub mod registry;
pub mod resolvers;

pub use compose::{ComposedQuery, ComposedStatement, QueryComposition, WriteComposition, compose_operation};
pub use context::{AliasMode, DEFAULT_MAX_DEPTH, ResolutionContext, TargetBinding};
pub use converter::{
    ConvertError, ProjectionContext, RawRow, RecordColumn, ResultConverter, ResultShape, ResultValue,
    Selection,
};
pub use dialect::Dialect;
pub use error::{ErrorSeverity, ResolveError, ResolveResult};
pub use parameter::{NamedParameters, ParameterValue};
pub use registry::{OutputKind, Resolved, Resolver, ResolverRegistry};
