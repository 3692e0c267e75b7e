// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Unified Query - Intermediate Representation
//!
//! This crate provides the expression model used to describe a data operation
//! independently of the persistence backend that will eventually run it.
//! The IR is designed to:
//! - Be platform-agnostic (Hibernate, EclipseLink, OpenJPA, DataNucleus)
//! - Validate itself before any resolution happens
//! - Stay pure data: no node knows how to render itself
//!
//! Resolution into statement text lives in `unified-query-lowering`.

pub mod error;
pub mod expr;
pub mod filter;
pub mod function;
pub mod metadata;
pub mod operation;
pub mod platform;
pub mod projection;
pub mod value;

// Re-export commonly used types
pub use error::InvalidExpression;
pub use expr::{CustomExpression, CustomNode, Expression, ExpressionKind, ExpressionRef, Path, Validate};
pub use filter::{CompareOp, Filter, MatchMode};
pub use function::{Function, FunctionKind};
pub use metadata::{AttributeMetadata, EntityMetadata, FunctionMetadata, FunctionType};
pub use operation::{
    Aggregation, Join, JoinType, LockMode, Operation, OperationKind, Sort, SortDirection,
    SortItem, SubQuery, Target,
};
pub use platform::{Platform, PlatformCapability};
pub use projection::{Projection, ProjectionItem};
pub use value::{TemporalType, Value, ValueType};
