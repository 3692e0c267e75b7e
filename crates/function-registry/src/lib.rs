// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Function Registry
//!
//! This crate provides a centralized registry of function spellings across
//! persistence platforms.
//!
//! ## Features
//!
//! - One template per (platform, function kind)
//! - Portable functions shared by every platform, temporal part extraction
//!   spelled per platform
//! - Overridable at runtime with [`FunctionRegistry::register`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use unified_query_function_registry::{FunctionRegistry, FunctionKind, Platform};
//!
//! let registry = FunctionRegistry::new();
//! let year = registry.render(Platform::EclipseLink, FunctionKind::Year, &["o.created".into()], false);
//! assert_eq!(year.as_deref(), Some("EXTRACT(YEAR FROM o.created)"));
//! ```

pub mod builtin;
pub mod registry;

// Re-exports from ir for convenience
pub use unified_query_ir::{FunctionKind, FunctionMetadata, FunctionType, Platform, ValueType};

pub use registry::FunctionRegistry;
