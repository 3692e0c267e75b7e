// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Unified Query - Compiler
//!
//! Entry point that turns an [`Operation`](unified_query_ir::Operation) into
//! a [`CompiledStatement`]: statement text, named parameters, the shape of
//! the rows the executor will return, and the converter for those rows.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use unified_query_compiler::{CompilerConfig, QueryCompiler};
//! use unified_query_ir::{Filter, Operation, Path, Platform, Target, Value, ValueType};
//!
//! let compiler = QueryCompiler::new(CompilerConfig::default().with_platform(Platform::Hibernate))?
//!     .with_catalog(Arc::new(catalog));
//! let statement = compiler.compile(
//!     &Operation::select(Target::new("order"))
//!         .with_filter(Filter::eq(Path::new("status", ValueType::String), Value::from("open"))),
//! )?;
//! ```
//!
//! A compiler holds no per-statement state and can be shared across threads.

pub mod compiler;
pub mod config;
pub mod error;
pub mod statement;

pub use compiler::QueryCompiler;
pub use config::{CompilerConfig, ConfigError};
pub use error::{CompileError, CompileResult};
pub use statement::CompiledStatement;
