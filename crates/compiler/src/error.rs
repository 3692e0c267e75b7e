// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use serde::Serialize;
use unified_query_lowering::{ErrorSeverity, ResolveError};

use crate::config::ConfigError;

/// Result type alias for compilation
pub type CompileResult<T> = Result<T, CompileError>;

/// Errors returned by [`QueryCompiler`](crate::QueryCompiler)
#[derive(Debug, thiserror::Error, Clone, PartialEq, Serialize)]
pub enum CompileError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl CompileError {
    /// Check if the operation has no form on the configured platform
    pub fn is_unsupported(&self) -> bool {
        matches!(self, CompileError::Resolve(err) if err.is_unsupported())
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CompileError::Resolve(err) => err.severity(),
            CompileError::Config(_) => ErrorSeverity::Bug,
        }
    }
}
