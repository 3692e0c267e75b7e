// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error types for Catalog operations
//!
//! This module defines the error types used throughout the catalog layer.

use serde::Serialize;
use thiserror::Error;

/// Result type alias for Catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur during Catalog operations
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
pub enum CatalogError {
    /// Requested entity was not found
    #[error("Entity '{name}' not found in scope '{scope}'")]
    EntityNotFound { name: String, scope: String },

    /// Failed to serialize or deserialize entity definitions
    #[error("Failed to parse entity definitions: {0}")]
    SerializationError(String),

    /// A cache lock was poisoned by a panicking thread
    #[error("Catalog cache lock poisoned")]
    LockPoisoned,

    /// Invalid catalog configuration
    #[error("Invalid catalog configuration: {0}")]
    ConfigurationError(String),

    /// The specified feature is not supported by this catalog implementation
    #[error("Feature not supported: {0}")]
    NotSupported(String),
}

impl CatalogError {
    pub fn not_found(scope: impl Into<String>, name: impl Into<String>) -> Self {
        CatalogError::EntityNotFound {
            name: name.into(),
            scope: scope.into(),
        }
    }
}

impl From<serde_yaml::Error> for CatalogError {
    fn from(err: serde_yaml::Error) -> Self {
        CatalogError::SerializationError(err.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::SerializationError(err.to_string())
    }
}
