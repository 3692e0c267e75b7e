// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Error types and classification for the resolution layer
//!
//! Every failure is fatal to the current compilation and is never retried
//! here. [`ResolveError::is_unsupported`] lets callers tell a construct the
//! platform cannot express apart from a genuine defect, so they can choose
//! another projection or operation shape.

use serde::Serialize;
use unified_query_catalog::CatalogError;
use unified_query_ir::{ExpressionKind, InvalidExpression};

use crate::registry::OutputKind;

/// Result type alias for resolution operations
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Errors that can occur while resolving or composing a statement
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq, Serialize)]
pub enum ResolveError {
    /// No registered resolver produced a value
    #[error("Unresolvable {kind} expression: no resolver produces a {output}")]
    Unresolvable { kind: String, output: OutputKind },

    /// A node rejected its own state
    #[error(transparent)]
    Invalid(#[from] InvalidExpression),

    /// Logically valid, but not expressible on the active platform/operation
    #[error("Unsupported on {platform}: {construct}")]
    Unsupported { construct: String, platform: String },

    /// An alias or target was requested before being bound
    #[error("Configuration error: {0}")]
    MissingContextState(String),

    /// A boolean composition with no children reached statement assembly
    #[error("Empty predicate: an AND/OR filter must have at least one child")]
    EmptyPredicate,

    /// An explicit alias collides with one already used in the statement
    #[error("Duplicate alias '{0}'")]
    DuplicateAlias(String),

    /// Sub-queries nested too deeply
    #[error("Recursion limit exceeded: {context} (depth: {depth}, limit: {limit})")]
    RecursionLimitExceeded {
        context: String,
        depth: usize,
        limit: usize,
    },

    /// Target name could not be mapped to an entity
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Statement shape is invalid (stage order, empty clauses)
    #[error("Build error: {0}")]
    Build(String),
}

impl ResolveError {
    pub fn unresolvable(kind: ExpressionKind, output: OutputKind) -> Self {
        ResolveError::Unresolvable {
            kind: kind.to_string(),
            output,
        }
    }

    pub fn unsupported(construct: impl Into<String>, platform: impl ToString) -> Self {
        ResolveError::Unsupported {
            construct: construct.into(),
            platform: platform.to_string(),
        }
    }

    pub fn missing_target(name: &str) -> Self {
        ResolveError::MissingContextState(format!("missing context data target {}", name))
    }

    /// Check if the construct is valid but has no form on this platform
    pub fn is_unsupported(&self) -> bool {
        matches!(self, ResolveError::Unsupported { .. })
    }

    /// Get the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ResolveError::Unsupported { .. } => ErrorSeverity::Warning,
            ResolveError::MissingContextState(_)
            | ResolveError::RecursionLimitExceeded { .. }
            | ResolveError::Build(_) => ErrorSeverity::Bug,
            ResolveError::Unresolvable { .. }
            | ResolveError::Invalid(_)
            | ResolveError::EmptyPredicate
            | ResolveError::DuplicateAlias(_)
            | ResolveError::Catalog(_) => ErrorSeverity::Error,
        }
    }
}

/// Severity level for resolution errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ErrorSeverity {
    /// The caller may fall back to another shape
    Warning,
    /// The operation description is wrong
    Error,
    /// The statement was constructed incorrectly by code, not data
    Bug,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolvable_names_kind_and_output() {
        let err = ResolveError::unresolvable(ExpressionKind::Filter, OutputKind::Projection);
        let msg = err.to_string();
        assert!(msg.contains("filter"));
        assert!(msg.contains("projection"));
    }

    #[test]
    fn test_missing_target_message() {
        let err = ResolveError::missing_target("Order");
        assert_eq!(
            err.to_string(),
            "Configuration error: missing context data target Order"
        );
        assert_eq!(err.severity(), ErrorSeverity::Bug);
    }

    #[test]
    fn test_unsupported_is_distinct() {
        let err = ResolveError::unsupported("bulk insert", "hibernate");
        assert!(err.is_unsupported());
        assert_eq!(err.severity(), ErrorSeverity::Warning);
        assert!(!ResolveError::EmptyPredicate.is_unsupported());
    }

    #[test]
    fn test_invalid_is_transparent() {
        let err: ResolveError = InvalidExpression::new("filter", "IN list is empty").into();
        assert_eq!(err.to_string(), "Invalid filter expression: IN list is empty");
    }

    #[test]
    fn test_error_serialization() {
        let err = ResolveError::Build("empty select list".to_string());
        let json = serde_json::to_string(&err);
        assert!(json.is_ok());
    }
}
