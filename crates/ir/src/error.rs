// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Structural validation errors raised by IR nodes

use serde::Serialize;
use thiserror::Error;

/// A node rejected its own state during `validate()`
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[error("Invalid {expression} expression: {reason}")]
pub struct InvalidExpression {
    /// Kind of the offending node (e.g. `filter`, `path`)
    pub expression: String,
    /// What is wrong with it
    pub reason: String,
}

impl InvalidExpression {
    pub fn new(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            reason: reason.into(),
        }
    }
}
