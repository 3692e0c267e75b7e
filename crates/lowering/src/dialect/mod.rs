// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Dialect layer
//!
//! A [`Dialect`] bundles everything platform-specific that resolvers need:
//! capability checks, function spellings, parameter naming and the LIKE
//! escape character. Resolvers never match on [`Platform`] directly.

pub mod shared;

use std::sync::Arc;

use unified_query_function_registry::FunctionRegistry;
use unified_query_ir::{FunctionKind, Platform, PlatformCapability, Value};

use crate::converter::ResultShape;
use crate::error::{ResolveError, ResolveResult};

/// Platform behaviour injected into resolvers
#[derive(Debug, Clone)]
pub struct Dialect {
    platform: Platform,
    functions: Arc<FunctionRegistry>,
    escape_char: char,
    parameter_marker: char,
    parameter_prefix: String,
}

impl Dialect {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            functions: Arc::new(FunctionRegistry::new()),
            escape_char: '!',
            parameter_marker: ':',
            parameter_prefix: "p".to_string(),
        }
    }

    /// Use a customized function registry
    pub fn with_functions(mut self, functions: Arc<FunctionRegistry>) -> Self {
        self.functions = functions;
        self
    }

    pub fn with_escape_char(mut self, escape_char: char) -> Self {
        self.escape_char = escape_char;
        self
    }

    pub fn with_parameter_marker(mut self, marker: char) -> Self {
        self.parameter_marker = marker;
        self
    }

    pub fn with_parameter_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.parameter_prefix = prefix.into();
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub fn escape_char(&self) -> char {
        self.escape_char
    }

    pub fn parameter_marker(&self) -> char {
        self.parameter_marker
    }

    pub fn supports(&self, capability: PlatformCapability) -> bool {
        self.platform.supports(capability)
    }

    /// Row shape of multi-column selections
    ///
    /// Platforms that cannot be identified get positional arrays.
    pub fn multi_value_shape(&self) -> ResultShape {
        if self.supports(PlatformCapability::TupleResults) {
            ResultShape::Tuple
        } else {
            ResultShape::Array
        }
    }

    /// Name of the `index`-th parameter (1-based), e.g. `p0001`
    pub fn parameter_name(&self, index: usize) -> String {
        format!("{}{:04}", self.parameter_prefix, index)
    }

    /// Reference to a parameter inside statement text, e.g. `:p0001`
    pub fn parameter_reference(&self, name: &str) -> String {
        format!("{}{}", self.parameter_marker, name)
    }

    /// Whether a string is already a parameter reference
    pub fn is_parameter_reference(&self, text: &str) -> bool {
        text.len() > self.parameter_marker.len_utf8() && text.starts_with(self.parameter_marker)
    }

    pub fn render_function(
        &self,
        kind: FunctionKind,
        args: &[String],
        distinct: bool,
    ) -> ResolveResult<String> {
        self.functions
            .render(self.platform, kind, args, distinct)
            .ok_or_else(|| ResolveError::unsupported(format!("function {}", kind), self.platform))
    }

    /// `LIKE` value with wildcards escaped
    pub fn escape_like(&self, value: &str) -> String {
        shared::escape_like(value, self.escape_char)
    }

    /// Trailing `ESCAPE` specifier of every `LIKE`
    pub fn escape_clause(&self) -> String {
        format!("ESCAPE {}", shared::quote(&self.escape_char.to_string()))
    }

    /// Inline a constant into statement text
    pub fn render_literal(&self, value: &Value) -> ResolveResult<String> {
        let text = match value {
            Value::Null => "NULL".to_string(),
            Value::Boolean(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) if f.is_finite() => {
                let text = f.to_string();
                if text.contains(['.', 'e', 'E']) {
                    text
                } else {
                    format!("{}.0", text)
                }
            }
            Value::Decimal(d) => d.clone(),
            Value::String(s) => shared::quote(s),
            Value::Date(d) => format!("{{d '{}'}}", d.format("%Y-%m-%d")),
            Value::Time(t) => format!("{{t '{}'}}", t.format("%H:%M:%S")),
            Value::DateTime(dt) => format!("{{ts '{}'}}", dt.format("%Y-%m-%d %H:%M:%S%.f")),
            other => {
                return Err(ResolveError::unsupported(
                    format!("inline literal {:?}", other),
                    self.platform,
                ));
            }
        };
        Ok(text)
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::new(Platform::Unknown)
    }
}
