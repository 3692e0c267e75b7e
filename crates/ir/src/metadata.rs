// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Metadata types
//!
//! This module defines the descriptive metadata consumed during resolution:
//! entities (what a logical target name maps to) and functions (how a
//! function kind is spelled on a platform).

use serde::{Deserialize, Serialize};

use crate::function::FunctionKind;
use crate::value::ValueType;

/// Metadata for an entity attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeMetadata {
    /// Attribute name as used in paths
    pub name: String,
    /// Static value type
    pub value_type: ValueType,
    /// Whether this attribute is (part of) the identifier
    #[serde(default)]
    pub is_id: bool,
}

impl AttributeMetadata {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            is_id: false,
        }
    }

    /// Builder method: mark as identifier
    pub fn with_id(mut self) -> Self {
        self.is_id = true;
        self
    }
}

/// Metadata for a persistent entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetadata {
    /// Logical target name
    pub name: String,
    /// Entity name used in statement text
    pub entity_name: String,
    /// Attribute definitions, in declaration order
    #[serde(default)]
    pub attributes: Vec<AttributeMetadata>,
}

impl EntityMetadata {
    /// Create new entity metadata with builder pattern
    pub fn new(name: impl Into<String>, entity_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity_name: entity_name.into(),
            attributes: Vec::new(),
        }
    }

    /// Entity whose statement name equals its logical name
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(name.clone(), name)
    }

    /// Builder method: add attributes
    pub fn with_attributes(mut self, attributes: Vec<AttributeMetadata>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Builder method: add one attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value_type: ValueType) -> Self {
        self.attributes.push(AttributeMetadata::new(name, value_type));
        self
    }

    /// Get attribute by name
    pub fn get_attribute(&self, name: &str) -> Option<&AttributeMetadata> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Get identifier attributes
    pub fn id_attributes(&self) -> Vec<&AttributeMetadata> {
        self.attributes.iter().filter(|a| a.is_id).collect()
    }
}

/// Function classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionType {
    Scalar,
    Aggregate,
    /// Niladic temporal function (`CURRENT_DATE`, ...)
    Temporal,
}

/// Platform spelling of a function
///
/// `template` holds positional placeholders `{0}`, `{1}`, ... that are
/// replaced by the resolved argument fragments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionMetadata {
    /// Function name, for display
    pub name: String,
    pub kind: FunctionKind,
    /// Return type; `Any` means "same as the first argument"
    pub return_type: ValueType,
    pub function_type: FunctionType,
    /// Rendering template (e.g. `EXTRACT(YEAR FROM {0})`)
    pub template: String,
    /// Function description/documentation
    pub description: Option<String>,
}

impl FunctionMetadata {
    /// Create new function metadata with builder pattern
    pub fn new(
        name: impl Into<String>,
        kind: FunctionKind,
        return_type: ValueType,
        template: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            return_type,
            function_type: FunctionType::Scalar,
            template: template.into(),
            description: None,
        }
    }

    /// Builder method: set function type
    pub fn with_type(mut self, function_type: FunctionType) -> Self {
        self.function_type = function_type;
        self
    }

    /// Builder method: set description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Fill the template with resolved argument fragments
    ///
    /// With `distinct`, the first argument is prefixed with `DISTINCT `.
    pub fn render(&self, args: &[String], distinct: bool) -> String {
        let mut text = self.template.clone();
        for (i, arg) in args.iter().enumerate() {
            let placeholder = format!("{{{}}}", i);
            if i == 0 && distinct {
                text = text.replace(&placeholder, &format!("DISTINCT {}", arg));
            } else {
                text = text.replace(&placeholder, arg);
            }
        }
        text
    }

    /// Get function signature (for display and diagnostics)
    pub fn signature(&self) -> String {
        format!("{} -> {}", self.template, self.return_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_template() {
        let year = FunctionMetadata::new(
            "YEAR",
            FunctionKind::Year,
            ValueType::Integer,
            "EXTRACT(YEAR FROM {0})",
        );
        assert_eq!(year.render(&["o.created".to_string()], false), "EXTRACT(YEAR FROM o.created)");
    }

    #[test]
    fn test_render_distinct() {
        let count = FunctionMetadata::new("count", FunctionKind::Count, ValueType::Integer, "count({0})")
            .with_type(FunctionType::Aggregate);
        assert_eq!(count.render(&["c.id".to_string()], true), "count(DISTINCT c.id)");
        assert_eq!(count.signature(), "count({0}) -> int");
    }

    #[test]
    fn test_entity_attributes() {
        let entity = EntityMetadata::new("customer", "Customer")
            .with_attributes(vec![
                AttributeMetadata::new("id", ValueType::Integer).with_id(),
                AttributeMetadata::new("name", ValueType::String),
            ]);
        assert_eq!(entity.id_attributes().len(), 1);
        assert!(entity.get_attribute("name").is_some());
        assert!(entity.get_attribute("missing").is_none());
    }
}
