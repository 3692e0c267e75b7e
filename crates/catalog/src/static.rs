// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Static Catalog
//!
//! This module provides a catalog backed by predefined entity definitions.
//!
//! ## File format
//!
//! ```yaml
//! entities:
//!   - name: order
//!     entity_name: PurchaseOrder
//!     attributes:
//!       - { name: id, value_type: integer, is_id: true }
//!       - { name: total, value_type: decimal }
//! scoped:
//!   billing:
//!     - name: order
//!       entity_name: BillingOrder
//! ```
//!
//! Entities under `scoped` take precedence over global ones for lookups in
//! that scope.

use serde::Deserialize;
use std::collections::HashMap;

use crate::{CatalogError, CatalogResult, EntityCatalog};
use unified_query_ir::EntityMetadata;

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    entities: Vec<EntityMetadata>,
    #[serde(default)]
    scoped: HashMap<String, Vec<EntityMetadata>>,
}

/// Static catalog with predefined entity data
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    entities: HashMap<String, EntityMetadata>,
    scoped: HashMap<(String, String), EntityMetadata>,
}

impl StaticCatalog {
    /// Create an empty static catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: add an entity visible in every scope
    pub fn with_entity(mut self, entity: EntityMetadata) -> Self {
        self.entities.insert(entity.name.clone(), entity);
        self
    }

    /// Builder method: add an entity visible in one scope only
    pub fn with_scoped_entity(mut self, scope: impl Into<String>, entity: EntityMetadata) -> Self {
        self.scoped
            .insert((scope.into(), entity.name.clone()), entity);
        self
    }

    /// Load entity definitions from YAML
    pub fn from_yaml_str(source: &str) -> CatalogResult<Self> {
        let file: CatalogFile = serde_yaml::from_str(source)?;
        Self::from_file(file)
    }

    /// Load entity definitions from JSON
    pub fn from_json_str(source: &str) -> CatalogResult<Self> {
        let file: CatalogFile = serde_json::from_str(source)?;
        Self::from_file(file)
    }

    fn from_file(file: CatalogFile) -> CatalogResult<Self> {
        let mut catalog = Self::new();
        for entity in file.entities {
            check_entity(&entity)?;
            if catalog.entities.contains_key(&entity.name) {
                return Err(CatalogError::ConfigurationError(format!(
                    "entity '{}' is defined twice",
                    entity.name
                )));
            }
            catalog = catalog.with_entity(entity);
        }
        for (scope, entities) in file.scoped {
            for entity in entities {
                check_entity(&entity)?;
                catalog = catalog.with_scoped_entity(scope.clone(), entity);
            }
        }
        Ok(catalog)
    }

    /// Number of distinct definitions, scoped ones included
    pub fn len(&self) -> usize {
        self.entities.len() + self.scoped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn check_entity(entity: &EntityMetadata) -> CatalogResult<()> {
    if entity.name.trim().is_empty() || entity.entity_name.trim().is_empty() {
        return Err(CatalogError::ConfigurationError(format!(
            "entity '{}' has an empty name",
            entity.name
        )));
    }
    Ok(())
}

impl EntityCatalog for StaticCatalog {
    fn resolve(&self, scope: &str, name: &str) -> CatalogResult<EntityMetadata> {
        if let Some(entity) = self.scoped.get(&(scope.to_string(), name.to_string())) {
            return Ok(entity.clone());
        }
        if let Some(entity) = self.entities.get(name) {
            return Ok(entity.clone());
        }
        // Fall back to a case-insensitive match on either the logical or entity name
        self.entities
            .values()
            .find(|e| e.name.eq_ignore_ascii_case(name) || e.entity_name.eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| CatalogError::not_found(scope, name))
    }

    fn list_entities(&self) -> CatalogResult<Vec<EntityMetadata>> {
        let mut entities: Vec<EntityMetadata> = self
            .entities
            .values()
            .chain(self.scoped.values())
            .cloned()
            .collect();
        entities.sort_by(|a, b| a.name.cmp(&b.name).then(a.entity_name.cmp(&b.entity_name)));
        Ok(entities)
    }
}
