// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Mock catalog implementation for testing
//!
//! Provides an in-memory catalog with builder pattern for easy test setup.
//! Every lookup is counted so caching layers can be checked.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use unified_query_catalog::{CatalogError, CatalogResult, EntityCatalog, EntityMetadata};
use unified_query_ir::{AttributeMetadata, ValueType};

/// In-memory mock catalog for testing
#[derive(Debug, Clone, Default)]
pub struct MockEntityCatalog {
    entities: HashMap<String, EntityMetadata>,
    lookups: Arc<AtomicUsize>,
}

impl MockEntityCatalog {
    /// Create a new empty mock catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity, keyed by its logical name
    pub fn add_entity(mut self, entity: EntityMetadata) -> Self {
        self.entities.insert(entity.name.clone(), entity);
        self
    }

    /// Get an entity without counting the lookup
    pub fn get_entity(&self, name: &str) -> Option<&EntityMetadata> {
        self.entities.get(name)
    }

    /// Number of `resolve` calls so far, shared between clones
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl EntityCatalog for MockEntityCatalog {
    fn resolve(&self, scope: &str, name: &str) -> CatalogResult<EntityMetadata> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.entities
            .get(name)
            .cloned()
            .ok_or_else(|| CatalogError::not_found(scope, name))
    }

    fn list_entities(&self) -> CatalogResult<Vec<EntityMetadata>> {
        let mut entities: Vec<EntityMetadata> = self.entities.values().cloned().collect();
        entities.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entities)
    }
}

/// Builder for creating mock catalogs with a fluent API
#[derive(Debug, Default)]
pub struct MockCatalogBuilder {
    catalog: MockEntityCatalog,
}

impl MockCatalogBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity whose logical name maps to `entity_name`
    pub fn with_entity(
        mut self,
        name: &str,
        entity_name: &str,
        attributes: Vec<AttributeMetadata>,
    ) -> Self {
        self.catalog = self
            .catalog
            .add_entity(EntityMetadata::new(name, entity_name).with_attributes(attributes));
        self
    }

    /// Add the order/customer/product schema used across tests
    pub fn with_standard_schema(self) -> Self {
        self.with_entity(
            "customer",
            "Customer",
            vec![
                AttributeMetadata::new("id", ValueType::Integer).with_id(),
                AttributeMetadata::new("name", ValueType::String),
                AttributeMetadata::new("email", ValueType::String),
                AttributeMetadata::new("vip", ValueType::Boolean),
            ],
        )
        .with_entity(
            "order",
            "PurchaseOrder",
            vec![
                AttributeMetadata::new("id", ValueType::Integer).with_id(),
                AttributeMetadata::new("customerId", ValueType::Integer),
                AttributeMetadata::new("status", ValueType::String),
                AttributeMetadata::new("total", ValueType::Decimal),
                AttributeMetadata::new("placedOn", ValueType::Date),
            ],
        )
        .with_entity(
            "product",
            "Product",
            vec![
                AttributeMetadata::new("id", ValueType::Integer).with_id(),
                AttributeMetadata::new("name", ValueType::String),
                AttributeMetadata::new("price", ValueType::Float),
            ],
        )
    }

    /// Build the catalog
    pub fn build(self) -> MockEntityCatalog {
        self.catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_schema() {
        let catalog = MockCatalogBuilder::new().with_standard_schema().build();
        let order = catalog.resolve("default", "order").unwrap();
        assert_eq!(order.entity_name, "PurchaseOrder");
        assert_eq!(order.id_attributes().len(), 1);
        assert_eq!(catalog.list_entities().unwrap().len(), 3);
    }

    #[test]
    fn test_lookups_are_counted() {
        let catalog = MockCatalogBuilder::new().with_standard_schema().build();
        let shared = catalog.clone();
        assert!(catalog.resolve("default", "invoice").is_err());
        shared.resolve("default", "product").unwrap();
        assert_eq!(catalog.lookups(), 2);
        assert!(catalog.get_entity("customer").is_some());
        assert_eq!(catalog.lookups(), 2);
    }
}
