// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # EntityCatalog trait
//!
//! This module defines the trait used to resolve a logical target name to
//! the entity a statement must reference.

use crate::error::CatalogResult;
use unified_query_ir::EntityMetadata;

/// Catalog trait for logical name resolution
///
/// Resolution is synchronous: compilation is a single-pass tree walk with no
/// suspension points, so implementations backed by slow sources should be
/// wrapped in a [`CachedCatalog`](crate::CachedCatalog).
///
/// # Examples
///
/// ```rust,ignore
/// use unified_query_catalog::{EntityCatalog, CatalogResult};
///
/// fn entity_name(catalog: &dyn EntityCatalog, name: &str) -> CatalogResult<String> {
///     Ok(catalog.resolve("default", name)?.entity_name)
/// }
/// ```
pub trait EntityCatalog: Send + Sync {
    /// Resolve a logical target name within a scope
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::EntityNotFound` if the name is unknown.
    fn resolve(&self, scope: &str, name: &str) -> CatalogResult<EntityMetadata>;

    /// List every entity known to this catalog
    fn list_entities(&self) -> CatalogResult<Vec<EntityMetadata>>;
}

impl<C: EntityCatalog + ?Sized> EntityCatalog for std::sync::Arc<C> {
    fn resolve(&self, scope: &str, name: &str) -> CatalogResult<EntityMetadata> {
        (**self).resolve(scope, name)
    }

    fn list_entities(&self) -> CatalogResult<Vec<EntityMetadata>> {
        (**self).list_entities()
    }
}
