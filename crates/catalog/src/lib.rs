// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Unified Query - Catalog Layer
//!
//! This crate maps logical target names to physical entities. It defines the
//! [`EntityCatalog`] trait and two implementations:
//!
//! - **Static Catalogs**: Entity definitions built in code or loaded from
//!   YAML/JSON
//! - **Cached Catalogs**: Wrapper memoizing another catalog's answers with a
//!   read-mostly, copy-on-miss table
//!
//! ## Architecture
//!
//! The catalog is owned by the host and passed explicitly into the
//! compiler. There is no process-wide registry: dropping the catalog drops
//! its cache, and [`CachedCatalog::invalidate`] clears it on schema reload.
//!
//! Lookups are keyed by `(scope, name)`. The scope names the module or
//! persistence unit the name is resolved in, so the same logical name can
//! map to different entities in different units.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use unified_query_catalog::{CachedCatalog, EntityCatalog, StaticCatalog};
//! use unified_query_ir::EntityMetadata;
//!
//! let catalog = CachedCatalog::new(
//!     StaticCatalog::new().with_entity(EntityMetadata::new("order", "PurchaseOrder")),
//! );
//! let entity = catalog.resolve("default", "order")?;
//! assert_eq!(entity.entity_name, "PurchaseOrder");
//! ```

pub mod cached;
pub mod error;
pub mod r#static;
pub mod r#trait;

// Re-exports
pub use cached::CachedCatalog;
pub use error::{CatalogError, CatalogResult};
pub use r#static::StaticCatalog;
pub use r#trait::EntityCatalog;
pub use unified_query_ir::{AttributeMetadata, EntityMetadata};
