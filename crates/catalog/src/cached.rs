// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Cached Catalog
//!
//! [`CachedCatalog`] memoizes another catalog's answers, keyed by
//! `(scope, name)`.
//!
//! Reads take a shared lock just long enough to clone an `Arc` of the current
//! table. A miss asks the inner catalog without holding any lock, then
//! publishes a new table under the write lock. Readers holding an older
//! snapshot keep it unchanged.
//!
//! Failed lookups are not cached.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, trace};

use crate::{CatalogError, CatalogResult, EntityCatalog};
use unified_query_ir::EntityMetadata;

type EntityTable = HashMap<(String, String), EntityMetadata>;

/// Read-mostly, copy-on-miss cache in front of another catalog
#[derive(Debug)]
pub struct CachedCatalog<C> {
    inner: C,
    entries: RwLock<Arc<EntityTable>>,
}

impl<C: EntityCatalog> CachedCatalog<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            entries: RwLock::new(Arc::new(HashMap::new())),
        }
    }

    /// Current cache contents; later misses do not alter the returned table
    pub fn snapshot(&self) -> CatalogResult<Arc<EntityTable>> {
        let guard = self.entries.read().map_err(|_| CatalogError::LockPoisoned)?;
        Ok(Arc::clone(&*guard))
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.snapshot().map(|table| table.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached entry
    pub fn invalidate(&self) -> CatalogResult<()> {
        let mut guard = self.entries.write().map_err(|_| CatalogError::LockPoisoned)?;
        *guard = Arc::new(HashMap::new());
        debug!("Catalog cache invalidated");
        Ok(())
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: EntityCatalog> EntityCatalog for CachedCatalog<C> {
    fn resolve(&self, scope: &str, name: &str) -> CatalogResult<EntityMetadata> {
        let key = (scope.to_string(), name.to_string());
        if let Some(entity) = self.snapshot()?.get(&key) {
            trace!(scope, name, "Catalog cache hit");
            return Ok(entity.clone());
        }

        debug!(scope, name, "Catalog cache miss");
        let entity = self.inner.resolve(scope, name)?;

        let mut guard = self.entries.write().map_err(|_| CatalogError::LockPoisoned)?;
        // Another thread may have filled the entry while we were resolving
        if let Some(existing) = guard.get(&key) {
            return Ok(existing.clone());
        }
        Arc::make_mut(&mut *guard).insert(key, entity.clone());
        Ok(entity)
    }

    fn list_entities(&self) -> CatalogResult<Vec<EntityMetadata>> {
        self.inner.list_entities()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticCatalog;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct CountingCatalog {
        inner: StaticCatalog,
        lookups: AtomicUsize,
    }

    impl EntityCatalog for CountingCatalog {
        fn resolve(&self, scope: &str, name: &str) -> CatalogResult<EntityMetadata> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.resolve(scope, name)
        }

        fn list_entities(&self) -> CatalogResult<Vec<EntityMetadata>> {
            self.inner.list_entities()
        }
    }

    fn counting() -> CachedCatalog<CountingCatalog> {
        CachedCatalog::new(CountingCatalog {
            inner: StaticCatalog::new()
                .with_entity(EntityMetadata::new("order", "PurchaseOrder"))
                .with_scoped_entity("billing", EntityMetadata::new("order", "BillingOrder")),
            lookups: AtomicUsize::new(0),
        })
    }

    #[test]
    fn test_second_lookup_is_cached() {
        let catalog = counting();
        assert_eq!(catalog.resolve("default", "order").unwrap().entity_name, "PurchaseOrder");
        assert_eq!(catalog.resolve("default", "order").unwrap().entity_name, "PurchaseOrder");
        assert_eq!(catalog.inner().lookups.load(Ordering::SeqCst), 1);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_scope_is_part_of_the_key() {
        let catalog = counting();
        assert_eq!(catalog.resolve("default", "order").unwrap().entity_name, "PurchaseOrder");
        assert_eq!(catalog.resolve("billing", "order").unwrap().entity_name, "BillingOrder");
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_misses_are_not_cached() {
        let catalog = counting();
        assert!(catalog.resolve("default", "ghost").is_err());
        assert!(catalog.resolve("default", "ghost").is_err());
        assert_eq!(catalog.inner().lookups.load(Ordering::SeqCst), 2);
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_snapshot_is_stable() {
        let catalog = counting();
        let before = catalog.snapshot().unwrap();
        catalog.resolve("default", "order").unwrap();
        assert!(before.is_empty());
        assert_eq!(catalog.snapshot().unwrap().len(), 1);
    }

    #[test]
    fn test_invalidate() {
        let catalog = counting();
        catalog.resolve("default", "order").unwrap();
        catalog.invalidate().unwrap();
        assert!(catalog.is_empty());
        catalog.resolve("default", "order").unwrap();
        assert_eq!(catalog.inner().lookups.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_concurrent_readers() {
        let catalog = Arc::new(counting());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let catalog = Arc::clone(&catalog);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        assert_eq!(
                            catalog.resolve("default", "order").unwrap().entity_name,
                            "PurchaseOrder"
                        );
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(catalog.len(), 1);
        assert!(catalog.inner().lookups.load(Ordering::SeqCst) <= 8);
    }
}
