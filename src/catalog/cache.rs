//! Session-scoped cache of loaded catalogs.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use super::catalog::FieldCatalog;
use super::source::CatalogSource;
use crate::error::SearchResult;

/// Caches one [`FieldCatalog`] per feature type for the lifetime of a session.
///
/// Catalogs are immutable, so they are handed out as shared `Arc`s.
#[derive(Debug, Default)]
pub struct CatalogCache {
    entries: DashMap<String, Arc<FieldCatalog>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached catalog, loading it from `source` on first use.
    ///
    /// Failed loads are not cached.
    pub async fn get_or_load<S>(&self, source: &S, feature_type: &str) -> SearchResult<Arc<FieldCatalog>>
    where
        S: CatalogSource + ?Sized,
    {
        if let Some(hit) = self.get(feature_type) {
            debug!(feature_type, "catalog cache hit");
            return Ok(hit);
        }

        let loaded = Arc::new(FieldCatalog::load(source, feature_type).await?);

        // Concurrent loaders may race; the first insert wins.
        let entry = self
            .entries
            .entry(feature_type.to_string())
            .or_insert(loaded);
        Ok(Arc::clone(entry.value()))
    }

    pub fn get(&self, feature_type: &str) -> Option<Arc<FieldCatalog>> {
        self.entries.get(feature_type).map(|e| Arc::clone(e.value()))
    }

    pub fn insert(&self, catalog: FieldCatalog) -> Arc<FieldCatalog> {
        let catalog = Arc::new(catalog);
        self.entries
            .insert(catalog.feature_type().to_string(), Arc::clone(&catalog));
        catalog
    }

    pub fn invalidate(&self, feature_type: &str) -> bool {
        self.entries.remove(feature_type).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
