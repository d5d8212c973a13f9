use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use wfs_search::catalog::{CatalogCache, CatalogSource, FieldCatalog, StaticCatalogSource};
use wfs_search::{SearchError, SearchResult};

const DOC: &str = r#"{"fields": [{"name": "naam", "type": "string"}]}"#;

/// Counts describe calls and fails on demand.
struct CountingSource {
    calls: AtomicUsize,
    fail: bool,
}

impl CountingSource {
    fn new(fail: bool) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail,
        }
    }
}

#[async_trait]
impl CatalogSource for CountingSource {
    async fn describe(&self, _feature_type: &str) -> SearchResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(SearchError::Transport("connection reset".to_string()))
        } else {
            Ok(DOC.to_string())
        }
    }
}

#[tokio::test]
async fn test_loads_once_per_feature_type() {
    let source = CountingSource::new(false);
    let cache = CatalogCache::new();

    let first = cache.get_or_load(&source, "a").await.unwrap();
    let second = cache.get_or_load(&source, "a").await.unwrap();
    cache.get_or_load(&source, "b").await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    assert_eq!(cache.len(), 2);
}

#[tokio::test]
async fn test_failed_load_is_not_cached() {
    let source = CountingSource::new(true);
    let cache = CatalogCache::new();

    let err = cache.get_or_load(&source, "a").await.unwrap_err();
    assert!(matches!(
        err,
        SearchError::CatalogUnavailable { ref reason, .. } if reason.contains("connection reset")
    ));

    assert!(cache.get_or_load(&source, "a").await.is_err());
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_invalidate_forces_reload() {
    let source = CountingSource::new(false);
    let cache = CatalogCache::new();

    cache.get_or_load(&source, "a").await.unwrap();
    assert!(cache.invalidate("a"));
    assert!(!cache.invalidate("a"));
    cache.get_or_load(&source, "a").await.unwrap();

    assert_eq!(source.calls.load(Ordering::SeqCst), 2);

    cache.clear();
    assert!(cache.get("a").is_none());
}

#[tokio::test]
async fn test_static_source() {
    let source = StaticCatalogSource::new().with_document("dov-pub:Boringen", DOC);

    let catalog = FieldCatalog::load(&source, "dov-pub:Boringen").await.unwrap();
    assert_eq!(catalog.len(), 1);

    let err = FieldCatalog::load(&source, "dov-pub:Sonderingen").await.unwrap_err();
    assert!(matches!(err, SearchError::CatalogUnavailable { .. }));
}

#[tokio::test]
async fn test_insert_preloaded() {
    let cache = CatalogCache::new();
    let catalog = FieldCatalog::from_document("t", DOC).unwrap();

    cache.insert(catalog);

    // No source call needed once inserted.
    let source = CountingSource::new(true);
    assert!(cache.get_or_load(&source, "t").await.is_ok());
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}
