//! Loading field catalogs from a remote description.

use async_trait::async_trait;
use tracing::info;

use super::catalog::FieldCatalog;
use crate::error::{SearchError, SearchResult};

/// Anything that can produce the JSON field description of a feature type.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the raw description document for `feature_type`.
    async fn describe(&self, feature_type: &str) -> SearchResult<String>;
}

impl FieldCatalog {
    /// Retrieve and parse the description of `feature_type`.
    ///
    /// Any failure, network or parse, surfaces as `CatalogUnavailable`.
    pub async fn load<S>(source: &S, feature_type: &str) -> SearchResult<FieldCatalog>
    where
        S: CatalogSource + ?Sized,
    {
        let document = source.describe(feature_type).await.map_err(|e| match e {
            SearchError::CatalogUnavailable { .. } => e,
            other => SearchError::catalog_unavailable(feature_type, other.to_string()),
        })?;

        let catalog = FieldCatalog::from_document(feature_type, &document)?;
        info!(
            feature_type,
            fields = catalog.len(),
            queryable = catalog.queryable().count(),
            "loaded field catalog"
        );
        Ok(catalog)
    }
}

/// A source backed by fixed documents, keyed by feature type.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogSource {
    documents: std::collections::HashMap<String, String>,
}

impl StaticCatalogSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, feature_type: impl Into<String>, document: impl Into<String>) -> Self {
        self.documents.insert(feature_type.into(), document.into());
        self
    }
}

#[async_trait]
impl CatalogSource for StaticCatalogSource {
    async fn describe(&self, feature_type: &str) -> SearchResult<String> {
        self.documents
            .get(feature_type)
            .cloned()
            .ok_or_else(|| SearchError::catalog_unavailable(feature_type, "no description available"))
    }
}
