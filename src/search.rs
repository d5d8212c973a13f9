//! One-stop search against a single feature type.

use std::sync::Arc;

use crate::assemble::{PartialResult, ProgressObserver, ResultAssembler};
use crate::catalog::{CatalogCache, CatalogSource, Field, FieldCatalog};
use crate::config::Settings;
use crate::error::SearchResult;
use crate::fetch::FeatureFetcher;
use crate::filter::{parse_query, Predicate};
use crate::query::{build, QueryRequest};
use crate::result::ResultSet;

/// Binds a catalog, a fetcher and the search settings.
///
/// # Example
///
/// ```ignore
/// let search = FeatureSearch::open(fetcher, "dov-pub:Boringen", &settings, &cache).await?;
/// let rows = search
///     .search(Some(field("boornummer").like("KART_PROF_%")), Some(10), None)
///     .await?;
/// ```
pub struct FeatureSearch<F> {
    catalog: Arc<FieldCatalog>,
    assembler: ResultAssembler<F>,
    default_max_results: Option<usize>,
}

impl<F: FeatureFetcher> FeatureSearch<F> {
    /// Search with default settings.
    pub fn new(catalog: impl Into<Arc<FieldCatalog>>, fetcher: F) -> Self {
        Self::with_settings(catalog, fetcher, &Settings::default())
    }

    pub fn with_settings(
        catalog: impl Into<Arc<FieldCatalog>>,
        fetcher: F,
        settings: &Settings,
    ) -> Self {
        Self {
            catalog: catalog.into(),
            assembler: ResultAssembler::from_settings(fetcher, &settings.search),
            default_max_results: settings.search.default_max_results,
        }
    }

    /// Load the catalog of `feature_type` from the fetcher itself.
    ///
    /// The catalog goes through `cache` when `catalog.cache_enabled` is set.
    pub async fn open(
        fetcher: F,
        feature_type: &str,
        settings: &Settings,
        cache: &CatalogCache,
    ) -> SearchResult<Self>
    where
        F: CatalogSource,
    {
        let catalog = if settings.catalog.cache_enabled {
            cache.get_or_load(&fetcher, feature_type).await?
        } else {
            Arc::new(FieldCatalog::load(&fetcher, feature_type).await?)
        };
        Ok(Self::with_settings(catalog, fetcher, settings))
    }

    pub fn with_observer(mut self, observer: impl ProgressObserver + 'static) -> Self {
        self.assembler = self.assembler.with_observer(observer);
        self
    }

    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    /// All fields of the feature type, in catalog order.
    pub fn fields(&self) -> &[Field] {
        self.catalog.list()
    }

    pub fn assembler(&self) -> &ResultAssembler<F> {
        &self.assembler
    }

    /// Validate a search; falls back to `search.default_max_results` when no cap is given.
    pub fn build(
        &self,
        predicate: Option<Predicate>,
        max_results: Option<usize>,
        fields: Option<Vec<String>>,
    ) -> SearchResult<QueryRequest> {
        build(
            &self.catalog,
            predicate,
            max_results.or(self.default_max_results),
            fields,
        )
    }

    pub async fn search(
        &self,
        predicate: Option<Predicate>,
        max_results: Option<usize>,
        fields: Option<Vec<String>>,
    ) -> SearchResult<ResultSet> {
        let request = self.build(predicate, max_results, fields)?;
        self.assembler.assemble(&request).await
    }

    /// Like [`search`](Self::search), keeping rows fetched before a failure.
    ///
    /// Validation errors still fail the whole call.
    pub async fn search_partial(
        &self,
        predicate: Option<Predicate>,
        max_results: Option<usize>,
        fields: Option<Vec<String>>,
    ) -> SearchResult<PartialResult> {
        let request = self.build(predicate, max_results, fields)?;
        Ok(self.assembler.assemble_partial(&request).await)
    }

    /// Search with a query string such as `naam like 'KART_PROF_%', diepte > 20`.
    pub async fn search_str(
        &self,
        query: &str,
        max_results: Option<usize>,
        fields: Option<Vec<String>>,
    ) -> SearchResult<ResultSet> {
        let predicate = parse_query(query, &self.catalog)?;
        self.search(predicate, max_results, fields).await
    }
}
