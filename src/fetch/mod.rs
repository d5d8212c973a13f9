//! The feature service collaborator.
//!
//! The core needs exactly two things from a feature service: how many
//! features match a request, and a bounded window of those features in a
//! stable order. Everything about the wire protocol lives behind
//! [`FeatureFetcher`].
//!
//! # Implementations
//!
//! - [`MemoryFetcher`]: fixed records, predicates evaluated locally
//! - [`WorkerFeatureFetcher`](crate::worker::WorkerFeatureFetcher): an
//!   external worker process that talks to the real service
//! - [`CountCache`]: wraps any fetcher and remembers counts per request

mod count_cache;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SearchResult;
use crate::query::QueryRequest;

pub use count_cache::CountCache;
pub use memory::{FetchCall, MemoryFetcher};

/// One raw feature: attribute name to uncoerced value.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Raw records returned by a single `fetch_page` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeaturePage {
    /// Offset of the first record within the full result.
    pub offset: usize,
    pub records: Vec<RawRecord>,
}

impl FeaturePage {
    pub fn new(offset: usize, records: Vec<RawRecord>) -> Self {
        Self { offset, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Counting and paged retrieval against a feature service.
///
/// Failures surface as `SearchError::Transport` or `SearchError::Service`.
/// Retries, if any, are the implementation's concern.
#[async_trait]
pub trait FeatureFetcher: Send + Sync {
    /// Number of features matching the request's predicate, ignoring `max_results`.
    async fn count(&self, request: &QueryRequest) -> SearchResult<usize>;

    /// At most `limit` records starting at `offset`.
    ///
    /// The order must be repeatable across calls for the same request.
    async fn fetch_page(
        &self,
        request: &QueryRequest,
        offset: usize,
        limit: usize,
    ) -> SearchResult<FeaturePage>;
}

#[async_trait]
impl<F: FeatureFetcher + ?Sized> FeatureFetcher for Arc<F> {
    async fn count(&self, request: &QueryRequest) -> SearchResult<usize> {
        (**self).count(request).await
    }

    async fn fetch_page(
        &self,
        request: &QueryRequest,
        offset: usize,
        limit: usize,
    ) -> SearchResult<FeaturePage> {
        (**self).fetch_page(request, offset, limit).await
    }
}
