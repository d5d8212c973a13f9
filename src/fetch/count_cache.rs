//! Count memoization per request content.

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use super::{FeatureFetcher, FeaturePage};
use crate::error::SearchResult;
use crate::query::QueryRequest;

/// Wraps a fetcher and caches `count` results by [`QueryRequest::count_key`].
///
/// Counting may be expensive on the remote side; the same predicate against
/// the same feature type is counted once per cache lifetime. Failed counts
/// are not cached. Pages are always passed through.
#[derive(Debug)]
pub struct CountCache<F> {
    inner: F,
    counts: DashMap<String, usize>,
}

impl<F> CountCache<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            counts: DashMap::new(),
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    pub fn clear(&self) {
        self.counts.clear();
    }
}

#[async_trait]
impl<F: FeatureFetcher> FeatureFetcher for CountCache<F> {
    async fn count(&self, request: &QueryRequest) -> SearchResult<usize> {
        let key = request.count_key();
        if let Some(hit) = self.counts.get(&key) {
            debug!(feature_type = request.feature_type(), "count cache hit");
            return Ok(*hit);
        }

        let count = self.inner.count(request).await?;
        self.counts.insert(key, count);
        Ok(count)
    }

    async fn fetch_page(
        &self,
        request: &QueryRequest,
        offset: usize,
        limit: usize,
    ) -> SearchResult<FeaturePage> {
        self.inner.fetch_page(request, offset, limit).await
    }
}
