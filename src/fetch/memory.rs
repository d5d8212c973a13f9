//! In-memory feature source.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value as Json;

use super::{FeatureFetcher, FeaturePage, RawRecord};
use crate::error::{SearchError, SearchResult};
use crate::filter::Predicate;
use crate::query::QueryRequest;

/// A call observed by [`MemoryFetcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchCall {
    Count,
    Page { offset: usize, limit: usize },
}

/// Serves a fixed set of records, evaluating predicates locally.
///
/// Records keep their insertion order, so paging is deterministic. Every
/// call is recorded, and a failure can be injected for a given page offset.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    records: Vec<RawRecord>,
    fail_at: Option<(usize, SearchError)>,
    calls: Mutex<Vec<FetchCall>>,
}

impl MemoryFetcher {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self {
            records,
            fail_at: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Load records from JSON.
    ///
    /// Accepts either an array of objects or a GeoJSON-style
    /// `{"features": [{"properties": {...}}]}` collection.
    pub fn from_json(json: &str) -> SearchResult<Self> {
        let parsed: Json =
            serde_json::from_str(json).map_err(|e| SearchError::Transport(e.to_string()))?;

        let items = match parsed {
            Json::Array(items) => items,
            Json::Object(mut map) => match map.remove("features") {
                Some(Json::Array(features)) => features
                    .into_iter()
                    .map(|f| match f {
                        Json::Object(mut feature) => {
                            feature.remove("properties").unwrap_or(Json::Object(feature))
                        }
                        other => other,
                    })
                    .collect(),
                _ => {
                    return Err(SearchError::Transport(
                        "expected an array or a 'features' collection".to_string(),
                    ))
                }
            },
            _ => {
                return Err(SearchError::Transport(
                    "expected an array or a 'features' collection".to_string(),
                ))
            }
        };

        let records = items
            .into_iter()
            .map(|item| match item {
                Json::Object(record) => Ok(record),
                other => Err(SearchError::Transport(format!(
                    "feature is not an object: {}",
                    other
                ))),
            })
            .collect::<SearchResult<Vec<_>>>()?;

        Ok(Self::new(records))
    }

    /// Fail the page fetch starting at `offset` with `error`.
    pub fn fail_at(mut self, offset: usize, error: SearchError) -> Self {
        self.fail_at = Some((offset, error));
        self
    }

    pub fn calls(&self) -> Vec<FetchCall> {
        self.lock_calls().clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock_calls().len()
    }

    pub fn page_calls(&self) -> Vec<(usize, usize)> {
        self.lock_calls()
            .iter()
            .filter_map(|c| match c {
                FetchCall::Page { offset, limit } => Some((*offset, *limit)),
                FetchCall::Count => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<FetchCall>> {
        // A poisoned log is still a valid log.
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn matching<'a>(&'a self, request: &'a QueryRequest) -> impl Iterator<Item = &'a RawRecord> + 'a {
        let matcher = request.predicate().map(Predicate::matcher);
        self.records
            .iter()
            .filter(move |r| matcher.as_ref().map_or(true, |m| m.matches(r)))
    }
}

#[async_trait]
impl FeatureFetcher for MemoryFetcher {
    async fn count(&self, request: &QueryRequest) -> SearchResult<usize> {
        self.lock_calls().push(FetchCall::Count);
        Ok(self.matching(request).count())
    }

    async fn fetch_page(
        &self,
        request: &QueryRequest,
        offset: usize,
        limit: usize,
    ) -> SearchResult<FeaturePage> {
        self.lock_calls().push(FetchCall::Page { offset, limit });

        if let Some((fail_offset, error)) = &self.fail_at {
            if *fail_offset == offset {
                return Err(error.clone());
            }
        }

        let records = self
            .matching(request)
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        Ok(FeaturePage::new(offset, records))
    }
}
