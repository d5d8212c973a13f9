//! [`FeatureFetcher`] and [`CatalogSource`] backed by a worker process.

use async_trait::async_trait;
use tracing::debug;

use super::client::WorkerClient;
use super::protocol::{
    methods, CountParams, CountResponse, DescribeParams, DescribeResponse, PageParams,
    PageResponse, ServiceParams,
};
use crate::catalog::{CatalogSource, Field};
use crate::error::{SearchError, SearchResult};
use crate::fetch::{FeatureFetcher, FeaturePage, RawRecord};
use crate::query::QueryRequest;

/// Talks to one feature service through a [`WorkerClient`].
///
/// Requests name attributes by their source names; returned records are
/// re-keyed to catalog field names before they reach the assembler.
pub struct WorkerFeatureFetcher {
    client: WorkerClient,
    service: ServiceParams,
}

impl WorkerFeatureFetcher {
    pub fn new(client: WorkerClient, url: impl Into<String>) -> Self {
        Self {
            client,
            service: ServiceParams {
                url: url.into(),
                version: None,
            },
        }
    }

    /// Pin the protocol version the worker should use.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.service.version = Some(version.into());
        self
    }

    pub fn client(&self) -> &WorkerClient {
        &self.client
    }

    pub fn url(&self) -> &str {
        &self.service.url
    }
}

#[async_trait]
impl CatalogSource for WorkerFeatureFetcher {
    async fn describe(&self, feature_type: &str) -> SearchResult<String> {
        let response: DescribeResponse = self
            .client
            .request(
                methods::DESCRIBE,
                DescribeParams {
                    service: self.service.clone(),
                    feature_type: feature_type.to_string(),
                },
            )
            .await?;

        serde_json::to_string(&response.catalog)
            .map_err(|e| SearchError::catalog_unavailable(feature_type, e.to_string()))
    }
}

#[async_trait]
impl FeatureFetcher for WorkerFeatureFetcher {
    async fn count(&self, request: &QueryRequest) -> SearchResult<usize> {
        let response: CountResponse = self
            .client
            .request(
                methods::COUNT,
                CountParams {
                    service: self.service.clone(),
                    feature_type: request.feature_type().to_string(),
                    filter: request.filter_xml().map(str::to_string),
                },
            )
            .await?;
        Ok(response.count)
    }

    async fn fetch_page(
        &self,
        request: &QueryRequest,
        offset: usize,
        limit: usize,
    ) -> SearchResult<FeaturePage> {
        let response: PageResponse = self
            .client
            .request(
                methods::PAGE,
                PageParams {
                    service: self.service.clone(),
                    feature_type: request.feature_type().to_string(),
                    filter: request.filter_xml().map(str::to_string),
                    property_names: request
                        .property_names()
                        .into_iter()
                        .map(str::to_string)
                        .collect(),
                    offset,
                    limit,
                },
            )
            .await?;

        debug!(offset, limit, received = response.features.len(), "worker page");

        let records = response
            .features
            .into_iter()
            .map(|record| rekey(record, request.selection()))
            .collect();
        Ok(FeaturePage::new(offset, records))
    }
}

/// Rename source attribute keys to catalog field names, dropping the rest.
fn rekey(mut record: RawRecord, selection: &[Field]) -> RawRecord {
    selection
        .iter()
        .filter_map(|field| {
            record
                .remove(field.source_name())
                .map(|value| (field.name.clone(), value))
        })
        .collect()
}
