//! Turning paged raw features into a typed [`ResultSet`].
//!
//! One fetch cycle is:
//!
//! 1. `count` the matching features, then cap by `max_results`
//! 2. plan `(offset, limit)` windows of a fixed page size
//! 3. fetch each window, coercing every value to its field's type
//! 4. yield pages in offset order, reporting progress after each fetch
//!
//! Pages may be fetched concurrently; rows are always delivered in offset
//! order. Dropping the stream between pages abandons the cycle.

pub mod coerce;
mod plan;
mod progress;

use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use tracing::{debug, info, warn};

use crate::catalog::Field;
use crate::config::SearchSettings;
use crate::error::{SearchError, SearchResult};
use crate::fetch::{FeatureFetcher, RawRecord};
use crate::query::QueryRequest;
use crate::result::{ResultSet, Row, Value};

pub use coerce::coerce;
pub use plan::PagePlan;
pub use progress::{LogProgress, ProgressEvent, ProgressObserver};

use progress::ProgressCounter;

/// Records requested per page when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// One page of coerced rows.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledPage {
    /// Zero-based page index.
    pub index: usize,
    /// Offset of the first row within the full result.
    pub offset: usize,
    pub rows: Vec<Row>,
}

/// Lazy, finite sequence of pages in offset order.
pub type PageStream<'a> = BoxStream<'a, SearchResult<AssembledPage>>;

/// Rows fetched before a failure, together with that failure.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialResult {
    pub rows: ResultSet,
    pub error: Option<SearchError>,
}

impl PartialResult {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// The rows if the cycle completed, the error otherwise.
    pub fn into_result(self) -> SearchResult<ResultSet> {
        match self.error {
            None => Ok(self.rows),
            Some(err) => Err(err),
        }
    }
}

/// Drives fetch cycles against one [`FeatureFetcher`].
pub struct ResultAssembler<F> {
    fetcher: F,
    page_size: usize,
    concurrency: usize,
    observer: Option<Arc<dyn ProgressObserver>>,
}

impl<F: FeatureFetcher> ResultAssembler<F> {
    /// Sequential fetching with [`DEFAULT_PAGE_SIZE`].
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            page_size: DEFAULT_PAGE_SIZE,
            concurrency: 1,
            observer: None,
        }
    }

    pub fn from_settings(fetcher: F, settings: &SearchSettings) -> Self {
        Self::new(fetcher)
            .with_page_size(settings.page_size)
            .with_concurrency(settings.concurrency)
    }

    /// Records per page; zero is treated as 1.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Maximum pages in flight; zero is treated as 1.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_observer(mut self, observer: impl ProgressObserver + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Count the matches and plan the pages for `request`.
    pub async fn plan(&self, request: &QueryRequest) -> SearchResult<PagePlan> {
        let count = self.fetcher.count(request).await?;
        Ok(PagePlan::new(count, request.max_results(), self.page_size))
    }

    /// Start a fetch cycle. Only `count` runs before this returns.
    pub async fn stream<'a>(&'a self, request: &'a QueryRequest) -> SearchResult<PageStream<'a>> {
        let plan = self.plan(request).await?;
        info!(
            feature_type = request.feature_type(),
            total = plan.total(),
            page_size = plan.page_size(),
            pages = plan.len(),
            "starting fetch cycle"
        );

        let fetcher = &self.fetcher;
        let progress = Arc::new(ProgressCounter::new(plan.len(), self.observer.clone()));
        let columns = request.columns();

        let pages = stream::iter(plan.pages().enumerate())
            .map(move |(index, (offset, limit))| {
                let progress = Arc::clone(&progress);
                let columns = Arc::clone(&columns);
                async move {
                    let page = fetcher.fetch_page(request, offset, limit).await.map_err(|e| {
                        warn!(offset, limit, error = %e, "page fetch failed");
                        e
                    })?;

                    // Services may ignore the limit.
                    let rows: Vec<Row> = page
                        .records
                        .iter()
                        .take(limit)
                        .map(|record| to_row(record, request.selection(), &columns))
                        .collect();

                    let missing = rows
                        .iter()
                        .flat_map(|r| r.values())
                        .filter(|v| v.is_missing())
                        .count();
                    debug!(offset, rows = rows.len(), missing, "assembled page");

                    progress.advance();
                    Ok::<_, SearchError>(AssembledPage {
                        index,
                        offset,
                        rows,
                    })
                }
            })
            .buffered(self.concurrency);

        Ok(pages.boxed())
    }

    /// Run a full cycle; any fetch error fails the whole call.
    pub async fn assemble(&self, request: &QueryRequest) -> SearchResult<ResultSet> {
        let mut pages = self.stream(request).await?;
        let mut result = ResultSet::new(request.columns());
        while let Some(page) = pages.try_next().await? {
            result.extend(page.rows);
        }
        Ok(result)
    }

    /// Run a full cycle, keeping the rows of pages fetched before a failure.
    pub async fn assemble_partial(&self, request: &QueryRequest) -> PartialResult {
        let mut result = ResultSet::new(request.columns());
        let mut pages = match self.stream(request).await {
            Ok(pages) => pages,
            Err(error) => {
                return PartialResult {
                    rows: result,
                    error: Some(error),
                }
            }
        };

        while let Some(page) = pages.next().await {
            match page {
                Ok(page) => result.extend(page.rows),
                Err(error) => {
                    info!(kept = result.len(), "fetch cycle aborted");
                    return PartialResult {
                        rows: result,
                        error: Some(error),
                    };
                }
            }
        }

        PartialResult {
            rows: result,
            error: None,
        }
    }
}

/// Coerce the selected fields of one record, in selection order.
fn to_row(record: &RawRecord, selection: &[Field], columns: &Arc<[String]>) -> Row {
    let values: Vec<Value> = selection
        .iter()
        .map(|field| {
            let raw = record.get(&field.name);
            let value = coerce(raw, field.data_type);
            if value.is_missing() {
                debug!(
                    field = %field.name,
                    expected = %field.data_type,
                    raw = ?raw,
                    "value not coercible"
                );
            }
            value
        })
        .collect();
    Row::new(Arc::clone(columns), values)
}
