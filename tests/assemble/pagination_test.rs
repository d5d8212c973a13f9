use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::json;
use wfs_search::assemble::{ProgressEvent, ResultAssembler};
use wfs_search::catalog::{DataType, Field, FieldCatalog};
use wfs_search::fetch::{FeatureFetcher, FeaturePage, FetchCall, MemoryFetcher, RawRecord};
use wfs_search::query::build;
use wfs_search::{QueryRequest, SearchError, SearchResult, Value};

fn catalog() -> FieldCatalog {
    FieldCatalog::new(
        "dov-pub:Boringen",
        vec![
            Field::new("id", DataType::Integer),
            Field::new("boornummer", DataType::String),
        ],
    )
    .unwrap()
}

fn records(n: usize) -> Vec<RawRecord> {
    (0..n)
        .map(|i| {
            json!({"id": i, "boornummer": format!("B{:03}", i)})
                .as_object()
                .cloned()
                .unwrap()
        })
        .collect()
}

fn request(max_results: Option<usize>) -> QueryRequest {
    build(&catalog(), None, max_results, None).unwrap()
}

fn ids(rows: &wfs_search::ResultSet) -> Vec<i64> {
    rows.column("id")
        .unwrap()
        .into_iter()
        .map(|v| match v {
            Value::Integer(i) => *i,
            other => panic!("unexpected value {:?}", other),
        })
        .collect()
}

#[tokio::test]
async fn test_pages_cover_count_without_gaps() {
    let assembler = ResultAssembler::new(MemoryFetcher::new(records(25))).with_page_size(10);

    let rows = assembler.assemble(&request(None)).await.unwrap();

    assert_eq!(
        assembler.fetcher().page_calls(),
        vec![(0, 10), (10, 10), (20, 5)]
    );
    assert_eq!(rows.len(), 25);
    assert_eq!(ids(&rows), (0..25).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_cap_limits_rows_and_requests() {
    let assembler = ResultAssembler::new(MemoryFetcher::new(records(1000))).with_page_size(10);

    let rows = assembler.assemble(&request(Some(7))).await.unwrap();

    assert_eq!(rows.len(), 7);
    assert_eq!(assembler.fetcher().page_calls(), vec![(0, 7)]);
}

#[tokio::test]
async fn test_cap_above_count() {
    let assembler = ResultAssembler::new(MemoryFetcher::new(records(12))).with_page_size(5);

    let rows = assembler.assemble(&request(Some(500))).await.unwrap();

    assert_eq!(rows.len(), 12);
    assert_eq!(assembler.fetcher().page_calls(), vec![(0, 5), (5, 5), (10, 2)]);
}

#[tokio::test]
async fn test_no_matches_no_pages() {
    let assembler = ResultAssembler::new(MemoryFetcher::new(Vec::new()));

    let rows = assembler.assemble(&request(None)).await.unwrap();

    assert!(rows.is_empty());
    assert_eq!(rows.columns(), &["id".to_string(), "boornummer".to_string()]);
    assert_eq!(assembler.fetcher().calls(), vec![FetchCall::Count]);
}

#[tokio::test]
async fn test_progress_counts_pages() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let assembler = ResultAssembler::new(MemoryFetcher::new(records(25)))
        .with_page_size(10)
        .with_observer(move |e: ProgressEvent| sink.lock().unwrap().push(e));

    assembler.assemble(&request(None)).await.unwrap();

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            ProgressEvent { completed: 1, total: 3 },
            ProgressEvent { completed: 2, total: 3 },
            ProgressEvent { completed: 3, total: 3 },
        ]
    );
}

#[tokio::test]
async fn test_fetch_page_is_idempotent() {
    let fetcher = MemoryFetcher::new(records(25));
    let request = request(None);

    let first = fetcher.fetch_page(&request, 10, 10).await.unwrap();
    let second = fetcher.fetch_page(&request, 10, 10).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.offset, 10);
    assert_eq!(first.len(), 10);
}

#[tokio::test]
async fn test_fetch_error_fails_whole_call() {
    let fetcher = MemoryFetcher::new(records(25))
        .fail_at(20, SearchError::Transport("connection reset".to_string()));
    let assembler = ResultAssembler::new(fetcher).with_page_size(10);

    let err = assembler.assemble(&request(None)).await.unwrap_err();

    assert_eq!(err, SearchError::Transport("connection reset".to_string()));
    assert!(err.is_fetch());
}

#[tokio::test]
async fn test_partial_result_keeps_earlier_pages() {
    let fetcher = MemoryFetcher::new(records(25)).fail_at(
        20,
        SearchError::service("OperationProcessingFailed", "too many features"),
    );
    let assembler = ResultAssembler::new(fetcher).with_page_size(10);

    let partial = assembler.assemble_partial(&request(None)).await;

    assert!(!partial.is_complete());
    assert_eq!(partial.rows.len(), 20);
    assert_eq!(ids(&partial.rows), (0..20).collect::<Vec<_>>());
    assert!(matches!(partial.error, Some(SearchError::Service { .. })));
}

#[tokio::test]
async fn test_partial_result_complete() {
    let assembler = ResultAssembler::new(MemoryFetcher::new(records(3))).with_page_size(2);

    let partial = assembler.assemble_partial(&request(None)).await;

    assert!(partial.is_complete());
    assert_eq!(partial.into_result().unwrap().len(), 3);
}

#[tokio::test]
async fn test_abandoned_stream_stops_fetching() {
    let assembler = ResultAssembler::new(MemoryFetcher::new(records(25))).with_page_size(10);
    let request = request(None);

    {
        let mut pages = assembler.stream(&request).await.unwrap();
        let first = pages.next().await.unwrap().unwrap();
        assert_eq!(first.index, 0);
        assert_eq!(first.rows.len(), 10);
    }

    assert_eq!(assembler.fetcher().page_calls(), vec![(0, 10)]);
}

/// Later pages answer sooner, so completion order is the reverse of offset order.
struct ReversedLatency {
    inner: MemoryFetcher,
    in_flight: Mutex<(usize, usize)>,
}

impl ReversedLatency {
    fn new(inner: MemoryFetcher) -> Self {
        Self {
            inner,
            in_flight: Mutex::new((0, 0)),
        }
    }

    fn max_in_flight(&self) -> usize {
        self.in_flight.lock().unwrap().1
    }
}

#[async_trait]
impl FeatureFetcher for ReversedLatency {
    async fn count(&self, request: &QueryRequest) -> SearchResult<usize> {
        self.inner.count(request).await
    }

    async fn fetch_page(
        &self,
        request: &QueryRequest,
        offset: usize,
        limit: usize,
    ) -> SearchResult<FeaturePage> {
        {
            let mut guard = self.in_flight.lock().unwrap();
            guard.0 += 1;
            guard.1 = guard.1.max(guard.0);
        }
        tokio::time::sleep(Duration::from_millis(50u64.saturating_sub(offset as u64))).await;
        let page = self.inner.fetch_page(request, offset, limit).await;
        self.in_flight.lock().unwrap().0 -= 1;
        page
    }
}

#[tokio::test]
async fn test_concurrency_keeps_offset_order() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let assembler = ResultAssembler::new(ReversedLatency::new(MemoryFetcher::new(records(45))))
        .with_page_size(10)
        .with_concurrency(4)
        .with_observer(move |e: ProgressEvent| sink.lock().unwrap().push(e.completed));

    let rows = assembler.assemble(&request(None)).await.unwrap();

    assert_eq!(ids(&rows), (0..45).collect::<Vec<_>>());
    assert!(assembler.fetcher().max_in_flight() > 1);
    assert!(assembler.fetcher().max_in_flight() <= 4);
    assert_eq!(*events.lock().unwrap(), vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_sequential_and_concurrent_agree() {
    let request = request(Some(33));
    let sequential = ResultAssembler::new(MemoryFetcher::new(records(40)))
        .with_page_size(7)
        .assemble(&request)
        .await
        .unwrap();
    let concurrent = ResultAssembler::new(MemoryFetcher::new(records(40)))
        .with_page_size(7)
        .with_concurrency(3)
        .assemble(&request)
        .await
        .unwrap();

    assert_eq!(sequential, concurrent);
    assert_eq!(sequential.len(), 33);
}
