//! Worker communication module.
//!
//! The crate itself does not speak WFS. A long-running worker process does
//! the HTTP and XML/GML work and answers three methods: `catalog.describe`,
//! `features.count` and `features.page`.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    wfs-search (Rust + Tokio)                    │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │        WorkerFeatureFetcher (CatalogSource + Fetcher)     │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │                    WorkerClient (Async)                   │  │
//! │  │  - Spawns the worker as child process                     │  │
//! │  │  - NDJSON protocol over stdin/stdout                      │  │
//! │  │  - Request IDs for concurrent request correlation         │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! │               stdin (NDJSON) │ stdout (NDJSON)                  │
//! └──────────────────────────────┼──────────────────────────────────┘
//!                                ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │          Worker (Long-Running Child Process) ── HTTP ──► WFS    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use wfs_search::worker::{WorkerClient, WorkerFeatureFetcher};
//!
//! let client = WorkerClient::spawn("./wfs-worker").await?;
//! let fetcher = WorkerFeatureFetcher::new(client, "https://www.dov.vlaanderen.be/geoserver/wfs");
//!
//! let catalog = FieldCatalog::load(&fetcher, "dov-pub:Boringen").await?;
//!
//! // Client is automatically shut down on drop
//! ```

mod client;
mod error;
mod fetcher;
pub mod protocol;

pub use client::WorkerClient;
pub use error::{WorkerError, WorkerResult};
pub use fetcher::WorkerFeatureFetcher;
