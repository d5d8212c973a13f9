//! # wfs-search
//!
//! Field-based search against a paginated feature service.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │          FieldCatalog (fields of one feature type)       │
//! │      (name, type, queryable, cost, source attribute)     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [QueryBuilder: validate + render filter]
//! ┌─────────────────────────────────────────────────────────┐
//! │                     QueryRequest                         │
//! │     (predicate, OGC filter XML, cap, selected fields)    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [FeatureFetcher: count + fetch_page]
//! ┌─────────────────────────────────────────────────────────┐
//! │                Raw pages (offset order)                  │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [ResultAssembler: coerce + concatenate]
//! ┌─────────────────────────────────────────────────────────┐
//! │                      ResultSet                           │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation is local and happens before any call to the service; fetch
//! errors come from the service and end the cycle.

pub mod assemble;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod query;
pub mod result;
pub mod search;
pub mod worker;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::assemble::{
        LogProgress, PagePlan, PartialResult, ProgressEvent, ProgressObserver, ResultAssembler,
    };
    pub use crate::catalog::{CatalogCache, CatalogSource, DataType, Field, FieldCatalog};
    pub use crate::error::{SearchError, SearchResult};
    pub use crate::fetch::{FeatureFetcher, FeaturePage, MemoryFetcher, RawRecord};
    pub use crate::filter::{field, parse_query, ComparisonOp, Literal, Predicate};
    pub use crate::query::{QueryBuilder, QueryRequest};
    pub use crate::result::{ResultSet, Row, Value};
    pub use crate::search::FeatureSearch;
}

// Also export at crate root for convenience
pub use catalog::{DataType, Field, FieldCatalog};
pub use error::{SearchError, SearchResult};
pub use filter::{field, Predicate};
pub use query::{QueryBuilder, QueryRequest};
pub use result::{ResultSet, Row, Value};
pub use search::FeatureSearch;
