//! The validated, immutable description of one search.

use std::sync::Arc;

use serde::Serialize;

use super::fingerprint::compute_hash;
use crate::catalog::Field;
use crate::filter::Predicate;

/// A validated search request.
///
/// Only [`QueryBuilder`](super::QueryBuilder) constructs these, so every
/// field reference inside has already been checked against a catalog. A
/// request can be reused for any number of fetch cycles.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub(super) feature_type: String,
    pub(super) predicate: Option<Predicate>,
    pub(super) max_results: Option<usize>,
    pub(super) requested_fields: Option<Vec<String>>,
    /// Selected fields in catalog order.
    pub(super) selection: Arc<[Field]>,
    pub(super) columns: Arc<[String]>,
    pub(super) filter_xml: Option<String>,
}

#[derive(Serialize)]
struct CountKey<'a> {
    feature_type: &'a str,
    predicate: Option<&'a Predicate>,
}

#[derive(Serialize)]
struct RequestKey<'a> {
    feature_type: &'a str,
    predicate: Option<&'a Predicate>,
    max_results: Option<usize>,
    columns: &'a [String],
}

impl QueryRequest {
    pub fn feature_type(&self) -> &str {
        &self.feature_type
    }

    /// The filter; `None` matches every feature.
    pub fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    pub fn max_results(&self) -> Option<usize> {
        self.max_results
    }

    /// The field subset as given by the caller; `None` means all fields.
    pub fn requested_fields(&self) -> Option<&[String]> {
        self.requested_fields.as_deref()
    }

    /// Fields that make up each result row, in catalog order.
    pub fn selection(&self) -> &[Field] {
        &self.selection
    }

    /// Column names of the result, in catalog order.
    pub fn columns(&self) -> Arc<[String]> {
        Arc::clone(&self.columns)
    }

    /// Attribute names to ask the remote service for.
    pub fn property_names(&self) -> Vec<&str> {
        self.selection.iter().map(|f| f.source_name()).collect()
    }

    /// OGC filter XML rendered at build time, if there is a predicate.
    pub fn filter_xml(&self) -> Option<&str> {
        self.filter_xml.as_deref()
    }

    /// Identity of the matching feature set, ignoring the cap and the selection.
    pub fn count_key(&self) -> String {
        let key = CountKey {
            feature_type: &self.feature_type,
            predicate: self.predicate.as_ref(),
        };
        // Predicates only hold strings, numbers, bools and dates.
        compute_hash(&key).unwrap_or_else(|_| format!("{}:{:?}", self.feature_type, self.predicate))
    }

    /// Identity of the full request content.
    pub fn fingerprint(&self) -> String {
        let key = RequestKey {
            feature_type: &self.feature_type,
            predicate: self.predicate.as_ref(),
            max_results: self.max_results,
            columns: &self.columns,
        };
        compute_hash(&key).unwrap_or_else(|_| format!("{:?}", self))
    }
}
