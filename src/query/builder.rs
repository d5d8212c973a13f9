//! Validating construction of [`QueryRequest`]s.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use super::request::QueryRequest;
use crate::catalog::{DataType, Field, FieldCatalog};
use crate::error::{SearchError, SearchResult};
use crate::filter::{Literal, Predicate};

/// Builds [`QueryRequest`]s against one catalog.
///
/// Validation is purely local and runs in a fixed order, the first
/// violation winning:
///
/// 1. every leaf field exists in the catalog (`UnknownField`)
/// 2. every leaf field is queryable (`NotQueryable`)
/// 3. every literal fits its field's type, and ordering operators only
///    target ordered types (`TypeMismatch`)
/// 4. requested fields exist in the catalog (`UnknownField`)
///
/// followed by structural checks on the parameters (`InvalidParameter`).
///
/// # Example
///
/// ```ignore
/// let request = QueryBuilder::new(&catalog)
///     .filter(field("naam").like("KART_PROF_%"))
///     .max_results(10)
///     .fields(["naam", "x"])
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder<'a> {
    catalog: &'a FieldCatalog,
    predicate: Option<Predicate>,
    max_results: Option<usize>,
    requested_fields: Option<Vec<String>>,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(catalog: &'a FieldCatalog) -> Self {
        Self {
            catalog,
            predicate: None,
            max_results: None,
            requested_fields: None,
        }
    }

    /// Set the filter. Calling this again ANDs the predicates together.
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(match self.predicate.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }

    pub fn max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requested_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn build(self) -> SearchResult<QueryRequest> {
        build(
            self.catalog,
            self.predicate,
            self.max_results,
            self.requested_fields,
        )
    }
}

/// Validate the parts of a search and assemble them into a [`QueryRequest`].
pub fn build(
    catalog: &FieldCatalog,
    predicate: Option<Predicate>,
    max_results: Option<usize>,
    requested_fields: Option<Vec<String>>,
) -> SearchResult<QueryRequest> {
    if let Some(predicate) = &predicate {
        validate_predicate(catalog, predicate)?;
    }

    if let Some(requested) = &requested_fields {
        if let Some(unknown) = requested.iter().find(|name| !catalog.contains(name)) {
            return Err(SearchError::unknown_field(unknown.as_str()));
        }
    }

    if let Some(predicate) = &predicate {
        check_composites(predicate)?;
    }
    if max_results == Some(0) {
        return Err(SearchError::InvalidParameter(
            "max_results must be positive".to_string(),
        ));
    }

    let selection: Vec<Field> = match &requested_fields {
        None => catalog.list().to_vec(),
        Some(requested) => {
            let wanted: HashSet<&str> = requested.iter().map(String::as_str).collect();
            catalog
                .list()
                .iter()
                .filter(|f| wanted.contains(f.name.as_str()))
                .cloned()
                .collect()
        }
    };
    if selection.is_empty() {
        return Err(SearchError::InvalidParameter(
            "no fields selected".to_string(),
        ));
    }

    let columns: Vec<String> = selection.iter().map(|f| f.name.clone()).collect();
    let filter_xml = predicate.as_ref().map(|p| p.to_filter_xml(catalog));

    debug!(
        feature_type = catalog.feature_type(),
        columns = columns.len(),
        max_results = ?max_results,
        has_filter = predicate.is_some(),
        "built query request"
    );

    Ok(QueryRequest {
        feature_type: catalog.feature_type().to_string(),
        predicate,
        max_results,
        requested_fields,
        selection: Arc::from(selection),
        columns: Arc::from(columns),
        filter_xml,
    })
}

/// Rules 1-3, each over the whole tree before the next.
fn validate_predicate(catalog: &FieldCatalog, predicate: &Predicate) -> SearchResult<()> {
    let names = predicate.fields();

    for name in &names {
        catalog.get(name)?;
    }

    for name in &names {
        if !catalog.get(name)?.queryable {
            return Err(SearchError::not_queryable(*name));
        }
    }

    check_types(catalog, predicate)
}

fn check_types(catalog: &FieldCatalog, predicate: &Predicate) -> SearchResult<()> {
    match predicate {
        Predicate::Compare { field, op, value } => {
            let field = catalog.get(field)?;
            check_literal(field, value)?;
            check_ordered(field, op.is_ordering())
        }
        Predicate::Like { field, .. } => {
            let field = catalog.get(field)?;
            if field.data_type == DataType::String {
                Ok(())
            } else {
                Err(mismatch(field, "string pattern"))
            }
        }
        Predicate::Between { field, low, high } => {
            let field = catalog.get(field)?;
            check_literal(field, low)?;
            check_literal(field, high)?;
            check_ordered(field, true)
        }
        Predicate::IsNull { .. } => Ok(()),
        Predicate::And(items) | Predicate::Or(items) => {
            items.iter().try_for_each(|p| check_types(catalog, p))
        }
        Predicate::Not(inner) => check_types(catalog, inner),
    }
}

fn check_literal(field: &Field, literal: &Literal) -> SearchResult<()> {
    if literal.fits(field.data_type) {
        Ok(())
    } else {
        Err(mismatch(field, literal.data_type().as_str()))
    }
}

fn check_ordered(field: &Field, ordering: bool) -> SearchResult<()> {
    if ordering && !field.data_type.is_ordered() {
        Err(mismatch(field, "ordered comparison"))
    } else {
        Ok(())
    }
}

fn mismatch(field: &Field, found: &str) -> SearchError {
    SearchError::TypeMismatch {
        field: field.name.clone(),
        expected: field.data_type,
        found: found.to_string(),
    }
}

fn check_composites(predicate: &Predicate) -> SearchResult<()> {
    match predicate {
        Predicate::And(items) | Predicate::Or(items) => {
            if items.is_empty() {
                return Err(SearchError::InvalidParameter(
                    "empty AND/OR in filter".to_string(),
                ));
            }
            items.iter().try_for_each(check_composites)
        }
        Predicate::Not(inner) => check_composites(inner),
        _ => Ok(()),
    }
}
