//! Crate-wide error taxonomy.
//!
//! Errors fall into two families:
//!
//! - **Validation** (`UnknownField`, `NotQueryable`, `TypeMismatch`, plus
//!   `Parse` and `InvalidParameter`): raised locally before any network
//!   call, fully reproducible from the request and the catalog.
//! - **Fetch** (`Transport`, `Service`): raised by the feature service
//!   collaborator, environment dependent.
//!
//! `CatalogUnavailable` sits in between: it is raised while loading the
//! field description of a feature type.

use thiserror::Error;

use crate::catalog::DataType;

/// Result type for search operations.
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors that can occur while describing, building or running a search.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// A field name is not part of the catalog.
    #[error("unknown field: '{field}'")]
    UnknownField { field: String },

    /// A field exists but cannot be used in a filter.
    #[error("field '{field}' is not queryable")]
    NotQueryable { field: String },

    /// A literal does not match the declared type of its field.
    #[error("type mismatch on field '{field}': expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: DataType,
        found: String,
    },

    /// The field description of a feature type could not be retrieved or parsed.
    #[error("catalog unavailable for '{feature_type}': {reason}")]
    CatalogUnavailable {
        feature_type: String,
        reason: String,
    },

    /// A query string could not be parsed into a predicate.
    #[error("invalid query string: {0}")]
    Parse(String),

    /// A search parameter is out of range.
    #[error("invalid search parameter: {0}")]
    InvalidParameter(String),

    /// Network-level failure talking to the feature service.
    #[error("transport error: {0}")]
    Transport(String),

    /// The feature service reported a fault.
    #[error("service error: {message} (code: {code})")]
    Service { code: String, message: String },
}

impl SearchError {
    pub fn unknown_field(field: impl Into<String>) -> Self {
        Self::UnknownField {
            field: field.into(),
        }
    }

    pub fn not_queryable(field: impl Into<String>) -> Self {
        Self::NotQueryable {
            field: field.into(),
        }
    }

    pub fn catalog_unavailable(feature_type: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CatalogUnavailable {
            feature_type: feature_type.into(),
            reason: reason.into(),
        }
    }

    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Check if this error was raised during local validation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UnknownField { .. }
                | Self::NotQueryable { .. }
                | Self::TypeMismatch { .. }
                | Self::Parse(_)
                | Self::InvalidParameter(_)
        )
    }

    /// Check if this error was raised by the feature service collaborator.
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Service { .. })
    }
}
