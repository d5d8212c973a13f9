//! The immutable field lookup structure of a feature type.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::debug;

use super::field::Field;
use crate::error::{SearchError, SearchResult};

/// JSON description of a feature type, as served by a [`CatalogSource`](super::CatalogSource).
///
/// ```json
/// {
///   "feature_type": "dov-pub:Boringen",
///   "definition": "Boreholes",
///   "fields": [
///     {"name": "naam", "type": "string", "definition": "...", "cost": 1},
///     {"name": "x", "type": "float", "queryable": true}
///   ]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub feature_type: Option<String>,
    #[serde(default)]
    pub definition: String,
    pub fields: Vec<Field>,
}

/// Ordered mapping from field name to [`Field`], built once per feature type.
///
/// Iteration order equals declaration order in the source description.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCatalog {
    feature_type: String,
    definition: String,
    fields: Vec<Field>,
    index: HashMap<String, usize>,
}

impl FieldCatalog {
    /// Build a catalog from fields in declaration order.
    ///
    /// Fails with `CatalogUnavailable` on duplicate names or a zero retrieval cost.
    pub fn new(feature_type: impl Into<String>, fields: Vec<Field>) -> SearchResult<Self> {
        Self::with_definition(feature_type, String::new(), fields)
    }

    pub fn with_definition(
        feature_type: impl Into<String>,
        definition: impl Into<String>,
        fields: Vec<Field>,
    ) -> SearchResult<Self> {
        let feature_type = feature_type.into();
        let mut index = HashMap::with_capacity(fields.len());

        for (pos, field) in fields.iter().enumerate() {
            if field.retrieval_cost == 0 {
                return Err(SearchError::catalog_unavailable(
                    &feature_type,
                    format!("field '{}' has a zero retrieval cost", field.name),
                ));
            }
            if index.insert(field.name.clone(), pos).is_some() {
                return Err(SearchError::catalog_unavailable(
                    &feature_type,
                    format!("duplicate field '{}'", field.name),
                ));
            }
        }

        Ok(Self {
            feature_type,
            definition: definition.into(),
            fields,
            index,
        })
    }

    /// Parse a JSON catalogue description.
    pub fn from_document(feature_type: &str, document: &str) -> SearchResult<Self> {
        let doc: CatalogDocument = serde_json::from_str(document)
            .map_err(|e| SearchError::catalog_unavailable(feature_type, e.to_string()))?;

        if let Some(declared) = &doc.feature_type {
            if declared != feature_type {
                return Err(SearchError::catalog_unavailable(
                    feature_type,
                    format!("description is for feature type '{}'", declared),
                ));
            }
        }

        let catalog = Self::with_definition(feature_type, doc.definition, doc.fields)?;
        debug!(
            feature_type = %catalog.feature_type,
            fields = catalog.len(),
            "parsed field catalog"
        );
        Ok(catalog)
    }

    pub fn feature_type(&self) -> &str {
        &self.feature_type
    }

    /// Description of the feature type itself.
    pub fn definition(&self) -> &str {
        &self.definition
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> SearchResult<&Field> {
        self.index
            .get(name)
            .map(|&pos| &self.fields[pos])
            .ok_or_else(|| SearchError::unknown_field(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All fields in declaration order.
    pub fn list(&self) -> &[Field] {
        &self.fields
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn queryable(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.queryable)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Sum of retrieval costs for the given fields, or all fields when `None`.
    ///
    /// Unknown names contribute nothing; validation happens elsewhere.
    pub fn estimate_cost(&self, requested: Option<&[String]>) -> u64 {
        match requested {
            None => self.fields.iter().map(|f| u64::from(f.retrieval_cost)).sum(),
            Some(names) => names
                .iter()
                .filter_map(|n| self.get(n).ok())
                .map(|f| u64::from(f.retrieval_cost))
                .sum(),
        }
    }
}
