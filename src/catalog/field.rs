//! Field metadata.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared type of a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Integer,
    Float,
    Date,
    Boolean,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Integer => "integer",
            DataType::Float => "float",
            DataType::Date => "date",
            DataType::Boolean => "boolean",
        }
    }

    /// Whether values of this type have a meaningful ordering for `<`/`>`/`between`.
    pub fn is_ordered(&self) -> bool {
        !matches!(self, DataType::Boolean)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A queryable or returnable attribute of a feature type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Name of the field, unique within its catalog.
    pub name: String,

    /// Human readable definition.
    #[serde(default)]
    pub definition: String,

    /// Declared value type.
    #[serde(rename = "type")]
    pub data_type: DataType,

    /// Whether the field may be empty.
    #[serde(default = "default_true")]
    pub nullable: bool,

    /// Whether the field may appear in a filter.
    #[serde(default = "default_true")]
    pub queryable: bool,

    /// Relative retrieval weight. Only used for cost estimation.
    #[serde(default = "default_cost", rename = "cost")]
    pub retrieval_cost: u32,

    /// Listed domain values, if the catalogue enumerates them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,

    /// Attribute name in the remote feature type, when it differs from `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_field: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_cost() -> u32 {
    1
}

impl Field {
    /// Create a nullable, queryable field with cost 1.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            definition: String::new(),
            data_type,
            nullable: true,
            queryable: true,
            retrieval_cost: 1,
            values: Vec::new(),
            source_field: None,
        }
    }

    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = definition.into();
        self
    }

    pub fn with_queryable(mut self, queryable: bool) -> Self {
        self.queryable = queryable;
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_cost(mut self, cost: u32) -> Self {
        self.retrieval_cost = cost;
        self
    }

    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_source_field(mut self, source_field: impl Into<String>) -> Self {
        self.source_field = Some(source_field.into());
        self
    }

    /// Name of the attribute on the remote service.
    pub fn source_name(&self) -> &str {
        self.source_field.as_deref().unwrap_or(&self.name)
    }
}
