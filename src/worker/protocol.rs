//! Protocol types for worker communication.
//!
//! One JSON object per line in each direction. Requests carry an `id` that
//! the worker echoes back, so responses may arrive out of order.

use serde::{Deserialize, Serialize};

use crate::fetch::RawRecord;

// ============================================================================
// Request/Response Envelope
// ============================================================================

/// Request envelope sent to the worker.
#[derive(Debug, Clone, Serialize)]
pub struct RequestEnvelope {
    /// Unique request ID for correlation.
    pub id: String,
    /// Method name (e.g., "features.count").
    pub method: String,
    /// Method-specific parameters.
    pub params: serde_json::Value,
}

/// Response envelope received from the worker.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEnvelope {
    /// Request ID this response corresponds to.
    pub id: String,
    /// Whether the request succeeded.
    pub success: bool,
    /// Result data (present if success = true).
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    /// Error information (present if success = false).
    #[serde(default)]
    pub error: Option<ErrorInfo>,
}

/// Error information in a failed response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorInfo {
    /// Error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

// ============================================================================
// Service Parameters (included in all requests)
// ============================================================================

/// Which feature service the worker should talk to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceParams {
    /// Base URL of the service.
    pub url: String,
    /// Protocol version, e.g. "1.1.0".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

// ============================================================================
// Request Parameters
// ============================================================================

/// Parameters for `catalog.describe`.
#[derive(Debug, Clone, Serialize)]
pub struct DescribeParams {
    #[serde(flatten)]
    pub service: ServiceParams,
    pub feature_type: String,
}

/// Parameters for `features.count`.
#[derive(Debug, Clone, Serialize)]
pub struct CountParams {
    #[serde(flatten)]
    pub service: ServiceParams,
    pub feature_type: String,
    /// OGC filter XML; absent matches all features.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

/// Parameters for `features.page`.
#[derive(Debug, Clone, Serialize)]
pub struct PageParams {
    #[serde(flatten)]
    pub service: ServiceParams,
    pub feature_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// Source attribute names to return.
    pub property_names: Vec<String>,
    pub offset: usize,
    pub limit: usize,
}

// ============================================================================
// Responses
// ============================================================================

/// Response from `catalog.describe`.
#[derive(Debug, Clone, Deserialize)]
pub struct DescribeResponse {
    /// The catalog document, as a JSON object.
    pub catalog: serde_json::Value,
}

/// Response from `features.count`.
#[derive(Debug, Clone, Deserialize)]
pub struct CountResponse {
    pub count: usize,
}

/// Response from `features.page`.
#[derive(Debug, Clone, Deserialize)]
pub struct PageResponse {
    #[serde(default)]
    pub features: Vec<RawRecord>,
}

/// Method names.
pub mod methods {
    pub const DESCRIBE: &str = "catalog.describe";
    pub const COUNT: &str = "features.count";
    pub const PAGE: &str = "features.page";
}
