//! Baserow REST API resource types.
//!
//! Deliberately loose: the identifier fields the server relies on are typed,
//! everything else flows through a flattened map so server-provided fields
//! survive the round-trip unchanged across Baserow versions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A workspace, the top-level container for applications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub id: i64,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An application inside a workspace. Databases are applications with
/// `type == "database"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub app_type: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A table inside a database application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub id: i64,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A field (column) definition of a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A table row. Cell values are user-defined, so everything except the id is
/// passed through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Row {
    pub id: i64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Paginated list envelope returned by Baserow list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Envelope for batch row operations (`{"items": [...]}` in both directions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowBatch<T> {
    pub items: Vec<T>,
}

/// Query parameters for paginated row listing. `None` fields are omitted from
/// the query string entirely.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RowListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sorts: Option<String>,
}

/// Structured error body Baserow attaches to failed requests, e.g.
/// `{"error": "ERROR_USER_NOT_IN_GROUP", "detail": "..."}`.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ApiErrorBody {
    /// Best-effort human-readable detail. Field-validation failures nest an
    /// object here, so non-string payloads are stringified wholesale.
    pub fn detail_text(&self) -> Option<String> {
        match &self.detail {
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        }
    }
}
