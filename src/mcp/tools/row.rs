//! Row Tools
//!
//! Tools for reading and writing table rows, including the batch endpoints.
//! These are the operations a database token can perform, so they are gated
//! on `DatabaseOperations` rather than full API access.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::baserow::Capability;
use crate::baserow::types::RowListQuery;
use crate::mcp::context::ToolContext;
use crate::mcp::protocol::{McpError, ToolsCallResult};
use crate::mcp::registry::{McpRegistry, ToolBuilder, ToolResult};

/// Register row tools with the registry
pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(list_rows_tool());
    registry.register_tool(get_row_tool());
    registry.register_tool(create_row_tool());
    registry.register_tool(update_row_tool());
    registry.register_tool(delete_row_tool());
    registry.register_tool(batch_create_rows_tool());
    registry.register_tool(batch_update_rows_tool());
    registry.register_tool(batch_delete_rows_tool());
}

// ============================================================================
// baserow_list_rows
// ============================================================================

#[derive(Debug, Deserialize)]
struct ListRowsParams {
    table_id: i64,
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    size: Option<u32>,
    #[serde(default)]
    search: Option<String>,
    #[serde(default)]
    sorts: Option<String>,
}

fn list_rows_tool() -> super::super::registry::RegisteredTool {
    ToolBuilder::new("baserow_list_rows")
        .description("List rows in a table with optional pagination and filtering")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "table_id": {
                    "type": "number",
                    "description": "The ID of the table"
                },
                "page": {
                    "type": "number",
                    "description": "Page number (default: 1)"
                },
                "size": {
                    "type": "number",
                    "description": "Number of rows per page (default: 100)"
                },
                "search": {
                    "type": "string",
                    "description": "Search query to filter rows"
                },
                "sorts": {
                    "type": "string",
                    "description": "Sort fields (e.g., \"+field1,-field2\")"
                }
            },
            "required": ["table_id"]
        }))
        .capability(Capability::DatabaseOperations)
        .build(list_rows_handler)
}

async fn list_rows_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: ListRowsParams =
        serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let query = RowListQuery {
        page: params.page,
        size: params.size,
        search: params.search,
        sorts: params.sorts,
    };
    let page = ctx.client.list_rows(params.table_id, &query).await?;

    ToolsCallResult::json(&page).map_err(|e| McpError::InternalError(e.to_string()))
}

// ============================================================================
// baserow_get_row
// ============================================================================

#[derive(Debug, Deserialize)]
struct GetRowParams {
    table_id: i64,
    row_id: i64,
}

fn get_row_tool() -> super::super::registry::RegisteredTool {
    ToolBuilder::new("baserow_get_row")
        .description("Get a specific row by ID")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "table_id": {
                    "type": "number",
                    "description": "The ID of the table"
                },
                "row_id": {
                    "type": "number",
                    "description": "The ID of the row"
                }
            },
            "required": ["table_id", "row_id"]
        }))
        .capability(Capability::DatabaseOperations)
        .build(get_row_handler)
}

async fn get_row_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: GetRowParams =
        serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let row = ctx.client.get_row(params.table_id, params.row_id).await?;

    ToolsCallResult::json(&row).map_err(|e| McpError::InternalError(e.to_string()))
}

// ============================================================================
// baserow_create_row
// ============================================================================

#[derive(Debug, Deserialize)]
struct CreateRowParams {
    table_id: i64,
    data: Map<String, Value>,
}

fn create_row_tool() -> super::super::registry::RegisteredTool {
    ToolBuilder::new("baserow_create_row")
        .description("Create a new row in a table")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "table_id": {
                    "type": "number",
                    "description": "The ID of the table"
                },
                "data": {
                    "type": "object",
                    "description": "Row data as key-value pairs where keys are field names",
                    "additionalProperties": true
                }
            },
            "required": ["table_id", "data"]
        }))
        .capability(Capability::DatabaseOperations)
        .build(create_row_handler)
}

async fn create_row_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: CreateRowParams =
        serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let row = ctx.client.create_row(params.table_id, &params.data).await?;

    ToolsCallResult::json(&row).map_err(|e| McpError::InternalError(e.to_string()))
}

// ============================================================================
// baserow_update_row
// ============================================================================

#[derive(Debug, Deserialize)]
struct UpdateRowParams {
    table_id: i64,
    row_id: i64,
    data: Map<String, Value>,
}

fn update_row_tool() -> super::super::registry::RegisteredTool {
    ToolBuilder::new("baserow_update_row")
        .description("Update an existing row")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "table_id": {
                    "type": "number",
                    "description": "The ID of the table"
                },
                "row_id": {
                    "type": "number",
                    "description": "The ID of the row to update"
                },
                "data": {
                    "type": "object",
                    "description": "Updated row data as key-value pairs",
                    "additionalProperties": true
                }
            },
            "required": ["table_id", "row_id", "data"]
        }))
        .capability(Capability::DatabaseOperations)
        .build(update_row_handler)
}

async fn update_row_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: UpdateRowParams =
        serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let row = ctx
        .client
        .update_row(params.table_id, params.row_id, &params.data)
        .await?;

    ToolsCallResult::json(&row).map_err(|e| McpError::InternalError(e.to_string()))
}

// ============================================================================
// baserow_delete_row
// ============================================================================

#[derive(Debug, Deserialize)]
struct DeleteRowParams {
    table_id: i64,
    row_id: i64,
}

fn delete_row_tool() -> super::super::registry::RegisteredTool {
    ToolBuilder::new("baserow_delete_row")
        .description("Delete a row from a table")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "table_id": {
                    "type": "number",
                    "description": "The ID of the table"
                },
                "row_id": {
                    "type": "number",
                    "description": "The ID of the row to delete"
                }
            },
            "required": ["table_id", "row_id"]
        }))
        .capability(Capability::DatabaseOperations)
        .build(delete_row_handler)
}

async fn delete_row_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: DeleteRowParams =
        serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    ctx.client
        .delete_row(params.table_id, params.row_id)
        .await?;

    let result = serde_json::json!({
        "success": true,
        "message": format!("Row {} deleted successfully", params.row_id),
    });

    ToolsCallResult::json(&result).map_err(|e| McpError::InternalError(e.to_string()))
}

// ============================================================================
// baserow_batch_create_rows
// ============================================================================

#[derive(Debug, Deserialize)]
struct BatchRowsParams {
    table_id: i64,
    rows: Value,
}

fn batch_create_rows_tool() -> super::super::registry::RegisteredTool {
    ToolBuilder::new("baserow_batch_create_rows")
        .description("Create multiple rows in a single request")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "table_id": {
                    "type": "number",
                    "description": "The ID of the table"
                },
                "rows": {
                    "type": "array",
                    "description": "Array of row data objects",
                    "items": {
                        "type": "object",
                        "additionalProperties": true
                    }
                }
            },
            "required": ["table_id", "rows"]
        }))
        .capability(Capability::DatabaseOperations)
        .build(batch_create_rows_handler)
}

async fn batch_create_rows_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: BatchRowsParams =
        serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let rows = expect_rows_array(&params.rows)?;
    let created = ctx.client.batch_create_rows(params.table_id, rows).await?;

    ToolsCallResult::json(&created).map_err(|e| McpError::InternalError(e.to_string()))
}

// ============================================================================
// baserow_batch_update_rows
// ============================================================================

fn batch_update_rows_tool() -> super::super::registry::RegisteredTool {
    ToolBuilder::new("baserow_batch_update_rows")
        .description("Update multiple rows in a single request")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "table_id": {
                    "type": "number",
                    "description": "The ID of the table"
                },
                "rows": {
                    "type": "array",
                    "description": "Array of row objects with id and updated data",
                    "items": {
                        "type": "object",
                        "properties": {
                            "id": {
                                "type": "number",
                                "description": "Row ID"
                            }
                        },
                        "additionalProperties": true,
                        "required": ["id"]
                    }
                }
            },
            "required": ["table_id", "rows"]
        }))
        .capability(Capability::DatabaseOperations)
        .build(batch_update_rows_handler)
}

async fn batch_update_rows_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: BatchRowsParams =
        serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let rows = expect_rows_array(&params.rows)?;
    let updated = ctx.client.batch_update_rows(params.table_id, rows).await?;

    ToolsCallResult::json(&updated).map_err(|e| McpError::InternalError(e.to_string()))
}

// ============================================================================
// baserow_batch_delete_rows
// ============================================================================

#[derive(Debug, Deserialize)]
struct BatchDeleteRowsParams {
    table_id: i64,
    row_ids: Value,
}

fn batch_delete_rows_tool() -> super::super::registry::RegisteredTool {
    ToolBuilder::new("baserow_batch_delete_rows")
        .description("Delete multiple rows in a single request")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "table_id": {
                    "type": "number",
                    "description": "The ID of the table"
                },
                "row_ids": {
                    "type": "array",
                    "description": "Array of row IDs to delete",
                    "items": {
                        "type": "number"
                    }
                }
            },
            "required": ["table_id", "row_ids"]
        }))
        .capability(Capability::DatabaseOperations)
        .build(batch_delete_rows_handler)
}

async fn batch_delete_rows_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: BatchDeleteRowsParams =
        serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let row_ids = expect_row_ids_array(&params.row_ids)?;
    let deleted = row_ids.len();
    ctx.client
        .batch_delete_rows(params.table_id, row_ids)
        .await?;

    let result = serde_json::json!({
        "success": true,
        "message": format!("{} rows deleted successfully", deleted),
    });

    ToolsCallResult::json(&result).map_err(|e| McpError::InternalError(e.to_string()))
}

// Batch payloads are validated by hand so the error names the offending
// field before any request goes out.

fn expect_rows_array(rows: &Value) -> Result<Vec<Value>, McpError> {
    rows.as_array()
        .cloned()
        .ok_or_else(|| McpError::InvalidParams("rows must be an array of row objects".to_string()))
}

fn expect_row_ids_array(row_ids: &Value) -> Result<Vec<i64>, McpError> {
    row_ids
        .as_array()
        .ok_or_else(|| McpError::InvalidParams("row_ids must be an array of row IDs".to_string()))?
        .iter()
        .map(|id| {
            id.as_i64().ok_or_else(|| {
                McpError::InvalidParams("row_ids must contain only numeric row IDs".to_string())
            })
        })
        .collect()
}
