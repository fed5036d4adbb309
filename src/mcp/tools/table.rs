//! Table Tools
//!
//! Tools for listing and creating tables. `baserow_get_table` merges the
//! table's field definitions into the result unless told not to.

use serde::Deserialize;
use serde_json::Value;

use crate::baserow::Capability;
use crate::mcp::context::ToolContext;
use crate::mcp::protocol::{McpError, ToolsCallResult};
use crate::mcp::registry::{McpRegistry, ToolBuilder, ToolResult};

/// Register table tools with the registry
pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(list_tables_tool());
    registry.register_tool(get_table_tool());
    registry.register_tool(create_table_tool());
}

// ============================================================================
// baserow_list_tables
// ============================================================================

#[derive(Debug, Deserialize)]
struct ListTablesParams {
    database_id: i64,
}

fn list_tables_tool() -> super::super::registry::RegisteredTool {
    ToolBuilder::new("baserow_list_tables")
        .description("List all tables in a database")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "database_id": {
                    "type": "number",
                    "description": "The ID of the database"
                }
            },
            "required": ["database_id"]
        }))
        .capability(Capability::FullApiAccess)
        .build(list_tables_handler)
}

async fn list_tables_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: ListTablesParams =
        serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let tables = ctx.client.list_tables(params.database_id).await?;

    ToolsCallResult::json(&tables).map_err(|e| McpError::InternalError(e.to_string()))
}

// ============================================================================
// baserow_get_table
// ============================================================================

#[derive(Debug, Deserialize)]
struct GetTableParams {
    table_id: i64,
    #[serde(default)]
    include_fields: Option<bool>,
}

fn get_table_tool() -> super::super::registry::RegisteredTool {
    ToolBuilder::new("baserow_get_table")
        .description("Get details of a specific table including its fields")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "table_id": {
                    "type": "number",
                    "description": "The ID of the table"
                },
                "include_fields": {
                    "type": "boolean",
                    "description": "Whether to include field definitions (default: true)"
                }
            },
            "required": ["table_id"]
        }))
        .capability(Capability::FullApiAccess)
        .build(get_table_handler)
}

async fn get_table_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: GetTableParams =
        serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let table = ctx.client.get_table(params.table_id).await?;
    let mut result =
        serde_json::to_value(&table).map_err(|e| McpError::InternalError(e.to_string()))?;

    // Fields are merged in by default, skipped only on an explicit false
    if params.include_fields.unwrap_or(true) {
        let fields = ctx.client.list_fields(params.table_id).await?;
        if let Some(map) = result.as_object_mut() {
            map.insert("fields".to_string(), serde_json::json!(fields));
        }
    }

    ToolsCallResult::json(&result).map_err(|e| McpError::InternalError(e.to_string()))
}

// ============================================================================
// baserow_create_table
// ============================================================================

#[derive(Debug, Deserialize)]
struct CreateTableParams {
    name: String,
    database_id: i64,
}

fn create_table_tool() -> super::super::registry::RegisteredTool {
    ToolBuilder::new("baserow_create_table")
        .description("Create a new table in a database")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "Name of the new table"
                },
                "database_id": {
                    "type": "number",
                    "description": "ID of the database to create the table in"
                }
            },
            "required": ["name", "database_id"]
        }))
        .capability(Capability::FullApiAccess)
        .build(create_table_handler)
}

async fn create_table_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: CreateTableParams =
        serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let table = ctx
        .client
        .create_table(params.database_id, &params.name)
        .await?;

    ToolsCallResult::json(&table).map_err(|e| McpError::InternalError(e.to_string()))
}
