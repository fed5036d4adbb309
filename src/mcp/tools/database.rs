//! Database Tools
//!
//! Tools for listing and creating database applications. Operations that
//! need a workspace fall back to the active workspace when none is given.

use serde::Deserialize;
use serde_json::Value;

use crate::baserow::Capability;
use crate::mcp::context::ToolContext;
use crate::mcp::protocol::{McpError, ToolsCallResult};
use crate::mcp::registry::{McpRegistry, ToolBuilder, ToolResult};

/// Register database tools with the registry
pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(list_databases_tool());
    registry.register_tool(get_database_tool());
    registry.register_tool(create_database_tool());
}

/// Resolve an explicit workspace id or fall back to the active one.
fn resolve_workspace(ctx: &ToolContext, explicit: Option<i64>) -> Result<i64, McpError> {
    explicit
        .or_else(|| ctx.client.active_workspace())
        .ok_or_else(|| {
            McpError::InvalidParams(
                "No workspace_id provided and no active workspace set. \
                 Use baserow_set_workspace first."
                    .to_string(),
            )
        })
}

// ============================================================================
// baserow_list_databases
// ============================================================================

#[derive(Debug, Deserialize)]
struct ListDatabasesParams {
    #[serde(default)]
    workspace_id: Option<i64>,
}

fn list_databases_tool() -> super::super::registry::RegisteredTool {
    ToolBuilder::new("baserow_list_databases")
        .description("List all databases in the active workspace or a specific workspace")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "workspace_id": {
                    "type": "number",
                    "description": "Optional workspace ID. If not provided, uses the active workspace"
                }
            }
        }))
        .capability(Capability::FullApiAccess)
        .build(list_databases_handler)
}

async fn list_databases_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: ListDatabasesParams =
        serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let workspace_id = resolve_workspace(&ctx, params.workspace_id)?;
    let databases = ctx.client.list_databases(Some(workspace_id)).await?;

    ToolsCallResult::json(&databases).map_err(|e| McpError::InternalError(e.to_string()))
}

// ============================================================================
// baserow_get_database
// ============================================================================

#[derive(Debug, Deserialize)]
struct GetDatabaseParams {
    database_id: i64,
}

fn get_database_tool() -> super::super::registry::RegisteredTool {
    ToolBuilder::new("baserow_get_database")
        .description("Get details of a specific database")
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
        .build(get_database_handler)
}

async fn get_database_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: GetDatabaseParams =
        serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let database = ctx.client.get_database(params.database_id).await?;

    ToolsCallResult::json(&database).map_err(|e| McpError::InternalError(e.to_string()))
}

// ============================================================================
// baserow_create_database
// ============================================================================

#[derive(Debug, Deserialize)]
struct CreateDatabaseParams {
    name: String,
    #[serde(default)]
    workspace_id: Option<i64>,
}

fn create_database_tool() -> super::super::registry::RegisteredTool {
    ToolBuilder::new("baserow_create_database")
        .description("Create a new database in a workspace")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "Name of the new database"
                },
                "workspace_id": {
                    "type": "number",
                    "description": "ID of the workspace. If not provided, uses the active workspace"
                }
            },
            "required": ["name"]
        }))
        .capability(Capability::FullApiAccess)
        .build(create_database_handler)
}

async fn create_database_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: CreateDatabaseParams =
        serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let workspace_id = resolve_workspace(&ctx, params.workspace_id)?;
    let database = ctx
        .client
        .create_database(workspace_id, &params.name)
        .await?;

    ToolsCallResult::json(&database).map_err(|e| McpError::InternalError(e.to_string()))
}
