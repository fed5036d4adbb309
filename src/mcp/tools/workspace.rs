//! Workspace Tools
//!
//! Tools for listing and managing workspaces, plus the client-side active
//! workspace default that database tools fall back to.

use serde::Deserialize;
use serde_json::Value;

use crate::baserow::Capability;
use crate::mcp::context::ToolContext;
use crate::mcp::protocol::{McpError, ToolsCallResult};
use crate::mcp::registry::{McpRegistry, ToolBuilder, ToolResult};

/// Register workspace tools with the registry
pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(list_workspaces_tool());
    registry.register_tool(get_workspace_tool());
    registry.register_tool(create_workspace_tool());
    registry.register_tool(set_workspace_tool());
}

// ============================================================================
// baserow_list_workspaces
// ============================================================================

fn list_workspaces_tool() -> super::super::registry::RegisteredTool {
    ToolBuilder::new("baserow_list_workspaces")
        .description("List all available workspaces")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {}
        }))
        .capability(Capability::FullApiAccess)
        .build(list_workspaces_handler)
}

async fn list_workspaces_handler(ctx: ToolContext, _params: Value) -> ToolResult {
    let workspaces = ctx.client.list_workspaces().await?;

    ToolsCallResult::json(&workspaces).map_err(|e| McpError::InternalError(e.to_string()))
}

// ============================================================================
// baserow_get_workspace
// ============================================================================

#[derive(Debug, Deserialize)]
struct GetWorkspaceParams {
    workspace_id: i64,
}

fn get_workspace_tool() -> super::super::registry::RegisteredTool {
    ToolBuilder::new("baserow_get_workspace")
        .description("Get details of a specific workspace")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "workspace_id": {
                    "type": "number",
                    "description": "The ID of the workspace"
                }
            },
            "required": ["workspace_id"]
        }))
        .capability(Capability::FullApiAccess)
        .build(get_workspace_handler)
}

async fn get_workspace_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: GetWorkspaceParams =
        serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let workspace = ctx.client.get_workspace(params.workspace_id).await?;

    ToolsCallResult::json(&workspace).map_err(|e| McpError::InternalError(e.to_string()))
}

// ============================================================================
// baserow_create_workspace
// ============================================================================

#[derive(Debug, Deserialize)]
struct CreateWorkspaceParams {
    name: String,
}

fn create_workspace_tool() -> super::super::registry::RegisteredTool {
    ToolBuilder::new("baserow_create_workspace")
        .description("Create a new workspace")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "Name of the new workspace"
                }
            },
            "required": ["name"]
        }))
        .capability(Capability::FullApiAccess)
        .build(create_workspace_handler)
}

async fn create_workspace_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: CreateWorkspaceParams =
        serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let workspace = ctx.client.create_workspace(&params.name).await?;

    ToolsCallResult::json(&workspace).map_err(|e| McpError::InternalError(e.to_string()))
}

// ============================================================================
// baserow_set_workspace
// ============================================================================

#[derive(Debug, Deserialize)]
struct SetWorkspaceParams {
    workspace_id: i64,
}

fn set_workspace_tool() -> super::super::registry::RegisteredTool {
    ToolBuilder::new("baserow_set_workspace")
        .description("Set the active workspace for subsequent operations")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "workspace_id": {
                    "type": "number",
                    "description": "The ID of the workspace to set as active"
                }
            },
            "required": ["workspace_id"]
        }))
        .capability(Capability::FullApiAccess)
        .build(set_workspace_handler)
}

async fn set_workspace_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: SetWorkspaceParams =
        serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    ctx.client.set_active_workspace(params.workspace_id);

    let result = serde_json::json!({
        "success": true,
        "message": format!("Active workspace set to ID: {}", params.workspace_id),
        "workspace_id": params.workspace_id,
    });

    ToolsCallResult::json(&result).map_err(|e| McpError::InternalError(e.to_string()))
}
