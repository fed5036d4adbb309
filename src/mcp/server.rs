//! MCP Server Loop
//!
//! Serves the MCP protocol over stdio: newline-delimited JSON-RPC requests
//! on stdin, responses on stdout. Logging goes to stderr; stdout belongs to
//! the protocol.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

use super::context::ToolContext;
use super::protocol::{
    methods, InitializeParams, InitializeResult, McpError, McpRequest, McpResponse, PingResult,
    ServerCapabilities, ServerInfo, ToolsCallParams, ToolsCapability, ToolsListResult,
    MCP_PROTOCOL_VERSION,
};
use super::registry::McpRegistry;
use crate::baserow::BaserowClient;

/// State shared across all requests of one MCP session.
pub struct McpState {
    pub registry: Arc<McpRegistry>,
    pub client: Arc<BaserowClient>,
}

/// Create the MCP state with all tools registered.
pub fn create_mcp_state(client: Arc<BaserowClient>) -> McpState {
    let mut registry = McpRegistry::new();
    super::tools::register_all_tools(&mut registry);

    info!(
        "MCP registry initialized with {} tools",
        registry.tool_count()
    );

    McpState {
        registry: Arc::new(registry),
        client,
    }
}

/// Serve MCP over stdin/stdout until stdin closes.
pub async fn serve_stdio(state: McpState) -> anyhow::Result<()> {
    let stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(stdin).lines();
    let mut initialized = false;

    info!("serving MCP on stdio");

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(response) = handle_message(line, &state, &mut initialized).await {
            match serde_json::to_string(&response) {
                Ok(json) => {
                    stdout.write_all(json.as_bytes()).await?;
                    stdout.write_all(b"\n").await?;
                    stdout.flush().await?;
                }
                Err(e) => {
                    error!("Failed to serialize MCP response: {}", e);
                }
            }
        }
    }

    info!("stdin closed, shutting down");
    Ok(())
}

/// Handle a single MCP message. Returns `None` for notifications.
pub async fn handle_message(
    text: &str,
    state: &McpState,
    initialized: &mut bool,
) -> Option<McpResponse> {
    // Parse the request
    let request: McpRequest = match serde_json::from_str(text) {
        Ok(req) => req,
        Err(e) => {
            return Some(McpResponse::error(
                None,
                McpError::ParseError(e.to_string()),
            ));
        }
    };

    // Notifications get no response
    match request.method.as_str() {
        methods::INITIALIZED | methods::SHUTDOWN => return None,
        _ => {}
    }

    // A request without an id is a notification per JSON-RPC, so there is
    // nothing to reply to even when the method expects a response.
    let request_id = match request.id.clone() {
        Some(id) => id,
        None => return None,
    };

    // Dispatch based on method
    let result = match request.method.as_str() {
        methods::INITIALIZE => handle_initialize(&request, initialized).await,
        methods::PING => handle_ping(&request).await,
        methods::TOOLS_LIST => {
            if !*initialized {
                Err(McpError::InvalidRequest("Not initialized".to_string()))
            } else {
                handle_tools_list(state).await
            }
        }
        methods::TOOLS_CALL => {
            if !*initialized {
                Err(McpError::InvalidRequest("Not initialized".to_string()))
            } else {
                handle_tools_call(&request, state).await
            }
        }
        other => Err(McpError::MethodNotFound(other.to_string())),
    };

    Some(match result {
        Ok(value) => McpResponse::success(request_id, value),
        Err(error) => McpResponse::error(Some(request_id), error),
    })
}

async fn handle_initialize(
    request: &McpRequest,
    initialized: &mut bool,
) -> Result<serde_json::Value, McpError> {
    let params: Option<InitializeParams> = request
        .params
        .clone()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| McpError::InvalidParams(e.to_string()))?;

    if let Some(params) = &params {
        debug!(
            client = %params.client_info.name,
            version = %params.client_info.version,
            "initialize from client"
        );
    }

    *initialized = true;

    let result = InitializeResult {
        protocol_version: MCP_PROTOCOL_VERSION.to_string(),
        capabilities: ServerCapabilities {
            tools: Some(ToolsCapability { list_changed: None }),
        },
        server_info: ServerInfo {
            name: "baserow-mcp".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    };

    serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
}

async fn handle_ping(_request: &McpRequest) -> Result<serde_json::Value, McpError> {
    serde_json::to_value(PingResult {}).map_err(|e| McpError::InternalError(e.to_string()))
}

async fn handle_tools_list(state: &McpState) -> Result<serde_json::Value, McpError> {
    // Capabilities are read live, so switching tokens at runtime changes
    // the visible tool set.
    let capabilities = state.client.auth().status().await.capabilities;
    let tools = state.registry.get_available_tools(&capabilities);

    let result = ToolsListResult { tools };

    serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
}

async fn handle_tools_call(
    request: &McpRequest,
    state: &McpState,
) -> Result<serde_json::Value, McpError> {
    let params: ToolsCallParams = request
        .params
        .clone()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| McpError::InvalidParams(e.to_string()))?
        .ok_or_else(|| McpError::InvalidParams("Missing params".to_string()))?;

    let capabilities = state.client.auth().status().await.capabilities;

    // Find the tool
    let tool = state
        .registry
        .get_tool(&params.name, &capabilities)
        .ok_or_else(|| {
            if state.registry.has_tool(&params.name) {
                McpError::PermissionDenied(format!(
                    "Tool not available with the current credentials: {}",
                    params.name
                ))
            } else {
                McpError::MethodNotFound(format!("Unknown tool: {}", params.name))
            }
        })?;

    // Execute the tool
    let ctx = ToolContext::new(state.client.clone());
    let arguments = params.arguments.unwrap_or(serde_json::json!({}));
    let result = (tool.handler)(ctx, arguments).await?;

    serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
}
