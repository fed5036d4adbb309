//! MCP Protocol Types
//!
//! Implements the Model Context Protocol message types.
//! MCP is essentially JSON-RPC 2.0 with specific method names and schemas.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::baserow::BaserowError;

/// JSON-RPC version string
pub const JSONRPC_VERSION: &str = "2.0";

/// MCP protocol version we support
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

// ============================================================================
// Core Message Types
// ============================================================================

/// Incoming request from MCP client. Notifications carry no `id`.
#[derive(Debug, Clone, Deserialize)]
pub struct McpRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<RequestId>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// Response to MCP client
#[derive(Debug, Clone, Serialize)]
pub struct McpResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpErrorResponse>,
}

impl McpResponse {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(id),
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<RequestId>, error: McpError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error.into()),
        }
    }
}

/// Request ID can be string or number
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(i64),
}

/// Error response structure
#[derive(Debug, Clone, Serialize)]
pub struct McpErrorResponse {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

// ============================================================================
// Error Codes (JSON-RPC + MCP specific)
// ============================================================================

/// MCP error types
#[derive(Debug, Clone)]
pub enum McpError {
    // JSON-RPC standard errors
    ParseError(String),
    InvalidRequest(String),
    MethodNotFound(String),
    InvalidParams(String),
    InternalError(String),

    // MCP specific errors
    AuthenticationFailed(String),
    PermissionDenied(String),
    ToolExecutionFailed(String),
}

impl McpError {
    pub fn code(&self) -> i32 {
        match self {
            McpError::ParseError(_) => -32700,
            McpError::InvalidRequest(_) => -32600,
            McpError::MethodNotFound(_) => -32601,
            McpError::InvalidParams(_) => -32602,
            McpError::InternalError(_) => -32603,
            McpError::AuthenticationFailed(_) => -32001,
            McpError::PermissionDenied(_) => -32002,
            McpError::ToolExecutionFailed(_) => -32005,
        }
    }

    pub fn message(&self) -> String {
        match self {
            McpError::ParseError(msg) => format!("Parse error: {}", msg),
            McpError::InvalidRequest(msg) => format!("Invalid request: {}", msg),
            McpError::MethodNotFound(method) => format!("Method not found: {}", method),
            McpError::InvalidParams(msg) => format!("Invalid params: {}", msg),
            McpError::InternalError(msg) => format!("Internal error: {}", msg),
            McpError::AuthenticationFailed(msg) => format!("Authentication failed: {}", msg),
            McpError::PermissionDenied(msg) => format!("Permission denied: {}", msg),
            McpError::ToolExecutionFailed(msg) => format!("Tool execution failed: {}", msg),
        }
    }
}

impl From<McpError> for McpErrorResponse {
    fn from(err: McpError) -> Self {
        McpErrorResponse {
            code: err.code(),
            message: err.message(),
            data: None,
        }
    }
}

impl From<BaserowError> for McpError {
    fn from(err: BaserowError) -> Self {
        match err {
            BaserowError::Configuration(msg) => McpError::InvalidParams(msg),
            BaserowError::Auth(msg) => McpError::AuthenticationFailed(msg),
            BaserowError::RemoteApi { .. } | BaserowError::Transport(_) => {
                McpError::ToolExecutionFailed(err.to_string())
            }
        }
    }
}

// ============================================================================
// MCP Method Names
// ============================================================================

pub mod methods {
    // Lifecycle
    pub const INITIALIZE: &str = "initialize";
    pub const INITIALIZED: &str = "notifications/initialized";
    pub const SHUTDOWN: &str = "shutdown";

    // Tools
    pub const TOOLS_LIST: &str = "tools/list";
    pub const TOOLS_CALL: &str = "tools/call";

    // Ping
    pub const PING: &str = "ping";
}

// ============================================================================
// Initialize Messages
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub protocol_version: String,
    #[serde(default)]
    pub capabilities: ClientCapabilities,
    pub client_info: ClientInfo,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ClientCapabilities {
    #[serde(default)]
    pub roots: Option<RootsCapability>,
    #[serde(default)]
    pub sampling: Option<SamplingCapability>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RootsCapability {
    #[serde(default)]
    pub list_changed: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SamplingCapability {}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: ServerInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerCapabilities {
    pub tools: Option<ToolsCapability>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolsCapability {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

// ============================================================================
// Tools Messages
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ToolsListResult {
    pub tools: Vec<ToolDefinition>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolsCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolsCallResult {
    pub content: Vec<ToolResultContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolResultContent {
    Text { text: String },
}

impl ToolsCallResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolResultContent::Text { text: text.into() }],
            is_error: None,
        }
    }

    pub fn json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        let text = serde_json::to_string_pretty(value)?;
        Ok(Self::text(text))
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolResultContent::Text {
                text: message.into(),
            }],
            is_error: Some(true),
        }
    }
}

// ============================================================================
// Ping
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PingResult {}
