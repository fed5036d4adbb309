//! MCP Tool Registry
//!
//! Manages registration and lookup of tools, gated by the capabilities of
//! the currently held Baserow credentials.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use super::context::ToolContext;
use super::protocol::{McpError, ToolDefinition, ToolsCallResult};
use crate::baserow::Capability;

// ============================================================================
// Tool Types
// ============================================================================

/// Result type for tool execution
pub type ToolResult = Result<ToolsCallResult, McpError>;

/// Boxed future for async tool execution
pub type ToolFuture = Pin<Box<dyn Future<Output = ToolResult> + Send>>;

/// Tool handler function type
pub type ToolHandler = Arc<dyn Fn(ToolContext, Value) -> ToolFuture + Send + Sync>;

/// A registered tool with metadata and handler
pub struct RegisteredTool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub capabilities: Vec<Capability>,
    pub handler: ToolHandler,
}

// ============================================================================
// Registry
// ============================================================================

/// Registry for MCP tools
pub struct McpRegistry {
    tools: HashMap<String, RegisteredTool>,
}

impl McpRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool
    pub fn register_tool(&mut self, tool: RegisteredTool) {
        self.tools.insert(tool.name.clone(), tool);
    }

    /// Get tools available under the given capabilities
    pub fn get_available_tools(&self, capabilities: &[Capability]) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .filter(|tool| tool.capabilities.iter().all(|c| capabilities.contains(c)))
            .map(|tool| ToolDefinition {
                name: tool.name.clone(),
                description: tool.description.clone(),
                input_schema: tool.input_schema.clone(),
            })
            .collect()
    }

    /// Get a tool by name, checking capabilities
    pub fn get_tool(&self, name: &str, capabilities: &[Capability]) -> Option<&RegisteredTool> {
        self.tools
            .get(name)
            .filter(|tool| tool.capabilities.iter().all(|c| capabilities.contains(c)))
    }

    /// Whether a tool is registered at all, regardless of capabilities.
    /// Lets callers distinguish "forbidden" from "unknown".
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get the number of registered tools
    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }
}

impl Default for McpRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Builder helpers
// ============================================================================

/// Builder for registering a tool
pub struct ToolBuilder {
    name: String,
    description: String,
    input_schema: Value,
    capabilities: Vec<Capability>,
}

impl ToolBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {}
            }),
            capabilities: Vec::new(),
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn input_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }

    pub fn capability(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    pub fn build<F, Fut>(self, handler: F) -> RegisteredTool
    where
        F: Fn(ToolContext, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ToolResult> + Send + 'static,
    {
        RegisteredTool {
            name: self.name,
            description: self.description,
            input_schema: self.input_schema,
            capabilities: self.capabilities,
            handler: Arc::new(move |ctx, params| Box::pin(handler(ctx, params))),
        }
    }
}
