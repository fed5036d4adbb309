//! MCP Tool Execution Context
//!
//! Provides access to shared state for tool implementations.

use std::sync::Arc;

use crate::baserow::BaserowClient;

/// Context provided to tool handlers during execution
#[derive(Clone)]
pub struct ToolContext {
    /// Shared Baserow client, owning the auth state and the active
    /// workspace default.
    pub client: Arc<BaserowClient>,
}

impl ToolContext {
    pub fn new(client: Arc<BaserowClient>) -> Self {
        Self { client }
    }
}
