//! MCP Tools
//!
//! Tool implementations for auth, workspaces, databases, tables and rows.

pub mod auth;
pub mod database;
pub mod row;
pub mod table;
pub mod workspace;

use super::registry::McpRegistry;

/// Register all tools with the registry
pub fn register_all_tools(registry: &mut McpRegistry) {
    auth::register_tools(registry);
    workspace::register_tools(registry);
    database::register_tools(registry);
    table::register_tools(registry);
    row::register_tools(registry);
}
