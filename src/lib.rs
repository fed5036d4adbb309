//! Baserow MCP Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod baserow;
pub mod config;
pub mod mcp;

// Re-export commonly used types for convenience
pub use baserow::{AuthManager, BaserowClient, BaserowError, Capability, TokenKind};
pub use config::{AppConfig, AuthConfig, CliConfig, FileConfig};
pub use mcp::{create_mcp_state, serve_stdio, McpState};
