//! MCP (Model Context Protocol) Server
//!
//! Provides an MCP interface that exposes the Baserow REST API as tools an
//! LLM client can call: workspace, database, table and row management plus
//! runtime credential switching.
//!
//! ## Architecture
//!
//! - Transport: newline-delimited JSON-RPC over stdio
//! - Auth: one Baserow credential held server-side, never sent to the client
//! - Tools: capability-gated, so a database token only sees row operations

pub mod context;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod tools;

pub use protocol::{McpError, McpRequest, McpResponse};
pub use registry::McpRegistry;
pub use server::{create_mcp_state, handle_message, serve_stdio, McpState};
