//! Common test infrastructure
//!
//! This module provides all the infrastructure needed for end-to-end tests:
//! a mock Baserow instance and an in-process MCP session driver. Tests
//! should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{MockBaserow, TestMcp, TABLE_1_ID};
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_list_rows() {
//!     let server = MockBaserow::spawn().await;
//!     let mut mcp = TestMcp::with_credentials(&server.base_url);
//!     mcp.initialize().await;
//!
//!     let page = mcp
//!         .call_tool_ok("baserow_list_rows", json!({"table_id": TABLE_1_ID}))
//!         .await;
//!     assert_eq!(page["count"], 2);
//! }
//! ```

mod client;
mod constants;
mod server;

// Public API - this is what tests import
pub use client::TestMcp;
pub use constants::*;
pub use server::MockBaserow;
