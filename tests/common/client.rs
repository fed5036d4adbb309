//! MCP session driver for end-to-end tests
//!
//! Feeds raw JSON-RPC lines, the same payloads a stdio client would write,
//! through the server's message handler in-process. One `TestMcp` is one
//! MCP session with its own initialize state and request id sequence.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use baserow_mcp::baserow::{AuthManager, BaserowClient, TokenKind};
use baserow_mcp::mcp::{create_mcp_state, handle_message, McpResponse, McpState};

use super::constants::*;

/// One MCP session against a mock Baserow instance
pub struct TestMcp {
    /// Shared server state (public for direct client access in tests)
    pub state: McpState,
    initialized: bool,
    next_id: i64,
}

impl TestMcp {
    /// Session in username/password mode, logging in on first API use
    pub fn with_credentials(base_url: &str) -> Self {
        let http = http_client();
        let auth = AuthManager::with_credentials(
            http.clone(),
            base_url.to_string(),
            TEST_USERNAME.to_string(),
            TEST_PASSWORD.to_string(),
        );
        Self::from_auth(base_url, http, auth)
    }

    /// Session holding a fixed database-scoped token
    pub fn with_database_token(base_url: &str) -> Self {
        let http = http_client();
        let auth = AuthManager::with_token(
            http.clone(),
            base_url.to_string(),
            TEST_DATABASE_TOKEN.to_string(),
            TokenKind::DatabaseToken,
        );
        Self::from_auth(base_url, http, auth)
    }

    /// Session holding a pre-issued JWT without a refresh token
    pub fn with_jwt(base_url: &str) -> Self {
        let http = http_client();
        let auth = AuthManager::with_token(
            http.clone(),
            base_url.to_string(),
            TEST_JWT.to_string(),
            TokenKind::Jwt,
        );
        Self::from_auth(base_url, http, auth)
    }

    fn from_auth(base_url: &str, http: reqwest::Client, auth: AuthManager) -> Self {
        let client = Arc::new(BaserowClient::new(http, base_url.to_string(), auth));
        Self {
            state: create_mcp_state(client),
            initialized: false,
            next_id: 0,
        }
    }

    /// Feed one raw JSON-RPC line through the message handler
    pub async fn send_raw(&mut self, text: &str) -> Option<McpResponse> {
        handle_message(text, &self.state, &mut self.initialized).await
    }

    /// Send a request with the next sequential id
    pub async fn request(&mut self, method: &str, params: Option<Value>) -> McpResponse {
        self.next_id += 1;
        let mut message = json!({
            "jsonrpc": "2.0",
            "id": self.next_id,
            "method": method,
        });
        if let Some(params) = params {
            message["params"] = params;
        }
        self.send_raw(&message.to_string())
            .await
            .expect("request should produce a response")
    }

    /// Run the initialize handshake
    ///
    /// # Panics
    ///
    /// Panics if the handshake fails (indicates test infrastructure problem).
    pub async fn initialize(&mut self) {
        let response = self
            .request(
                "initialize",
                Some(json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": {"name": "e2e-harness", "version": "0.0.1"},
                })),
            )
            .await;
        assert!(
            response.error.is_none(),
            "initialize failed: {:?}",
            response.error
        );

        let none = self
            .send_raw(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(none.is_none(), "notification must not produce a response");
    }

    /// Sorted names of the tools the server currently advertises
    pub async fn list_tool_names(&mut self) -> Vec<String> {
        let response = self.request("tools/list", None).await;
        assert!(
            response.error.is_none(),
            "tools/list failed: {:?}",
            response.error
        );
        let result = response.result.expect("tools/list should carry a result");
        let mut names: Vec<String> = result["tools"]
            .as_array()
            .expect("tools should be an array")
            .iter()
            .map(|tool| {
                tool["name"]
                    .as_str()
                    .expect("tool should have a name")
                    .to_string()
            })
            .collect();
        names.sort();
        names
    }

    /// Call a tool and return the raw response
    pub async fn call_tool(&mut self, name: &str, arguments: Value) -> McpResponse {
        self.request(
            "tools/call",
            Some(json!({"name": name, "arguments": arguments})),
        )
        .await
    }

    /// Call a tool expecting success, parsing the JSON out of its text content
    pub async fn call_tool_ok(&mut self, name: &str, arguments: Value) -> Value {
        let response = self.call_tool(name, arguments).await;
        assert!(
            response.error.is_none(),
            "tool {} failed: {:?}",
            name,
            response.error
        );
        let result = response.result.expect("tool call should carry a result");
        let text = result["content"][0]["text"]
            .as_str()
            .expect("tool result should carry text content");
        serde_json::from_str(text).expect("tool result text should be JSON")
    }

    /// Call a tool expecting failure, returning the error code and message
    pub async fn call_tool_err(&mut self, name: &str, arguments: Value) -> (i32, String) {
        let response = self.call_tool(name, arguments).await;
        let error = response
            .error
            .unwrap_or_else(|| panic!("tool {} unexpectedly succeeded", name));
        (error.code, error.message)
    }
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .expect("Failed to build reqwest client")
}
