//! Auth Tools
//!
//! Tools for inspecting and switching the server's Baserow credentials.
//! These are registered without capability gates so a misconfigured session
//! can always recover.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::baserow::{AuthStatus, TokenKind};
use crate::mcp::context::ToolContext;
use crate::mcp::protocol::{McpError, ToolsCallResult};
use crate::mcp::registry::{McpRegistry, ToolBuilder, ToolResult};

/// Register auth tools with the registry
pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(auth_status_tool());
    registry.register_tool(auth_login_tool());
    registry.register_tool(auth_set_token_tool());
}

// ============================================================================
// baserow_auth_status
// ============================================================================

fn auth_status_tool() -> super::super::registry::RegisteredTool {
    ToolBuilder::new("baserow_auth_status")
        .description("Check current authentication status and capabilities")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {}
        }))
        .build(auth_status_handler)
}

async fn auth_status_handler(ctx: ToolContext, _params: Value) -> ToolResult {
    let status = ctx.client.auth().status().await;
    let recommendations = auth_recommendations(&status);

    let mut result =
        serde_json::to_value(&status).map_err(|e| McpError::InternalError(e.to_string()))?;
    if let Some(map) = result.as_object_mut() {
        map.insert(
            "active_workspace".to_string(),
            serde_json::json!(ctx.client.active_workspace()),
        );
        map.insert(
            "recommendations".to_string(),
            serde_json::json!(recommendations),
        );
    }

    ToolsCallResult::json(&result).map_err(|e| McpError::InternalError(e.to_string()))
}

fn auth_recommendations(status: &AuthStatus) -> Vec<String> {
    let mut recommendations = Vec::new();

    if !status.is_authenticated {
        recommendations.push(
            "Use baserow_auth_login with credentials or baserow_auth_set_token to authenticate"
                .to_string(),
        );
    }

    if status.auth_type == "database_token" {
        recommendations.push(
            "Database tokens have limited scope. Consider using JWT for full API access."
                .to_string(),
        );
    }

    // A fixed JWT cannot be renewed past its refresh token, so warn when it
    // is close to lapsing.
    if status.auth_type == "jwt" {
        if let Some(expiry) = status
            .token_expiry
            .as_deref()
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
        {
            let minutes_left = (expiry.with_timezone(&Utc) - Utc::now()).num_minutes();
            if minutes_left < 10 {
                recommendations.push(format!(
                    "JWT token expires in {} minutes. Consider using credentials auth for auto-refresh.",
                    minutes_left
                ));
            }
        }
    }

    recommendations
}

// ============================================================================
// baserow_auth_login
// ============================================================================

#[derive(Debug, Deserialize)]
struct AuthLoginParams {
    username: String,
    password: String,
}

fn auth_login_tool() -> super::super::registry::RegisteredTool {
    ToolBuilder::new("baserow_auth_login")
        .description("Login with username and password to get JWT token")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "username": {
                    "type": "string",
                    "description": "Baserow account email/username"
                },
                "password": {
                    "type": "string",
                    "description": "Baserow account password"
                }
            },
            "required": ["username", "password"]
        }))
        .build(auth_login_handler)
}

async fn auth_login_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: AuthLoginParams =
        serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let auth = ctx.client.auth();
    auth.set_credentials(params.username, params.password).await;

    // Force a login now so bad credentials surface here instead of on the
    // next resource call
    auth.auth_header().await?;

    let result = serde_json::json!({
        "success": true,
        "message": "Successfully logged in with JWT token",
        "auth_status": auth.status().await,
    });

    ToolsCallResult::json(&result).map_err(|e| McpError::InternalError(e.to_string()))
}

// ============================================================================
// baserow_auth_set_token
// ============================================================================

#[derive(Debug, Deserialize)]
struct AuthSetTokenParams {
    token: String,
    #[serde(rename = "type")]
    token_type: TokenKind,
}

fn auth_set_token_tool() -> super::super::registry::RegisteredTool {
    ToolBuilder::new("baserow_auth_set_token")
        .description("Manually set an authentication token (JWT or Database token)")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "token": {
                    "type": "string",
                    "description": "The authentication token (JWT or Database token)"
                },
                "type": {
                    "type": "string",
                    "enum": ["jwt", "database_token"],
                    "description": "Type of token being set"
                }
            },
            "required": ["token", "type"]
        }))
        .build(auth_set_token_handler)
}

async fn auth_set_token_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: AuthSetTokenParams =
        serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let type_label = match params.token_type {
        TokenKind::Jwt => "jwt",
        TokenKind::DatabaseToken => "database_token",
    };

    let auth = ctx.client.auth();
    auth.set_token(params.token, params.token_type).await;

    let result = serde_json::json!({
        "success": true,
        "message": format!("Successfully set {} token", type_label),
        "auth_status": auth.status().await,
    });

    ToolsCallResult::json(&result).map_err(|e| McpError::InternalError(e.to_string()))
}
