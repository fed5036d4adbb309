mod file_config;

pub use file_config::FileConfig;

use anyhow::{bail, Result};

use crate::baserow::TokenKind;

/// Default Baserow instance when no URL is configured.
pub const DEFAULT_API_URL: &str = "https://api.baserow.io";

/// Default timeout for Baserow API requests, in seconds.
pub const DEFAULT_TIMEOUT_SEC: u64 = 30;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub api_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub api_token: Option<String>,
    pub workspace_id: Option<i64>,
    pub timeout_sec: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            username: None,
            password: None,
            api_token: None,
            workspace_id: None,
            timeout_sec: DEFAULT_TIMEOUT_SEC,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the Baserow instance, without a trailing slash.
    pub api_url: String,
    pub auth: AuthConfig,
    /// Workspace used when tools omit an explicit one.
    pub workspace_id: Option<i64>,
    pub timeout_sec: u64,
}

/// How the server authenticates against Baserow. Exactly one mode is
/// configured; credentials win when both are present since they can mint
/// fresh sessions indefinitely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthConfig {
    Credentials { username: String, password: String },
    Token { token: String, kind: TokenKind },
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        // TOML overrides CLI for each field
        let api_url = file
            .api_url
            .unwrap_or_else(|| cli.api_url.clone())
            .trim_end_matches('/')
            .to_string();
        if api_url.is_empty() {
            bail!("api_url must not be empty");
        }

        let username = file.username.or_else(|| cli.username.clone());
        let password = file.password.or_else(|| cli.password.clone());
        let api_token = file.api_token.or_else(|| cli.api_token.clone());
        let auth = resolve_auth(username, password, api_token)?;

        let workspace_id = file.workspace_id.or(cli.workspace_id);
        let timeout_sec = file.timeout_sec.unwrap_or(cli.timeout_sec);

        Ok(Self {
            api_url,
            auth,
            workspace_id,
            timeout_sec,
        })
    }
}

fn resolve_auth(
    username: Option<String>,
    password: Option<String>,
    api_token: Option<String>,
) -> Result<AuthConfig> {
    match (username, password) {
        (Some(username), Some(password)) => {
            return Ok(AuthConfig::Credentials { username, password });
        }
        (Some(_), None) => bail!("username is configured but password is missing"),
        (None, Some(_)) => bail!("password is configured but username is missing"),
        (None, None) => {}
    }

    match api_token {
        Some(raw) => Ok(classify_token(&raw)),
        None => bail!(
            "No authentication configured. Set either BASEROW_USERNAME and \
             BASEROW_PASSWORD (recommended) or BASEROW_API_TOKEN (JWT or \
             Database token)."
        ),
    }
}

/// Classify a configured token by its prefix. `JWT ` and `Token ` prefixes
/// are stripped; the auth layer re-adds the right scheme per request. A bare
/// token is assumed to be a JWT.
fn classify_token(raw: &str) -> AuthConfig {
    let raw = raw.trim();
    if let Some(token) = raw.strip_prefix("JWT ") {
        AuthConfig::Token {
            token: token.to_string(),
            kind: TokenKind::Jwt,
        }
    } else if let Some(token) = raw.strip_prefix("Token ") {
        AuthConfig::Token {
            token: token.to_string(),
            kind: TokenKind::DatabaseToken,
        }
    } else {
        AuthConfig::Token {
            token: raw.to_string(),
            kind: TokenKind::Jwt,
        }
    }
}
