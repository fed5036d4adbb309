use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Import modules from the library crate
use baserow_mcp::baserow::{AuthManager, BaserowClient, TokenKind};
use baserow_mcp::config::{self, AuthConfig};
use baserow_mcp::mcp::{create_mcp_state, serve_stdio};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Base URL of the Baserow instance.
    #[clap(long, env = "BASEROW_API_URL", default_value = config::DEFAULT_API_URL)]
    pub api_url: String,

    /// Baserow account username/email. Requires --password; preferred over a
    /// token because sessions can be refreshed indefinitely.
    #[clap(long, env = "BASEROW_USERNAME")]
    pub username: Option<String>,

    /// Baserow account password.
    #[clap(long, env = "BASEROW_PASSWORD")]
    pub password: Option<String>,

    /// Authentication token. "JWT " and "Token " prefixes select the token
    /// kind; a bare value is treated as a JWT.
    #[clap(long, env = "BASEROW_API_TOKEN")]
    pub api_token: Option<String>,

    /// Workspace to use when tools don't specify one.
    #[clap(long, env = "BASEROW_DEFAULT_WORKSPACE_ID")]
    pub workspace_id: Option<i64>,

    /// Timeout in seconds for Baserow API requests.
    #[clap(long, default_value_t = config::DEFAULT_TIMEOUT_SEC)]
    pub timeout_sec: u64,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            api_url: args.api_url.clone(),
            username: args.username.clone(),
            password: args.password.clone(),
            api_token: args.api_token.clone(),
            workspace_id: args.workspace_id,
            timeout_sec: args.timeout_sec,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    // stdout carries the MCP protocol, so all logging goes to stderr
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  api_url: {}", app_config.api_url);
    info!("  timeout_sec: {}", app_config.timeout_sec);

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(app_config.timeout_sec))
        .build()
        .context("Failed to build HTTP client")?;

    let auth = match app_config.auth.clone() {
        AuthConfig::Credentials { username, password } => {
            info!("Using credentials authentication (auto-refresh enabled)");
            AuthManager::with_credentials(
                http.clone(),
                app_config.api_url.clone(),
                username,
                password,
            )
        }
        AuthConfig::Token { token, kind } => {
            match kind {
                TokenKind::Jwt => {
                    info!("Using JWT token authentication (expires in 60 minutes)")
                }
                TokenKind::DatabaseToken => {
                    info!("Using database token authentication (limited API access)")
                }
            }
            AuthManager::with_token(http.clone(), app_config.api_url.clone(), token, kind)
        }
    };

    let client = Arc::new(BaserowClient::new(
        http,
        app_config.api_url.clone(),
        auth,
    ));
    if let Some(workspace_id) = app_config.workspace_id {
        info!("Default active workspace: {}", workspace_id);
        client.set_active_workspace(workspace_id);
    }

    let state = create_mcp_state(client);
    serve_stdio(state).await
}
