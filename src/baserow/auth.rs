//! Authentication and token lifecycle for the Baserow API.
//!
//! Three mutually exclusive modes: a fixed database token, an externally
//! supplied JWT, and a username/password pair that mints JWT sessions on
//! demand. JWTs are refreshed transparently shortly before they lapse, and a
//! rejected refresh falls back to a fresh login when the password is held.

use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::client::response_error;
use super::error::BaserowError;
use super::types::ApiErrorBody;

/// The server issues 60-minute JWTs; we record expiry 5 minutes early so a
/// token never lapses mid-request.
const JWT_SESSION_MINUTES: i64 = 55;

/// Refresh eagerly once the recorded expiry is this close.
const REFRESH_MARGIN_MINUTES: i64 = 5;

/// The flavor of an explicitly supplied token, deciding the header scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Short-lived session token, sent as `JWT <token>`.
    Jwt,
    /// Long-lived database-scoped token, sent as `Bearer <token>`.
    DatabaseToken,
}

/// What the current credentials allow. Reported in auth status and used to
/// gate which tools are visible and callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    WorkspaceManagement,
    DatabaseOperations,
    UserManagement,
    FullApiAccess,
}

/// Snapshot of the authentication state. Reading it never triggers network
/// activity.
#[derive(Debug, Clone, Serialize)]
pub struct AuthStatus {
    pub is_authenticated: bool,
    pub auth_type: &'static str,
    pub has_global_access: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_expiry: Option<String>,
    pub capabilities: Vec<Capability>,
}

/// A JWT session together with its refresh token and recorded expiry.
#[derive(Debug, Clone)]
struct JwtSession {
    token: String,
    refresh_token: Option<String>,
    expires_at: DateTime<Utc>,
}

/// The active authentication mode. Exactly one is held at a time; switching
/// modes structurally drops everything the new mode does not use.
#[derive(Debug, Clone)]
enum CredentialState {
    /// Fixed database token. Never expires, never refreshed.
    DatabaseToken { token: String },
    /// Externally supplied JWT, refreshable only if a refresh token is held.
    Jwt {
        token: String,
        refresh_token: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    },
    /// Username/password pair minting JWT sessions on demand.
    Credentials {
        username: String,
        password: String,
        session: Option<JwtSession>,
    },
}

/// Outcome of a refresh attempt. A rejected refresh token is recoverable in
/// credentials mode, so it is not an error by itself.
enum RefreshOutcome {
    Refreshed(String),
    Rejected,
}

/// Owns the credential state and computes `Authorization` header values,
/// logging in or refreshing transparently as tokens approach expiry.
pub struct AuthManager {
    http: Client,
    base_url: String,
    state: Mutex<CredentialState>,
}

impl AuthManager {
    /// Auth manager starting from an explicit token.
    pub fn with_token(http: Client, base_url: String, token: String, kind: TokenKind) -> Self {
        Self {
            http,
            base_url,
            state: Mutex::new(initial_token_state(token, kind)),
        }
    }

    /// Auth manager starting from a username/password pair. The first
    /// request triggers a login.
    pub fn with_credentials(
        http: Client,
        base_url: String,
        username: String,
        password: String,
    ) -> Self {
        Self {
            http,
            base_url,
            state: Mutex::new(CredentialState::Credentials {
                username,
                password,
                session: None,
            }),
        }
    }

    /// The `Authorization` header value for the next request, refreshing or
    /// logging in first when the held token is about to lapse.
    ///
    /// The lock is held across the whole check-refresh-store sequence, so
    /// concurrent callers cannot race into duplicate logins.
    pub async fn auth_header(&self) -> Result<String, BaserowError> {
        let mut state = self.state.lock().await;
        match &mut *state {
            CredentialState::DatabaseToken { token } => Ok(format!("Bearer {}", token)),

            CredentialState::Jwt {
                token,
                refresh_token,
                expires_at,
            } => {
                if expires_at.map(near_expiry).unwrap_or(false) {
                    let refresh = refresh_token.clone().ok_or_else(|| {
                        BaserowError::Auth(
                            "JWT token expired and no refresh token available".to_string(),
                        )
                    })?;
                    match self.request_refresh(&refresh).await? {
                        RefreshOutcome::Refreshed(new_token) => {
                            *token = new_token;
                            *expires_at = Some(next_expiry());
                        }
                        RefreshOutcome::Rejected => {
                            return Err(BaserowError::Auth(
                                "Refresh token expired. Please re-authenticate.".to_string(),
                            ));
                        }
                    }
                }
                Ok(format!("JWT {}", token))
            }

            CredentialState::Credentials {
                username,
                password,
                session,
            } => {
                if let Some(current) = session {
                    if !near_expiry(current.expires_at) {
                        return Ok(format!("JWT {}", current.token));
                    }
                    if let Some(refresh) = current.refresh_token.clone() {
                        if let RefreshOutcome::Refreshed(token) =
                            self.request_refresh(&refresh).await?
                        {
                            current.token = token;
                            current.expires_at = next_expiry();
                            return Ok(format!("JWT {}", current.token));
                        }
                        warn!("refresh token rejected, starting a new session");
                    }
                }
                let fresh = self.login_session(username, password).await?;
                let header = format!("JWT {}", fresh.token);
                *session = Some(fresh);
                Ok(header)
            }
        }
    }

    /// Replace the held credentials with an explicit bare token. Any
    /// previous username/password or refresh token is dropped.
    pub async fn set_token(&self, token: String, kind: TokenKind) {
        let mut state = self.state.lock().await;
        *state = initial_token_state(token, kind);
    }

    /// Switch to username/password mode. No network activity happens here;
    /// the next request logs in.
    pub async fn set_credentials(&self, username: String, password: String) {
        let mut state = self.state.lock().await;
        *state = CredentialState::Credentials {
            username,
            password,
            session: None,
        };
    }

    /// Describe the current authentication state without mutating it.
    pub async fn status(&self) -> AuthStatus {
        let state = self.state.lock().await;
        match &*state {
            CredentialState::DatabaseToken { .. } => AuthStatus {
                is_authenticated: true,
                auth_type: "database_token",
                has_global_access: false,
                token_expiry: None,
                capabilities: vec![Capability::DatabaseOperations],
            },
            CredentialState::Jwt { expires_at, .. } => AuthStatus {
                is_authenticated: true,
                auth_type: "jwt",
                has_global_access: true,
                token_expiry: expires_at.map(|t| t.to_rfc3339()),
                capabilities: full_capabilities(),
            },
            CredentialState::Credentials { session, .. } => AuthStatus {
                is_authenticated: true,
                auth_type: "credentials",
                has_global_access: true,
                token_expiry: session.as_ref().map(|s| s.expires_at.to_rfc3339()),
                capabilities: full_capabilities(),
            },
        }
    }

    async fn login_session(
        &self,
        username: &str,
        password: &str,
    ) -> Result<JwtSession, BaserowError> {
        let url = format!("{}/api/user/token-auth/", self.base_url);
        debug!("requesting new JWT session");
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let reason = status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string();
            let detail = response
                .json::<ApiErrorBody>()
                .await
                .ok()
                .and_then(|body| body.detail_text())
                .unwrap_or(reason);
            return Err(BaserowError::Auth(format!("Login failed: {}", detail)));
        }

        let auth: TokenAuthResponse = response.json().await?;
        info!("acquired JWT session via username/password login");
        Ok(JwtSession {
            token: auth.token,
            refresh_token: auth.refresh_token,
            expires_at: next_expiry(),
        })
    }

    async fn request_refresh(&self, refresh_token: &str) -> Result<RefreshOutcome, BaserowError> {
        let url = format!("{}/api/user/token-refresh/", self.base_url);
        debug!("refreshing JWT session");
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(RefreshOutcome::Rejected);
        }
        if !response.status().is_success() {
            return Err(response_error(response).await);
        }

        let refreshed: TokenRefreshResponse = response.json().await?;
        Ok(RefreshOutcome::Refreshed(refreshed.token))
    }
}

fn initial_token_state(token: String, kind: TokenKind) -> CredentialState {
    match kind {
        TokenKind::Jwt => CredentialState::Jwt {
            token,
            refresh_token: None,
            expires_at: Some(next_expiry()),
        },
        TokenKind::DatabaseToken => CredentialState::DatabaseToken { token },
    }
}

fn next_expiry() -> DateTime<Utc> {
    Utc::now() + Duration::minutes(JWT_SESSION_MINUTES)
}

fn near_expiry(expires_at: DateTime<Utc>) -> bool {
    Utc::now() + Duration::minutes(REFRESH_MARGIN_MINUTES) >= expires_at
}

fn full_capabilities() -> Vec<Capability> {
    vec![
        Capability::WorkspaceManagement,
        Capability::DatabaseOperations,
        Capability::UserManagement,
        Capability::FullApiAccess,
    ]
}

// Baserow identity API types

#[derive(Debug, Deserialize)]
struct TokenAuthResponse {
    token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenRefreshResponse {
    token: String,
}
