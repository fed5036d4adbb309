//! Error types for the Baserow API layer.

use thiserror::Error;

/// Errors produced by the configuration, auth, and API client layers.
#[derive(Debug, Error)]
pub enum BaserowError {
    /// Required configuration is missing or inconsistent.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Login or refresh failed, or no usable credentials are held.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The API rejected the request with a structured error body.
    #[error("Baserow API error {code}: {message}")]
    RemoteApi { code: String, message: String },

    /// Network-level failure, or an HTTP error without a structured body.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for BaserowError {
    fn from(e: reqwest::Error) -> Self {
        BaserowError::Transport(e.to_string())
    }
}
