//! Baserow REST API layer.
//!
//! [`auth`] owns the credential state and token lifecycle, [`client`] is the
//! HTTP façade the tools call into, and [`types`] holds the wire shapes.

pub mod auth;
pub mod client;
pub mod error;
pub mod types;

pub use auth::{AuthManager, AuthStatus, Capability, TokenKind};
pub use client::BaserowClient;
pub use error::BaserowError;
