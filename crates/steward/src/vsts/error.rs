//! Error types for Azure DevOps API operations.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::http::HttpError;
use crate::platform::PlatformError;

/// Errors that can occur when interacting with the Azure DevOps API.
#[derive(Debug, Error)]
pub enum VstsError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error response.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded. Resets at {reset_at}")]
    RateLimited { reset_at: DateTime<Utc> },

    /// Authentication failed or token invalid.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Repository not found among those visible to the token.
    #[error("Repository not found: {0}")]
    RepoNotFound(String),

    /// A ref, commit or pull request the call depends on does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A ref update was rejected by the server.
    #[error("Ref update rejected: {0}")]
    RefRejected(String),

    /// Item content could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<VstsError> for PlatformError {
    fn from(err: VstsError) -> Self {
        match err {
            VstsError::Http(e) => PlatformError::Network {
                message: e.to_string(),
            },
            VstsError::Json(e) => PlatformError::Internal {
                message: format!("JSON parse error: {}", e),
            },
            VstsError::Api { status, message } => match status {
                401 | 403 => PlatformError::AuthRequired,
                404 => PlatformError::NotFound { resource: message },
                409 => PlatformError::Conflict { message },
                429 => PlatformError::RateLimited {
                    reset_at: Utc::now() + chrono::Duration::minutes(1),
                },
                _ => PlatformError::Api { message },
            },
            VstsError::RateLimited { reset_at } => PlatformError::RateLimited { reset_at },
            VstsError::Auth(_) => PlatformError::AuthRequired,
            VstsError::RepoNotFound(name) => PlatformError::RepoNotFound { name },
            VstsError::NotFound(resource) => PlatformError::NotFound { resource },
            VstsError::RefRejected(message) => PlatformError::Conflict { message },
            VstsError::Decode(message) => PlatformError::Internal { message },
            VstsError::Config(message) => PlatformError::Internal { message },
        }
    }
}

/// Check if an error is a rate limit error.
pub fn is_rate_limit_error(err: &VstsError) -> bool {
    matches!(
        err,
        VstsError::RateLimited { .. } | VstsError::Api { status: 429, .. }
    )
}

/// Get a short error message suitable for display.
pub fn short_error_message(err: &VstsError) -> String {
    match err {
        VstsError::Http(_) => "Network error".to_string(),
        VstsError::Json(_) => "JSON parse error".to_string(),
        VstsError::Api { status, message } => {
            if message.chars().count() > 50 {
                let truncated: String = message.chars().take(47).collect();
                format!("HTTP {}: {}...", status, truncated)
            } else {
                format!("HTTP {}: {}", status, message)
            }
        }
        VstsError::RateLimited { .. } => "Rate limited".to_string(),
        VstsError::Auth(_) => "Authentication failed".to_string(),
        VstsError::RepoNotFound(repo) => format!("Repo not found: {}", repo),
        VstsError::NotFound(resource) => format!("Not found: {}", resource),
        VstsError::RefRejected(name) => format!("Ref update rejected: {}", name),
        VstsError::Decode(_) => "Decode error".to_string(),
        VstsError::Config(msg) => format!("Config: {}", msg),
    }
}
