//! Error types for the simulation gateway.

use thiserror::Error;

use crate::config::ConfigError;

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors that can occur when talking to the simulation backend.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend returned a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Requested resource does not exist. Holds the backend's detail.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request was refused locally and never sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Gateway could not be built from its configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl GatewayError {
    /// Short description for end users, without transport prefixes.
    ///
    /// For backend errors this is the backend's own detail message.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Api { status, message } if message.is_empty() => {
                format!("server responded with status {status}")
            }
            GatewayError::Api { message, .. } => message.clone(),
            GatewayError::NotFound(detail) if detail.is_empty() => "resource not found".to_string(),
            GatewayError::NotFound(detail) => detail.clone(),
            GatewayError::InvalidRequest(reason) => reason.clone(),
            GatewayError::Http(e) if e.is_timeout() => "request timed out".to_string(),
            GatewayError::Http(e) if e.is_connect() => "could not reach the server".to_string(),
            other => other.to_string(),
        }
    }
}
