//! Error types for the groupware connector.

use groupsync_connector::error::ConnectorError;
use thiserror::Error;

/// Result type alias using `GroupwareError`.
pub type GroupwareResult<T> = Result<T, GroupwareError>;

/// Errors that can occur when talking to the groupware backend.
#[derive(Debug, Error)]
pub enum GroupwareError {
    /// Configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP transport error (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend answered with a non-2xx status.
    #[error("Backend rejected request: {status} {reason}: {body}")]
    Rejected {
        status: u16,
        reason: String,
        body: String,
    },
}

impl From<GroupwareError> for ConnectorError {
    fn from(err: GroupwareError) -> Self {
        match err {
            GroupwareError::Config(message) => ConnectorError::InvalidConfiguration { message },
            GroupwareError::Http(e) if e.is_timeout() => ConnectorError::ConnectionTimeout {
                message: e.to_string(),
            },
            GroupwareError::Http(e) if e.is_connect() => {
                ConnectorError::connection_failed_with_source("cannot reach groupware backend", e)
            }
            GroupwareError::Http(e) => {
                ConnectorError::network_with_source("groupware request failed", e)
            }
            GroupwareError::Json(e) => ConnectorError::Serialization {
                message: e.to_string(),
            },
            GroupwareError::Rejected { status: 401, .. } => ConnectorError::AuthenticationFailed,
            rejected @ GroupwareError::Rejected { .. } => {
                ConnectorError::operation_failed(rejected.to_string())
            }
        }
    }
}
