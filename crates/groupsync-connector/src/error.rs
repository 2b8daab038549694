//! Connector Framework error types
//!
//! Communication-class errors (connection, timeout, network) are reported to
//! the synchronization engine as such and never retried by a connector.
//! Everything else is permanent for the request that raised it.

use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Error that can occur during connector operations.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The target system could not be reached.
    #[error("connection failed: {message}")]
    ConnectionFailed {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// The target system did not answer in time.
    #[error("connection timeout: {message}")]
    ConnectionTimeout { message: String },

    /// The exchange broke down after the connection was made.
    #[error("network error: {message}")]
    NetworkError {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// The target refused the configured credentials.
    #[error("authentication failed: invalid credentials")]
    AuthenticationFailed,

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// The target answered but rejected the request.
    #[error("operation failed: {message}")]
    OperationFailed { message: String },

    /// A change request the connector cannot act on.
    #[error("invalid data: {message}")]
    InvalidData { message: String },

    /// More than one object matched a value expected to be unique.
    #[error("correlation failed: multiple matches found for {attribute}={value}")]
    CorrelationMultipleMatches { attribute: String, value: String },

    /// A payload from the target could not be decoded.
    #[error("serialization error: {message}")]
    Serialization { message: String },
}

impl ConnectorError {
    /// Whether this is a communication-class failure.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ConnectorError::ConnectionFailed { .. }
                | ConnectorError::ConnectionTimeout { .. }
                | ConnectorError::NetworkError { .. }
        )
    }

    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    /// Stable code for logs and engine-side classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            ConnectorError::ConnectionFailed { .. } => "CONNECTION_FAILED",
            ConnectorError::ConnectionTimeout { .. } => "CONNECTION_TIMEOUT",
            ConnectorError::NetworkError { .. } => "NETWORK_ERROR",
            ConnectorError::AuthenticationFailed => "AUTH_FAILED",
            ConnectorError::InvalidConfiguration { .. } => "INVALID_CONFIG",
            ConnectorError::OperationFailed { .. } => "OPERATION_FAILED",
            ConnectorError::InvalidData { .. } => "INVALID_DATA",
            ConnectorError::CorrelationMultipleMatches { .. } => "CORRELATION_MULTIPLE_MATCHES",
            ConnectorError::Serialization { .. } => "SERIALIZATION_ERROR",
        }
    }

    pub fn connection_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConnectorError::ConnectionFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn network_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConnectorError::NetworkError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn operation_failed(message: impl Into<String>) -> Self {
        ConnectorError::OperationFailed {
            message: message.into(),
        }
    }

    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        ConnectorError::InvalidConfiguration {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for ConnectorError {
    fn from(err: serde_json::Error) -> Self {
        ConnectorError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Result type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;
