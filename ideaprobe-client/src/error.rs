//! Error types for the Ideaprobe client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to the workflow engine or the LLM API
#[derive(Debug, Error)]
pub enum ClientError {
    /// The remote system could not be reached
    #[error("transport failed: {0}")]
    TransportFailed(#[from] reqwest::Error),

    /// The remote system answered with a non-success status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Response body, or a placeholder when it could not be read
        message: String,
    },

    /// The body was not JSON even after noise-stripping
    ///
    /// Indicates a contract violation by the remote system rather than a
    /// connectivity problem.
    #[error("failed to decode response: {message}")]
    DecodeFailed {
        message: String,
        /// Cleaned body text that failed to parse
        body: String,
    },

    /// A decoded response lacked a required field
    #[error("response is missing field: {0}")]
    MissingField(String),

    /// Creating a remote execution failed
    #[error("launch failed: {0}")]
    LaunchFailed(#[source] Box<ClientError>),

    /// The request was rejected before being sent
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Wrap an error as a launch failure, leaving existing launch failures as they are
    pub fn launch_failed(err: ClientError) -> Self {
        match err {
            Self::LaunchFailed(_) => err,
            other => Self::LaunchFailed(Box::new(other)),
        }
    }

    /// Check if this error came from the network layer
    pub fn is_transport(&self) -> bool {
        match self {
            Self::TransportFailed(_) => true,
            Self::LaunchFailed(inner) => inner.is_transport(),
            _ => false,
        }
    }

    /// Check if this error is a decode failure
    pub fn is_decode(&self) -> bool {
        match self {
            Self::DecodeFailed { .. } => true,
            Self::LaunchFailed(inner) => inner.is_decode(),
            _ => false,
        }
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_failed_does_not_nest() {
        let err = ClientError::launch_failed(ClientError::MissingField("execution_id".into()));
        let err = ClientError::launch_failed(err);
        match err {
            ClientError::LaunchFailed(inner) => {
                assert!(matches!(*inner, ClientError::MissingField(_)))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_status_classification() {
        assert!(ClientError::api_error(404, "missing").is_client_error());
        assert!(ClientError::api_error(502, "bad gateway").is_server_error());
        assert!(!ClientError::api_error(502, "bad gateway").is_client_error());
    }

    #[test]
    fn test_decode_classification_sees_through_launch() {
        let err = ClientError::launch_failed(ClientError::DecodeFailed {
            message: "expected value".into(),
            body: "<html>".into(),
        });
        assert!(err.is_decode());
        assert!(!err.is_transport());
    }
}
