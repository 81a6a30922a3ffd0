//! Error types.
//!
//! Failures come through two channels. [`Error`] is returned synchronously
//! while a client is being set up. [`TransportError`] is what an
//! [`Awaitable`](crate::Awaitable) rejects with once a request is under way.

use std::time::Duration;
use thiserror::Error;

/// Result type for request-time operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors raised by the transport while a request is in flight.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request timed out.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Request building error.
    #[error("Failed to build request: {0}")]
    RequestBuild(String),

    /// Non-success status. The message is the canonical reason phrase.
    #[error("{message}")]
    Response {
        /// HTTP status code.
        status: u16,
        /// Reason phrase, e.g. `Not Found`.
        message: String,
        /// Response body as text.
        body: String,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// A spawned request task did not complete.
    #[error("Request aborted: {0}")]
    Aborted(String),

    /// Underlying HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl TransportError {
    /// Classify a reqwest failure.
    ///
    /// `timeout` is the limit that was in force for the request.
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else if err.is_builder() {
            Self::RequestBuild(err.to_string())
        } else {
            Self::Http(err)
        }
    }

    /// Check if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_)) || matches!(self, Self::Http(e) if e.is_timeout())
    }

    /// Check if this is a connection error.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_)) || matches!(self, Self::Http(e) if e.is_connect())
    }

    /// Get the HTTP status code if this is a response error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Response { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Errors raised while configuring a client.
#[derive(Debug, Error)]
pub enum Error {
    /// The awaitable factory cannot resolve, reject and chain.
    #[error("expected a promise constructor: {0}")]
    InvalidPromiseConstructor(String),

    /// No operation is bound under this id.
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// The local test server could not be started.
    #[error("Test server error: {0}")]
    Server(#[source] std::io::Error),

    /// The specification document could not be parsed.
    #[error("Specification error: {0}")]
    Spec(#[from] specio_spec::SpecError),

    /// Fetching a remote specification failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_error_displays_reason() {
        let err = TransportError::Response {
            status: 404,
            message: "Not Found".to_string(),
            body: String::new(),
        };
        assert_eq!(err.to_string(), "Not Found");
        assert_eq!(err.status_code(), Some(404));
    }

    #[test]
    fn test_timeout_classification() {
        let err = TransportError::Timeout(Duration::from_secs(1));
        assert!(err.is_timeout());
        assert!(!err.is_connection());
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn test_transport_error_passes_through_unchanged() {
        let err: Error = TransportError::Connection("refused".to_string()).into();
        assert_eq!(err.to_string(), "Connection error: refused");
    }
}
