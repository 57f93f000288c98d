//! Error types for Greeter
//!
//! Library operations return one of the narrow error enums below. Handlers
//! fold them into [`AppError`], which knows how to become an HTTP response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::types::NodeKind;

/// Errors from the JSON document adapter
#[derive(Error, Debug)]
pub enum JsonError {
    /// Input text is not well-formed JSON
    #[error("malformed JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A native value could not be turned into a JSON tree
    #[error("cannot encode value as JSON: {0}")]
    Encode(serde_json::Error),

    /// Typed extraction on a node of another kind
    #[error("expected {expected} node, found {found}")]
    TypeMismatch { expected: NodeKind, found: NodeKind },

    /// Typed extraction on the missing sentinel
    #[error("expected {expected} node, but path is missing")]
    Missing { expected: NodeKind },

    /// Integer node does not fit in i64
    #[error("integer {0} does not fit in i64")]
    IntegerOverflow(u64),
}

/// Errors from decoding a session cookie
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    /// Cookie value has no `<signature>-<payload>` shape
    #[error("malformed session cookie")]
    Malformed,

    /// Signature does not match the payload
    #[error("session cookie signature mismatch")]
    BadSignature,

    /// Payload is not valid percent-encoded UTF-8
    #[error("session cookie payload is not valid UTF-8")]
    Encoding,

    /// Secret cannot key the MAC
    #[error("invalid session secret")]
    InvalidKey,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Secret too short to sign sessions
    #[error("session secret must be at least {min} bytes, got {actual}")]
    SecretTooShort { min: usize, actual: usize },

    /// Listen address does not parse
    #[error("invalid listen address {addr:?}: {source}")]
    InvalidAddr {
        addr: String,
        source: std::net::AddrParseError,
    },

    /// Unusable log filter
    #[error("invalid log level {0:?}")]
    InvalidLogLevel(String),
}

/// Application-level error surfaced by handlers and the server
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Json(#[from] JsonError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP body error: {0}")]
    Body(#[from] axum::Error),
}

impl AppError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Json(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Session(_) | Self::Config(_) | Self::Io(_) | Self::Body(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        (status, self.to_string()).into_response()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_error() -> serde_json::Error {
        serde_json::from_str::<serde_json::Value>("{").unwrap_err()
    }

    #[test]
    fn test_client_errors_are_bad_request() {
        let json = AppError::from(JsonError::Parse(parse_error()));
        let mismatch = AppError::from(JsonError::TypeMismatch {
            expected: NodeKind::String,
            found: NodeKind::Integer,
        });
        let bad = AppError::BadRequest("Expecting Json data".to_string());

        assert_eq!(json.status(), StatusCode::BAD_REQUEST);
        assert_eq!(mismatch.status(), StatusCode::BAD_REQUEST);
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_server_errors_are_internal() {
        let errors = [
            AppError::from(SessionError::InvalidKey),
            AppError::from(SessionError::BadSignature),
            AppError::from(ConfigError::InvalidLogLevel("loud".to_string())),
            AppError::from(std::io::Error::new(std::io::ErrorKind::Other, "closed")),
            AppError::from(axum::Error::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                "reset",
            ))),
        ];

        for error in errors {
            assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR, "{}", error);
        }
    }

    #[tokio::test]
    async fn test_into_response_carries_message() {
        let response = AppError::BadRequest("no name".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"bad request: no name");
    }
}
