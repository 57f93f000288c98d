//! Rendered response content

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

/// Rendered body with its MIME type and charset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    content_type: &'static str,
    charset: Option<&'static str>,
    body: String,
}

impl Content {
    /// HTML page in UTF-8
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            content_type: "text/html",
            charset: Some("utf-8"),
            body: body.into(),
        }
    }

    /// Plain text in UTF-8
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            content_type: "text/plain",
            charset: Some("utf-8"),
            body: body.into(),
        }
    }

    /// MIME type without parameters
    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    pub fn charset(&self) -> Option<&'static str> {
        self.charset
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Full `Content-Type` header value
    pub fn header_value(&self) -> String {
        match self.charset {
            Some(charset) => format!("{}; charset={}", self.content_type, charset),
            None => self.content_type.to_string(),
        }
    }
}

impl IntoResponse for Content {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, self.header_value())],
            self.body,
        )
            .into_response()
    }
}

// =============================================================================
// TESTS
// =============================================================================
