//! Error types for the users API client.
//!
//! # Design
//! Three failure kinds reach the UI layer: the request never completed
//! (`Network`, reported by the host), the server answered with a non-2xx
//! status (`Http`), or the body was not valid JSON (`Parse`). Malformed JSON
//! is reported as `Parse` even when the status was also an error, because the
//! body is decoded before the status is inspected.

use serde_json::Value;
use thiserror::Error;

/// Errors produced while building requests or interpreting responses.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The request never completed. Constructed by the host that executes
    /// the HTTP round-trip.
    #[error("network failure: {0}")]
    Network(String),

    /// The server returned a non-2xx status. `body` is the decoded payload,
    /// or `{"message": <reason phrase>}` when the server sent nothing.
    #[error("HTTP {status}: {}", message_of(.body).unwrap_or("request failed"))]
    Http { status: u16, body: Value },

    /// The response body is not valid JSON, or does not have the expected
    /// shape.
    #[error("invalid response body: {0}")]
    Parse(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// Build an HTTP error, substituting `{"message": status_text}` for an
    /// empty body.
    pub fn http(status: u16, body: Option<Value>, status_text: &str) -> Self {
        let body = match body {
            Some(Value::Null) | None => serde_json::json!({ "message": status_text }),
            Some(body) => body,
        };
        ApiError::Http { status, body }
    }

    /// Message suitable for a notification or inline alert.
    pub fn message(&self) -> String {
        match self {
            ApiError::Http { body, .. } => match message_of(body) {
                Some(msg) => msg.to_string(),
                None => self.to_string(),
            },
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

fn message_of(body: &Value) -> Option<&str> {
    body.get("message")
        .and_then(Value::as_str)
        .filter(|msg| !msg.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_body_falls_back_to_status_text() {
        let err = ApiError::http(503, None, "Service Unavailable");
        match &err {
            ApiError::Http { status, body } => {
                assert_eq!(*status, 503);
                assert_eq!(body, &json!({ "message": "Service Unavailable" }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.message(), "Service Unavailable");
    }

    #[test]
    fn server_message_is_preferred() {
        let err = ApiError::http(404, Some(json!({ "message": "User not found" })), "Not Found");
        assert_eq!(err.message(), "User not found");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "HTTP 404: User not found");
    }

    #[test]
    fn body_without_message_uses_display() {
        let err = ApiError::http(422, Some(json!({ "errors": ["email"] })), "Unprocessable Entity");
        assert_eq!(err.message(), "HTTP 422: request failed");
    }

    #[test]
    fn network_and_parse_have_no_status() {
        assert_eq!(ApiError::Network("refused".into()).status(), None);
        assert_eq!(ApiError::Parse("eof".into()).message(), "invalid response body: eof");
    }
}
