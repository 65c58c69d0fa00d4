//! Error types for the ticket viewer.
//!
//! This module defines `ViewerError`, the unified error type used throughout
//! the library. Transport failures keep their specific kind for logging but
//! share one user-facing message per kind, see [`ViewerError::user_message`].
//!
//! # Security
//!
//! Error messages built from server responses are sanitized so the API
//! token never reaches logs or the terminal. Use `sanitize_message()` when
//! constructing error messages from external sources.

use std::time::Duration;
use thiserror::Error;

/// Message shown when the server could not be reached.
pub const UNREACHABLE_MESSAGE: &str =
    "The server is not available right now. Please try again later.";

/// Message shown when the server answered with a non-success status.
pub const REJECTED_MESSAGE: &str =
    "There was an error returned from the server. Please try again later.";

/// Message shown when a ticket id lookup fails.
pub const NOT_FOUND_MESSAGE: &str =
    "Sorry, there was no ticket with that id number. Please try again.";

/// Unified error type for all ticket viewer operations.
#[derive(Error, Debug)]
pub enum ViewerError {
    /// Configuration error - missing or invalid environment variables.
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP client initialization failed.
    #[error("HTTP client error: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// The request never produced a response (DNS, connect, TLS, reset).
    #[error("server unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    /// Request timed out.
    #[error("request timed out after {duration:?} ({operation})")]
    Timeout {
        /// How long we waited before timing out.
        duration: Duration,
        /// The operation that timed out.
        operation: String,
    },

    /// HTTP response returned a non-success status code.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// The HTTP status code returned.
        status: reqwest::StatusCode,
        /// The response body, truncated and sanitized.
        body: String,
    },

    /// The server refused the credentials (HTTP 401/403).
    #[error("authentication failed - check the email address and API token")]
    Authentication,

    /// The account has no OAuth client to issue a token for.
    #[error("no OAuth client is registered for this account")]
    NoOAuthClient,

    /// JSON serialization or deserialization failed.
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A response parsed but did not follow the expected protocol.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// A ticket record lacks one of the projected fields.
    #[error("ticket record {index} is missing field `{field}`")]
    MissingField {
        /// Name of the absent field.
        field: &'static str,
        /// Position of the record in the response.
        index: usize,
    },

    /// A ticket record has a projected field of the wrong shape.
    #[error("ticket record {index} has an invalid `{field}`: {reason}")]
    InvalidField {
        /// Name of the offending field.
        field: &'static str,
        /// Position of the record in the response.
        index: usize,
        /// What was wrong with the value.
        reason: String,
    },

    /// No ticket with the given id in the current table.
    #[error("ticket not found: {id}")]
    NotFound {
        /// The id that was looked up.
        id: u64,
    },

    /// Input validation failed.
    #[error("validation error: {0}")]
    Validation(String),

    /// The input stream ended while waiting for an answer.
    #[error("input closed")]
    InputClosed,

    /// Reading from or writing to the terminal failed.
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ViewerError {
    /// Creates a configuration error for an invalid value.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        ViewerError::Config(message.into())
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ViewerError::Validation(message.into())
    }

    /// Creates an unexpected-response error.
    pub fn unexpected(message: impl Into<String>) -> Self {
        ViewerError::UnexpectedResponse(message.into())
    }

    /// Creates a timeout error.
    pub fn timeout(duration: Duration, operation: impl Into<String>) -> Self {
        ViewerError::Timeout {
            duration,
            operation: operation.into(),
        }
    }

    /// Returns true if the request failed at the transport or HTTP level.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ViewerError::Unreachable(_)
                | ViewerError::Timeout { .. }
                | ViewerError::HttpStatus { .. }
                | ViewerError::Authentication
        )
    }

    /// Returns the message shown to the user for this failure.
    ///
    /// Transport failures map to the two fixed messages; everything else
    /// falls back to the error's display text.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ViewerError::Unreachable(_) | ViewerError::Timeout { .. } => {
                UNREACHABLE_MESSAGE.to_string()
            }
            ViewerError::HttpStatus { .. } | ViewerError::Authentication => {
                REJECTED_MESSAGE.to_string()
            }
            ViewerError::NotFound { .. } => NOT_FOUND_MESSAGE.to_string(),
            other => format!("Something went wrong: {}", other),
        }
    }

    /// Replaces every occurrence of `secret` in `message` with `[REDACTED]`.
    #[must_use]
    pub fn sanitize_message(message: &str, secret: &str) -> String {
        if secret.is_empty() {
            return message.to_string();
        }
        message.replace(secret, "[REDACTED]")
    }

    /// Creates a sanitized version of this error's display message.
    #[must_use]
    pub fn sanitized_display(&self, secret: &str) -> String {
        Self::sanitize_message(&self.to_string(), secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = ViewerError::validation("subdomain is required");
        assert_eq!(err.to_string(), "validation error: subdomain is required");
    }

    #[test]
    fn test_not_found_error() {
        let err = ViewerError::NotFound { id: 99 };
        assert_eq!(err.to_string(), "ticket not found: 99");
        assert_eq!(err.user_message(), NOT_FOUND_MESSAGE);
    }

    #[test]
    fn test_timeout_error() {
        let err = ViewerError::timeout(Duration::from_secs(30), "GET /tickets");
        let msg = err.to_string();
        assert!(msg.contains("timed out"));
        assert!(msg.contains("30s"));
        assert!(err.is_transport());
        assert_eq!(err.user_message(), UNREACHABLE_MESSAGE);
    }

    #[test]
    fn test_http_status_is_rejected() {
        let err = ViewerError::HttpStatus {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".to_string(),
        };
        assert!(err.is_transport());
        assert_eq!(err.user_message(), REJECTED_MESSAGE);
    }

    #[test]
    fn test_authentication_is_rejected() {
        assert!(ViewerError::Authentication.is_transport());
        assert_eq!(ViewerError::Authentication.user_message(), REJECTED_MESSAGE);
    }

    #[test]
    fn test_missing_field_is_not_transport() {
        let err = ViewerError::MissingField {
            field: "subject",
            index: 3,
        };
        assert!(!err.is_transport());
        assert_eq!(err.to_string(), "ticket record 3 is missing field `subject`");
        assert!(err.user_message().contains("missing field"));
    }

    #[test]
    fn test_sanitize_message_removes_token() {
        let token = "super_secret_token_12345";
        let message = format!("Error connecting with token {} to server", token);
        let sanitized = ViewerError::sanitize_message(&message, token);
        assert!(!sanitized.contains(token));
        assert!(sanitized.contains("[REDACTED]"));
    }

    #[test]
    fn test_sanitize_message_empty_secret() {
        let message = "Some error message";
        let sanitized = ViewerError::sanitize_message(message, "");
        assert_eq!(sanitized, message);
    }

    #[test]
    fn test_sanitized_display() {
        let err = ViewerError::unexpected("token abc123 rejected");
        assert_eq!(
            err.sanitized_display("abc123"),
            "unexpected response: token [REDACTED] rejected"
        );
    }
}
