//! Error types for the OTRS MCP server.
//!
//! This module defines `OtrsError`, the unified error type used throughout
//! the crate. Dispatcher failures fall into three families: transport
//! failures (`Transport`, `Timeout`), HTTP status failures (`RemoteHttp`)
//! and undecodable bodies (`MalformedResponse`). Application errors that
//! OTRS reports inside a successful JSON body are normally returned as data,
//! not raised.
//!
//! # Security
//!
//! The OTRS password travels inside every request body, so a misbehaving
//! server may echo it back. Use `sanitize_message()` before logging or
//! returning any message built from remote content.

use std::time::Duration;
use thiserror::Error;

/// Unified error type for all OTRS adapter operations.
#[derive(Error, Debug)]
pub enum OtrsError {
    /// Configuration error - missing or invalid environment variables.
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP client initialization failed.
    #[error("HTTP client error: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// The request could not be delivered or the response could not be read
    /// (DNS, TLS, connection refused, broken body stream).
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Request timed out.
    #[error("request timed out after {duration:?} - the server may be slow or unreachable")]
    Timeout {
        /// How long we waited before timing out.
        duration: Duration,
        /// The operation that timed out.
        operation: String,
    },

    /// The remote server answered with a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    RemoteHttp {
        /// The HTTP status code returned.
        status: reqwest::StatusCode,
        /// The response body, truncated.
        body: String,
    },

    /// The response body was not a JSON object.
    #[error("malformed response from {operation}: {reason}")]
    MalformedResponse {
        /// The remote operation that produced the body.
        operation: String,
        /// Why decoding failed.
        reason: String,
    },

    /// OTRS reported an application error inside a 2xx JSON body.
    #[error("OTRS error {code}: {message}")]
    RemoteApplication {
        /// OTRS error code, e.g. `SessionCreate.AuthFail`.
        code: String,
        /// Human-readable error message from OTRS.
        message: String,
    },

    /// JSON serialization failed while building a request.
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Input validation failed.
    #[error("validation error: {0}")]
    Validation(String),

    /// Connection test failed.
    #[error("connection test failed: {message}")]
    ConnectionTest {
        /// Details about why the connection test failed.
        message: String,
    },
}

impl OtrsError {
    /// Creates a configuration error for a missing environment variable.
    pub fn missing_env(var_name: &str) -> Self {
        OtrsError::Config(format!(
            "missing required environment variable: {}",
            var_name
        ))
    }

    /// Creates a configuration error for an invalid value.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        OtrsError::Config(message.into())
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        OtrsError::Validation(message.into())
    }

    /// Creates a timeout error.
    pub fn timeout(duration: Duration, operation: impl Into<String>) -> Self {
        OtrsError::Timeout {
            duration,
            operation: operation.into(),
        }
    }

    /// Creates a malformed response error.
    pub fn malformed(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        OtrsError::MalformedResponse {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Creates an application error from an OTRS `Error` object.
    pub fn remote_application(code: impl Into<String>, message: impl Into<String>) -> Self {
        OtrsError::RemoteApplication {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Creates a connection test error.
    pub fn connection_test(message: impl Into<String>) -> Self {
        OtrsError::ConnectionTest {
            message: message.into(),
        }
    }

    /// Returns true if the request never produced an HTTP response.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, OtrsError::Transport(_) | OtrsError::Timeout { .. })
    }

    /// Returns the HTTP status for `RemoteHttp` errors.
    #[must_use]
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            OtrsError::RemoteHttp { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Replaces every occurrence of `secret` in `message` with `[REDACTED]`.
    ///
    /// An empty secret leaves the message untouched.
    #[must_use]
    pub fn sanitize_message(message: &str, secret: &str) -> String {
        if secret.is_empty() {
            return message.to_string();
        }
        message.replace(secret, "[REDACTED]")
    }

    /// Display message with `secret` redacted.
    #[must_use]
    pub fn sanitized_display(&self, secret: &str) -> String {
        Self::sanitize_message(&self.to_string(), secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_env_error() {
        let err = OtrsError::missing_env("OTRS_PASSWORD");
        assert!(err.to_string().contains("OTRS_PASSWORD"));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_validation_error() {
        let err = OtrsError::validation("ticket_id is required");
        assert_eq!(err.to_string(), "validation error: ticket_id is required");
    }

    #[test]
    fn test_timeout_error_is_transport() {
        let err = OtrsError::timeout(Duration::from_secs(30), "TicketGet");
        let msg = err.to_string();
        assert!(msg.contains("timed out"));
        assert!(msg.contains("30s"));
        assert!(err.is_transport());
    }

    #[test]
    fn test_remote_http_exposes_status() {
        let err = OtrsError::RemoteHttp {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".to_string(),
        };
        assert_eq!(err.status(), Some(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!err.is_transport());
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_malformed_response_message() {
        let err = OtrsError::malformed("TicketSearch", "expected value at line 1 column 1");
        let msg = err.to_string();
        assert!(msg.starts_with("malformed response from TicketSearch"));
        assert!(err.status().is_none());
    }

    #[test]
    fn test_remote_application_message() {
        let err = OtrsError::remote_application("SessionCreate.AuthFail", "Authorization failing!");
        assert_eq!(
            err.to_string(),
            "OTRS error SessionCreate.AuthFail: Authorization failing!"
        );
    }

    #[test]
    fn test_sanitize_message_removes_password() {
        let password = "s3cr3t-pass";
        let message = format!("{{\"UserLogin\":\"agent\",\"Password\":\"{}\"}}", password);
        let sanitized = OtrsError::sanitize_message(&message, password);
        assert!(!sanitized.contains(password));
        assert!(sanitized.contains("[REDACTED]"));
    }

    #[test]
    fn test_sanitize_message_empty_secret() {
        let message = "Some error message";
        assert_eq!(OtrsError::sanitize_message(message, ""), message);
    }

    #[test]
    fn test_sanitized_display() {
        let err = OtrsError::RemoteHttp {
            status: reqwest::StatusCode::BAD_REQUEST,
            body: "bad password hunter2".to_string(),
        };
        let msg = err.sanitized_display("hunter2");
        assert!(msg.contains("[REDACTED]"));
        assert!(!msg.contains("hunter2"));
    }

    #[test]
    fn test_connection_test_error() {
        let err = OtrsError::connection_test("Could not reach server");
        let msg = err.to_string();
        assert!(msg.contains("connection test failed"));
        assert!(msg.contains("Could not reach server"));
    }
}
