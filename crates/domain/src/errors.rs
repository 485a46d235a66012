//! Error types used throughout the client

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the Moneybird client
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum MoneybirdError {
    /// Client cannot be built (missing credentials, unreadable config).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The authorization handshake failed and has to be restarted.
    #[error("Authentication error: {0}")]
    Auth(AuthFailure),

    /// The request never produced an HTTP response.
    #[error("Transport error #{code}: {message}")]
    Transport { code: i32, message: String },

    /// The server answered with a status outside the `20x` range.
    #[error("Request failed with code: {status}, message: {body}")]
    HttpStatus { status: u16, body: String },

    /// The response body matched none of the known wire formats.
    #[error("Unable to determine response content type automatically")]
    ContentTypeIndeterminate,

    /// The body was classified but could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// An administration-scoped call was attempted before verification.
    #[error("No verified administration; complete the authorization handshake first")]
    MissingAdministration,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Session store read or write failed.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Reasons the authorization handshake can be rejected
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthFailure {
    /// The redirect nonce does not match the one issued with the authorization URL.
    #[error("nonce mismatch")]
    NonceMismatch,

    /// A redirect arrived but no authorization URL was issued in this session.
    #[error("no authorization request is pending")]
    MissingNonce,

    /// The administrations listing answered with an error-shaped body.
    #[error("error in creating connection: {0}")]
    ConnectionRejected(String),
}

impl MoneybirdError {
    /// Returns `true` for failures the caller could retry without changing input.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// HTTP status carried by the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<AuthFailure> for MoneybirdError {
    fn from(value: AuthFailure) -> Self {
        Self::Auth(value)
    }
}

impl From<serde_json::Error> for MoneybirdError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value.to_string())
    }
}

/// Result type alias for Moneybird operations
pub type Result<T> = std::result::Result<T, MoneybirdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_error_displays_status_and_body() {
        let err = MoneybirdError::HttpStatus { status: 500, body: "boom".into() };
        assert_eq!(err.to_string(), "Request failed with code: 500, message: boom");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn transport_error_keeps_code() {
        let err = MoneybirdError::Transport { code: 7, message: "connection refused".into() };
        assert!(err.to_string().contains("#7"));
        assert!(err.is_transient());
    }

    #[test]
    fn client_errors_are_not_transient() {
        let err = MoneybirdError::HttpStatus { status: 422, body: String::new() };
        assert!(!err.is_transient());
        assert!(!MoneybirdError::ContentTypeIndeterminate.is_transient());
    }

    #[test]
    fn auth_failure_converts_into_domain_error() {
        let err: MoneybirdError = AuthFailure::NonceMismatch.into();
        assert_eq!(err, MoneybirdError::Auth(AuthFailure::NonceMismatch));
        assert_eq!(err.to_string(), "Authentication error: nonce mismatch");
    }

    #[test]
    fn errors_serialize_with_type_tag() {
        let err = MoneybirdError::Config("missing client id".into());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "Config");
        assert_eq!(json["message"], "missing client id");
    }
}
