//! Authentication and API error types.

use portal_storage::StorageError;
use thiserror::Error;

/// Errors surfaced by [`crate::ApiClient`].
#[derive(Error, Debug)]
pub enum ApiError {
    /// The session could not be renewed; stored tokens have been cleared.
    #[error("Session expired. Please log in again.")]
    Unauthenticated,

    /// The server answered 404. Never retried.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success status. `message` is the body's `message`
    /// field, empty when the body had none.
    #[error("HTTP {status}{}", describe(.message))]
    Status { status: u16, message: String },

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

fn describe(message: &str) -> String {
    if message.trim().is_empty() {
        String::new()
    } else {
        format!(": {}", message)
    }
}

impl ApiError {
    /// Returns true if this error is transient and the operation can be retried.
    ///
    /// Transient errors include:
    /// - Connection failures and timeouts
    /// - HTTP 5xx responses
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Http(e) => {
                if e.is_connect() || e.is_timeout() || e.is_request() {
                    return true;
                }
                if let Some(status) = e.status() {
                    return status.is_server_error();
                }
                false
            }
            ApiError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// HTTP status code of the failed response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound(_) => Some(404),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The server-provided message, when the response carried a non-blank one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }
}

/// Result type alias using ApiError.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced by the session and password-reset flows.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Input rejected before any request was sent.
    #[error("{0}")]
    Validation(String),

    /// Request rejected by the server. Carries the message shown to the user
    /// (the server's own message when it sent one).
    #[error("{0}")]
    Rejected(String),

    /// Invalid state transition in the session FSM
    #[error("Invalid session state transition: {0}")]
    InvalidStateTransition(String),

    /// API error
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Build a `Rejected` error from an API failure, keeping the server's
    /// message verbatim and falling back to `fallback` otherwise.
    pub fn rejected(error: ApiError, fallback: &str) -> Self {
        if let Some(message) = error.server_message() {
            return AuthError::Rejected(message.to_string());
        }
        if error.is_transient() {
            AuthError::Api(error)
        } else {
            AuthError::Rejected(fallback.to_string())
        }
    }

    /// Returns true if this error is transient and the operation can be retried.
    pub fn is_transient(&self) -> bool {
        match self {
            AuthError::Api(e) => e.is_transient(),
            _ => false,
        }
    }
}

/// Result type alias using AuthError.
pub type AuthResult<T> = Result<T, AuthError>;
