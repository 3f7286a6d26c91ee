//! Error handling for the smsdesk client layer
//!
//! One error enum covers every client operation. Transport and parsing
//! failures are converted automatically with `thiserror`; backend rejections
//! keep the HTTP status and whatever `detail` string the backend put in its
//! JSON error body.

use thiserror::Error;

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to the backend or validating input
#[derive(Error, Debug)]
pub enum ClientError {
    /// I/O error (file system, sockets)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport-level HTTP failure (connect, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-2xx status
    ///
    /// `detail` carries the backend's JSON `detail` field when the error body
    /// had one; it is surfaced for display and logging only.
    #[error("Backend error ({status}): {detail}")]
    Backend { status: u16, detail: String },

    /// Credentials were rejected by the backend
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The stored session token is missing or no longer valid
    #[error("Session expired")]
    SessionExpired,

    /// Client-side validation rejected the operation before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error (bad backend URL, missing secret)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Operation cancelled (poller stopped mid-request)
    #[error("Operation cancelled: {0}")]
    Cancelled(String),
}

impl ClientError {
    /// Build a `Backend` error from a status code and an optional JSON body
    ///
    /// The backend reports failures as `{"detail": "..."}`. Anything else is
    /// kept verbatim so the message is never silently lost.
    pub fn backend(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("detail").cloned())
            .and_then(|d| d.as_str().map(str::to_owned))
            .unwrap_or_else(|| body.trim().to_string());
        ClientError::Backend { status, detail }
    }

    /// Check if this error is recoverable (transient, worth retrying later)
    pub fn is_recoverable(&self) -> bool {
        match self {
            ClientError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ClientError::Backend { status, .. } => *status >= 500,
            ClientError::Io(_) => true,
            _ => false,
        }
    }

    /// User-facing message suitable for an inline alert or flash banner
    pub fn user_message(&self) -> String {
        match self {
            ClientError::AuthenticationFailed(_) => {
                "Incorrect email or password.".to_string()
            }
            ClientError::SessionExpired => {
                "Your session has expired. Please log in again.".to_string()
            }
            ClientError::Validation(msg) => msg.clone(),
            ClientError::Backend { status, detail } if detail.is_empty() => {
                format!("The backend rejected the request (HTTP {}).", status)
            }
            ClientError::Backend { detail, .. } => detail.clone(),
            ClientError::Http(_) | ClientError::Io(_) => {
                "Could not reach the backend. Check the connection and try again.".to_string()
            }
            ClientError::Json(_) => "The backend sent an unexpected response.".to_string(),
            ClientError::Configuration(msg) => format!("Configuration error: {}", msg),
            ClientError::Cancelled(msg) => format!("Cancelled: {}", msg),
        }
    }
}
