//! Backend error types.
//!
//! These error types represent failures when talking to the remote exam
//! backend. Defined in `itmaths-core` so the attempt engine can classify
//! failures without string matching. No call in this subsystem is retried:
//! a failed fetch is terminal for the attempt, and a failed result
//! persistence is logged and dropped.

use thiserror::Error;

/// Errors that can occur when interacting with the exam backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Authentication failed (missing or invalid API token).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested exam or resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl BackendError {
    /// Returns `true` if this failure is an authentication problem the user
    /// must fix in their configuration.
    pub fn is_auth(&self) -> bool {
        matches!(self, BackendError::AuthenticationFailed(_))
    }
}
