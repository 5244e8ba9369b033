//! Error types for the CarbonTrace HTTP access layer
//!
//! Each variant's `Display` string is the human-readable message carried by
//! the terminal `Error` emission; presentation layers show it verbatim.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Operation precondition unmet; no request was attempted.
    #[error("User not logged in")]
    NotLoggedIn,

    /// The service answered with a non-success status. `body` is the
    /// best-effort decoded response text, or "HTTP {status}" when the body
    /// itself could not be read.
    #[error("Server error: {status} - {body}")]
    Server { status: u16, body: String },

    /// The request never produced a usable response: connect/DNS/timeout
    /// failures, or a success body that failed to decode.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Session persistence failed; fatal for the enclosing operation.
    #[error("Session store error: {0}")]
    Store(#[from] carbontrace_core::Error),

    /// Client construction failed.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// The message for the terminal `Error` emission. Falls back to a
    /// generic string in the degenerate case of an empty failure
    /// description.
    pub fn message(&self) -> String {
        let message = self.to_string();
        if message.is_empty() {
            "Unknown error occurred".to_string()
        } else {
            message
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
