//! Error types for ts3query
//!
//! Provides a unified error type for all operations.
//!
//! A non-`ok` status line is *not* an error: it is returned as a
//! [`Status`](crate::protocol::Status) inside `Ok`. Errors are reserved for
//! transport faults, record parse failures and refused session setup.

use thiserror::Error;

use crate::protocol::Status;

/// Result type alias using QueryError
pub type Result<T> = std::result::Result<T, QueryError>;

/// Unified error type for ts3query operations
#[derive(Debug, Error)]
pub enum QueryError {
    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Short, truncated or garbled reply (no status line could be found)
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid WebQuery envelope: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Record Errors
    // -------------------------------------------------------------------------
    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Malformed field {field}={value:?}: {reason}")]
    MalformedField {
        field: String,
        value: String,
        reason: String,
    },

    // -------------------------------------------------------------------------
    // Session Errors
    // -------------------------------------------------------------------------
    /// A session setup command (login, use) was answered with a non-ok status
    #[error("Command `{command}` rejected: {status}")]
    Rejected { command: String, status: Status },

    #[error("Not found: {0}")]
    NotFound(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl QueryError {
    /// Build a `MalformedField` error
    pub fn malformed(field: &str, value: &str, reason: impl ToString) -> Self {
        QueryError::MalformedField {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    /// True when the call never produced a usable reply from the server
    pub fn is_transport_fault(&self) -> bool {
        matches!(
            self,
            QueryError::Io(_) | QueryError::Transport(_) | QueryError::Http(_) | QueryError::Json(_)
        )
    }

    /// True for per-record parse failures that listing operations skip over
    pub fn is_field_error(&self) -> bool {
        matches!(
            self,
            QueryError::MissingField(_) | QueryError::MalformedField { .. }
        )
    }
}
