//! Domain error type shared by the task store and the batch exporter.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShelfError {
    /// A required field was empty or a value was rejected.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The operation targeted a task id that does not exist.
    #[error("Task {0} not found")]
    NotFound(i64),

    /// One page could not be retrieved.
    #[error("Failed to retrieve {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// One item container could not be extracted.
    #[error("Parse error: {0}")]
    Parse(String),

    /// `run` was called on an export that already wrote its file.
    #[error("Export already finished")]
    AlreadyFinished,

    #[error("Config error: {0}")]
    Config(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ShelfError>;

impl ShelfError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn fetch(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<anyhow::Error> for ShelfError {
    fn from(err: anyhow::Error) -> Self {
        ShelfError::Migration(format!("{err:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(ShelfError::NotFound(7).to_string(), "Task 7 not found");
        assert_eq!(
            ShelfError::fetch("http://x/page-3.html", "HTTP status 404").to_string(),
            "Failed to retrieve http://x/page-3.html: HTTP status 404"
        );
        assert_eq!(
            ShelfError::validation("title is required").to_string(),
            "Validation error: title is required"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "read-only");
        let err: ShelfError = io_err.into();
        assert!(matches!(err, ShelfError::Io(_)));
    }
}
