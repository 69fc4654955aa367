//! Error types for cmdstrip operations.

use std::io;
use thiserror::Error;

/// Result type alias using [`ChartError`].
pub type Result<T> = std::result::Result<T, ChartError>;

/// Errors that can occur in cmdstrip operations.
///
/// The parse/layout core never surfaces these past its boundary; they are
/// limited to configuration and history-log I/O, and every caller degrades
/// to a documented default instead of terminating.
#[derive(Error, Debug)]
pub enum ChartError {
    /// I/O error (history log, config file).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration parsing error with line number.
    #[error("configuration error at line {line}: {message}")]
    ConfigParse {
        /// Line number where the error occurred (1-indexed).
        line: usize,
        /// Error message describing the issue.
        message: String,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {0}")]
    ConfigNotFound(String),
}
