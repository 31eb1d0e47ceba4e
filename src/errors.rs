/*!
 * Error types for the xliffedit application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur when loading, mutating, or saving a bilingual document
#[derive(Error, Debug)]
pub enum DocumentError {
    /// Input exceeds the configured size cap, rejected before parsing
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge {
        /// Actual size of the offered input
        size: u64,
        /// Configured maximum
        max: u64,
    },

    /// The document could not be parsed, or exceeded a defensive parse limit
    #[error("Malformed document: {0}")]
    Malformed(String),

    /// A filesystem operation failed; the original file is left untouched
    #[error("I/O failure: {0}")]
    Io(String),
}

/// Errors that can occur when talking to a spelling backend
#[derive(Error, Debug)]
pub enum SpellingError {
    /// Error when making a request to the backend fails
    #[error("Spelling request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing a backend response fails
    #[error("Failed to parse spelling response: {0}")]
    ParseError(String),

    /// Error returned by the backend itself
    #[error("Spelling backend responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the backend
        message: String,
    },

    /// The backend did not answer within the allowed time
    #[error("Spelling backend timed out: {0}")]
    Timeout(String),

    /// The supplied language code is not usable for spell checking
    #[error("Invalid language code: {0}")]
    InvalidLanguage(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a document operation
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Error from the spelling backend
    #[error("Spelling error: {0}")]
    Spelling(#[from] SpellingError),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
