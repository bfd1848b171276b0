//! Error types for unexam library.

use std::io;
use thiserror::Error;

/// Result type alias for unexam operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during structure extraction.
///
/// Most anomalies in the input (unparseable patterns, broken merge markers,
/// missing style metadata) are absorbed by the pipeline and never surface
/// here. These variants cover I/O at the edges and violations of the input
/// contract itself.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A required input was absent (as opposed to present but empty).
    #[error("Required input missing: {0}")]
    MissingInput(String),

    /// A pattern string failed to compile.
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern source
        pattern: String,
        /// Compiler message
        reason: String,
    },

    /// Rule configuration could not be interpreted.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error during rendering (text, HTML, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// The batch was cancelled before the document started.
    #[error("Cancelled")]
    Cancelled,

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        match err {
            regex::Error::Syntax(reason) => Error::InvalidPattern {
                pattern: String::new(),
                reason,
            },
            other => Error::Other(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MissingInput("runs".to_string());
        assert_eq!(err.to_string(), "Required input missing: runs");

        let err = Error::InvalidPattern {
            pattern: "([".to_string(),
            reason: "unclosed group".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid pattern '([': unclosed group");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<Vec<u32>>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
