//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Chart file could not be read or understood
    #[error("Invalid chart {path}: {message}")]
    Chart {
        /// Chart file path
        path: String,
        /// Error message
        message: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Chartplan library error
    #[error("Chartplan error: {0}")]
    Plan(#[from] chartplan::PlanError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },
}

impl CliError {
    /// Create a chart error
    #[must_use]
    pub fn chart(path: &std::path::Path, message: impl Into<String>) -> Self {
        Self::Chart {
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_chart_error_names_file() {
        let err = CliError::chart(Path::new("door.yaml"), "unexpected key");
        assert_eq!(err.to_string(), "Invalid chart door.yaml: unexpected key");
    }

    #[test]
    fn test_invalid_argument_error() {
        let err = CliError::invalid_argument("bad arg");
        assert!(err.to_string().contains("Invalid argument"));
    }

    #[test]
    fn test_plan_error_from() {
        let err: CliError = chartplan::PlanError::parse("eof").into();
        assert!(err.to_string().contains("Chartplan error"));
        assert!(err.to_string().contains("eof"));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(cli_err.to_string().contains("I/O"));
    }
}
