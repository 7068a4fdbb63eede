//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// The suite ran but not every scenario passed
    #[error("{failed} scenario(s) failed, {skipped} skipped")]
    SuiteFailed {
        /// Failed scenarios
        failed: usize,
        /// Scenarios never run
        skipped: usize,
    },

    /// Binary built without browser support
    #[error("Browser support not enabled. Rebuild with --features browser")]
    BrowserUnavailable,

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// askprobe library error
    #[error(transparent)]
    Probe(#[from] askprobe::ProbeError),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_suite_failed_message() {
        let err = CliError::SuiteFailed {
            failed: 2,
            skipped: 3,
        };
        assert_eq!(err.to_string(), "2 scenario(s) failed, 3 skipped");
    }

    #[test]
    fn test_library_errors_pass_through() {
        let err: CliError = askprobe::ProbeError::config("unknown language tag: fr").into();
        assert_eq!(
            err.to_string(),
            "Configuration error: unknown language tag: fr"
        );
    }
}
