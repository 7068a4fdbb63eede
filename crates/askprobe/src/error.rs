//! Result and error types for askprobe.

use thiserror::Error;

/// Result type for askprobe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while probing the chat widget
#[derive(Debug, Error)]
pub enum ProbeError {
    /// A bounded wait ran out of time
    #[error("Timeout after {ms}ms waiting for {condition}")]
    Timeout {
        /// What was being waited for
        condition: String,
        /// Deadline in milliseconds
        ms: u64,
    },

    /// Element absent, not interactable, or not resolvable from the locator set
    #[error("Interaction failed: {message}")]
    Interaction {
        /// Error message
        message: String,
    },

    /// One or more content checks failed
    #[error("Validation failed: {}", reasons.join(", "))]
    ValidationFailure {
        /// Human-readable reasons, never empty
        reasons: Vec<String>,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// A browser protocol call failed
    #[error("Browser error: {message}")]
    Browser {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// Configuration could not be used
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ProbeError {
    /// Create a timeout error
    #[must_use]
    pub fn timeout(condition: impl Into<String>, ms: u64) -> Self {
        Self::Timeout {
            condition: condition.into(),
            ms,
        }
    }

    /// Create an interaction error
    #[must_use]
    pub fn interaction(message: impl Into<String>) -> Self {
        Self::Interaction {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a browser error
    #[must_use]
    pub fn browser(message: impl Into<String>) -> Self {
        Self::Browser {
            message: message.into(),
        }
    }

    /// Short machine-friendly kind used in reports
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Interaction { .. } => "interaction",
            Self::ValidationFailure { .. } => "validation",
            Self::BrowserLaunch { .. } | Self::Browser { .. } => "browser",
            Self::Navigation { .. } => "navigation",
            Self::Screenshot { .. } => "screenshot",
            Self::Config { .. } | Self::Yaml(_) | Self::Json(_) => "config",
            Self::Io(_) => "io",
        }
    }

    /// Whether this is a `Timeout`
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
