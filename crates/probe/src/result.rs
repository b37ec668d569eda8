//! Result and error types for booker-probe.

use thiserror::Error;

/// Result type for probe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// One structured schema violation, kept on the error so callers can log it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SchemaViolation {
    /// JSON pointer into the validated instance
    pub path: String,
    /// Human-readable message from the validator
    pub message: String,
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "{path}: {}", self.message)
    }
}

/// Errors that can occur while probing the booking API or the demo page
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Required configuration value is absent
    #[error("Missing configuration: {key} is not set")]
    MissingConfig {
        /// Name of the missing key
        key: String,
    },

    /// Configuration value could not be parsed
    #[error("Invalid configuration for {key}: {message}")]
    InvalidConfig {
        /// Name of the offending key
        key: String,
        /// Error message
        message: String,
    },

    /// HTTP transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response status did not match what the scenario required
    #[error("{method} {url} returned {actual}, expected {expected}: {body}")]
    UnexpectedStatus {
        /// HTTP method
        method: String,
        /// Request URL
        url: String,
        /// Expected status (or class, e.g. "2xx")
        expected: String,
        /// Actual status code
        actual: u16,
        /// Response body text
        body: String,
    },

    /// Schema document failed to compile
    #[error("Schema '{schema}' failed to compile: {message}")]
    SchemaCompile {
        /// Schema name
        schema: String,
        /// Error message
        message: String,
    },

    /// Response body does not conform to its schema
    #[error(
        "Response does not match schema '{schema}': {} violation(s): {}",
        violations.len(),
        join_violations(violations)
    )]
    SchemaMismatch {
        /// Schema name
        schema: String,
        /// Structured violations
        violations: Vec<SchemaViolation>,
    },

    /// Hard assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// One or more soft assertions failed
    #[error("{0}")]
    SoftAssertions(#[from] crate::assertion::SoftAssertionError),

    /// Fixture error (resolution failed)
    #[error("Fixture error: {message}")]
    FixtureError {
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunchError {
        /// Error message
        message: String,
    },

    /// Page error
    #[error("Page error: {message}")]
    PageError {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    NavigationError {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// No element matched a selector
    #[error("No element matches {selector}")]
    ElementNotFound {
        /// Selector description
        selector: String,
    },

    /// Operation timed out
    #[error("Operation timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Accessibility engine error
    #[error("Accessibility scan failed: {message}")]
    AccessibilityError {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProbeError {
    /// Create a hard assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Create a fixture error
    #[must_use]
    pub fn fixture(message: impl Into<String>) -> Self {
        Self::FixtureError {
            message: message.into(),
        }
    }

    /// Create a page error
    #[must_use]
    pub fn page(message: impl Into<String>) -> Self {
        Self::PageError {
            message: message.into(),
        }
    }
}

fn join_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
