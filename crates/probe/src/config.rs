//! Run configuration.
//!
//! Configuration is always an explicit value handed to the components that
//! need it. Environment variables are read once, at the edge, through
//! [`ProbeConfig::from_env`] and [`Credentials::from_env`].

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default booking API under test
pub const DEFAULT_API_BASE_URL: &str = "https://restful-booker.herokuapp.com";

/// Default demo page for the UI scenarios
pub const DEFAULT_APP_URL: &str = "https://testautomationpractice.blogspot.com/";

/// Default per-operation timeout (5 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "debug";

/// Default directory for reports and attachments
pub const DEFAULT_OUTPUT_DIR: &str = "target/booker-probe";

/// Environment key for the auth username
pub const ENV_AUTH_USERNAME: &str = "AUTH_USERNAME";

/// Environment key for the auth password
pub const ENV_AUTH_PASSWORD: &str = "AUTH_PASSWORD";

/// Username/password pair for `POST /auth`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Create credentials from literal values
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Read `AUTH_USERNAME` / `AUTH_PASSWORD` from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::MissingConfig`] naming the first absent key.
    pub fn from_env() -> ProbeResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through an arbitrary key lookup.
    ///
    /// Empty values count as absent.
    pub fn from_lookup<F>(lookup: F) -> ProbeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fetch = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ProbeError::MissingConfig {
                    key: key.to_string(),
                })
        };
        Ok(Self {
            username: fetch(ENV_AUTH_USERNAME)?,
            password: fetch(ENV_AUTH_PASSWORD)?,
        })
    }
}

/// Resolved configuration for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Base URL of the booking API
    pub api_base_url: String,
    /// URL of the demo page
    pub app_url: String,
    /// Per-operation timeout in milliseconds
    pub timeout_ms: u64,
    /// Log level used when `RUST_LOG` is unset
    pub log_level: String,
    /// Directory for reports and attachments
    pub output_dir: PathBuf,
    /// Path to the axe-core script injected before accessibility scans
    pub axe_source: Option<PathBuf>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            app_url: DEFAULT_APP_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            axe_source: None,
        }
    }
}

impl ProbeConfig {
    /// Create the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `BOOKER_BASE_URL`, `APP_URL`,
    /// `PROBE_TIMEOUT_MS`, `PROBE_LOG_LEVEL`, `PROBE_OUTPUT_DIR` and
    /// `AXE_SOURCE_PATH`.
    pub fn from_env() -> ProbeResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ProbeConfig::from_env`] through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> ProbeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup("BOOKER_BASE_URL") {
            config.api_base_url = url;
        }
        if let Some(url) = lookup("APP_URL") {
            config.app_url = url;
        }
        if let Some(raw) = lookup("PROBE_TIMEOUT_MS") {
            config.timeout_ms = raw.parse().map_err(|e| ProbeError::InvalidConfig {
                key: "PROBE_TIMEOUT_MS".to_string(),
                message: format!("{e}"),
            })?;
        }
        if let Some(level) = lookup("PROBE_LOG_LEVEL") {
            config.log_level = level;
        }
        if let Some(dir) = lookup("PROBE_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup("AXE_SOURCE_PATH") {
            config.axe_source = Some(PathBuf::from(path));
        }
        Ok(config)
    }

    /// Set the booking API base URL
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set the demo page URL
    #[must_use]
    pub fn with_app_url(mut self, url: impl Into<String>) -> Self {
        self.app_url = url.into();
        self
    }

    /// Set the timeout
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the output directory
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the axe-core script path
    #[must_use]
    pub fn with_axe_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.axe_source = Some(path.into());
        self
    }

    /// Timeout as a [`Duration`]
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
