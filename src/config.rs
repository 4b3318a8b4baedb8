//! config
//!
//! Client configuration.
//!
//! # Validation
//!
//! Config values are validated after parsing so that invalid settings
//! fail at load time, not on the first request.
//!
//! # Example
//!
//! ```toml
//! url = "https://store.example.org"
//! user_agent = "strata-client"
//! timeout_secs = 30
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default User-Agent header value.
pub const DEFAULT_USER_AGENT: &str = "strata-client";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A setting has a value outside its accepted range or format.
    #[error("invalid configuration value: {0}")]
    InvalidValue(String),

    /// The TOML document could not be parsed.
    #[error("configuration could not be parsed: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Client configuration for talking to a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Base URL of the service, e.g. `https://store.example.org`.
    pub url: Option<String>,

    /// User-Agent header sent with every request.
    pub user_agent: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Parse and validate a TOML configuration document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML and
    /// `ConfigError::InvalidValue` for settings that fail validation.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.user_agent.is_empty() {
            return Err(ConfigError::InvalidValue(
                "user_agent cannot be empty".into(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "timeout_secs must be greater than zero".into(),
            ));
        }
        if let Some(url) = &self.url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidValue(format!(
                    "url must be http(s), got '{url}'"
                )));
            }
        }
        Ok(())
    }
}
