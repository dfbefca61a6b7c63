//! Configuration management for the storefront client.
//!
//! Loads configuration from environment variables with sensible defaults.

use shayna_api::ApiClient;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading or checking configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue {
        /// Variable name
        var: &'static str,
        /// Raw value
        value: String,
    },

    /// A URL does not use http or https
    #[error("{var} must be an http(s) URL, got {value:?}")]
    InvalidUrl {
        /// Variable name
        var: &'static str,
        /// Raw value
        value: String,
    },

    /// The HTTP client could not be built
    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

/// Storefront configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    /// Base URL of the REST API (`SHAYNA_API_URL`)
    pub api_url: String,
    /// Base URL for product media (`SHAYNA_MEDIA_URL`)
    pub media_url: String,
    /// Directory holding the persisted slots (`SHAYNA_STATE_DIR`)
    pub state_dir: PathBuf,
    /// Optional per-request timeout (`SHAYNA_HTTP_TIMEOUT_SECS`)
    pub http_timeout: Option<Duration>,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000/api".to_string(),
            media_url: "http://localhost:8000/storage".to_string(),
            state_dir: PathBuf::from(".shayna"),
            http_timeout: None,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a variable cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration from an arbitrary variable source
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a variable cannot be parsed
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let http_timeout = match lookup("SHAYNA_HTTP_TIMEOUT_SECS") {
            None => None,
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                    var: "SHAYNA_HTTP_TIMEOUT_SECS",
                    value: raw.clone(),
                })?;
                Some(Duration::from_secs(secs))
            },
        };

        Ok(Self {
            api_url: lookup("SHAYNA_API_URL").unwrap_or(defaults.api_url),
            media_url: lookup("SHAYNA_MEDIA_URL").unwrap_or(defaults.media_url),
            state_dir: lookup("SHAYNA_STATE_DIR").map_or(defaults.state_dir, PathBuf::from),
            http_timeout,
        })
    }

    /// Check that the configuration is usable
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for non-http URLs or a zero timeout
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (var, value) in [
            ("SHAYNA_API_URL", &self.api_url),
            ("SHAYNA_MEDIA_URL", &self.media_url),
        ] {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl {
                    var,
                    value: value.clone(),
                });
            }
        }

        if self.http_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::InvalidValue {
                var: "SHAYNA_HTTP_TIMEOUT_SECS",
                value: "0".to_string(),
            });
        }

        Ok(())
    }

    /// Full URL of a stored media path such as a product thumbnail
    #[must_use]
    pub fn media(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.media_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Build an API client honoring the configured timeout
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Client` if the HTTP client cannot be built
    pub fn api_client(&self) -> Result<ApiClient, ConfigError> {
        match self.http_timeout {
            Some(timeout) => ApiClient::with_timeout(&self.api_url, timeout)
                .map_err(|e| ConfigError::Client(e.to_string())),
            None => Ok(ApiClient::new(&self.api_url)),
        }
    }
}
