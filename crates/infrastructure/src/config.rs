//! Query client configuration
//!
//! Read from the environment:
//! - `DASHVAR_QUERY_URL` base URL of the query service
//! - `DASHVAR_QUERY_TIMEOUT_MS` request timeout
//! - `DASHVAR_API_TOKEN` optional bearer token

use serde::{Deserialize, Serialize};
use url::Url;

/// Environment variable holding the base URL.
pub const ENV_QUERY_URL: &str = "DASHVAR_QUERY_URL";
/// Environment variable holding the timeout in milliseconds.
pub const ENV_QUERY_TIMEOUT_MS: &str = "DASHVAR_QUERY_TIMEOUT_MS";
/// Environment variable holding the bearer token.
pub const ENV_API_TOKEN: &str = "DASHVAR_API_TOKEN";

/// Default base URL of the query service.
pub const DEFAULT_QUERY_URL: &str = "http://localhost:8080/";
/// Default request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Path of the variable query endpoint, relative to the base URL.
pub const QUERY_PATH: &str = "api/v2/variables/query";

/// Errors raised while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A URL could not be parsed.
    #[error("invalid URL in {key}: {value} ({reason})")]
    InvalidUrl {
        /// Setting name.
        key: String,
        /// Offending value.
        value: String,
        /// Parser message.
        reason: String,
    },

    /// A number could not be parsed.
    #[error("invalid number in {key}: {value}")]
    InvalidNumber {
        /// Setting name.
        key: String,
        /// Offending value.
        value: String,
    },
}

/// Settings of the HTTP query executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryClientConfig {
    /// Base URL of the query service. Always ends with `/`.
    pub base_url: Url,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Bearer token sent with every query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl QueryClientConfig {
    /// Creates a configuration for the given base URL with default timeout.
    ///
    /// # Errors
    /// Returns an error if the URL cannot be parsed.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(ENV_QUERY_URL, base_url)?,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            token: None,
        })
    }

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    /// Returns an error if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`; unset keys use defaults.
    ///
    /// # Errors
    /// Returns an error if a key is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let url = lookup(ENV_QUERY_URL).unwrap_or_else(|| DEFAULT_QUERY_URL.to_string());
        let base_url = parse_base_url(ENV_QUERY_URL, &url)?;

        let timeout_ms = match lookup(ENV_QUERY_TIMEOUT_MS) {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidNumber {
                    key: ENV_QUERY_TIMEOUT_MS.to_string(),
                    value,
                })?,
            None => DEFAULT_TIMEOUT_MS,
        };

        let token = lookup(ENV_API_TOKEN).filter(|t| !t.trim().is_empty());

        Ok(Self {
            base_url,
            timeout_ms,
            token,
        })
    }

    /// Overrides the timeout.
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Returns the full URL of the variable query endpoint.
    ///
    /// # Errors
    /// Returns an error if the endpoint cannot be joined to the base URL.
    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        self.base_url
            .join(QUERY_PATH)
            .map_err(|e| ConfigError::InvalidUrl {
                key: ENV_QUERY_URL.to_string(),
                value: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }
}

fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(value.trim()).map_err(|e| ConfigError::InvalidUrl {
        key: key.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
