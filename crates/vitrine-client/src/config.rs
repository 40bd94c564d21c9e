//! Client configuration resolved from the environment.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

/// Backend origin used when no override is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:3000";
/// Request timeout used when no override is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Environment variable overriding the backend origin.
pub const ENV_API_URL: &str = "VITRINE_API_URL";
/// Environment variable overriding the request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "VITRINE_HTTP_TIMEOUT_SECS";
/// Environment variable overriding the persisted state directory.
pub const ENV_STATE_DIR: &str = "VITRINE_STATE_DIR";

const STATE_DIR_NAME: &str = "vitrine";

/// Settings shared by the HTTP client and the persisted stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin every request path is appended to.
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Explicit directory for persisted state; platform default when `None`.
    pub state_dir: Option<PathBuf>,
}

impl ClientConfig {
    /// Configuration pointing at `base_url` with default timeout and state dir.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            state_dir: None,
        }
    }

    /// Configuration for `base_url` with the default timeout and state directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `base_url` is not an http(s) URL.
    pub fn for_base_url(base_url: &str) -> Result<Self, ConfigError> {
        parse_api_url(base_url).map(Self::new)
    }

    /// Resolve configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is set to an unusable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = parse_api_url(
            lookup(ENV_API_URL)
                .filter(|value| !value.trim().is_empty())
                .as_deref()
                .unwrap_or(DEFAULT_API_URL),
        )?;
        let timeout = match lookup(ENV_TIMEOUT_SECS).filter(|value| !value.trim().is_empty()) {
            Some(raw) => parse_timeout(&raw)?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };
        let state_dir = lookup(ENV_STATE_DIR)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        Ok(Self {
            base_url,
            timeout,
            state_dir,
        })
    }

    /// Base URL rendered without a trailing slash, ready for path concatenation.
    #[must_use]
    pub fn base_url_str(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Directory holding persisted state: the explicit override, otherwise
    /// `<platform config dir>/vitrine`.
    #[must_use]
    pub fn resolved_state_dir(&self) -> Option<PathBuf> {
        self.state_dir
            .clone()
            .or_else(|| dirs::config_dir().map(|dir| dir.join(STATE_DIR_NAME)))
    }
}

/// Parse and check an API base URL.
///
/// # Errors
///
/// Returns [`ConfigError`] for malformed or non-http(s) URLs.
pub fn parse_api_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim()).map_err(|source| ConfigError::InvalidUrl {
        value: value.to_string(),
        source,
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::UnsupportedScheme {
            value: value.to_string(),
        });
    }
    Ok(url)
}

/// Parse a timeout expressed in whole seconds.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidTimeout`] for non-numeric or zero values.
pub fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout {
            value: value.to_string(),
        }),
    }
}
