//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use crate::error::ConfigError;
use crate::session::FileTokenStore;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_REDIRECT_DELAY_MS: u64 = 1500;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin without a trailing slash.
    pub base_url: String,
    pub token_file: PathBuf,
    /// Pause before a scheduled redirect.
    pub redirect_delay: Duration,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            token_file: FileTokenStore::default_path(),
            redirect_delay: Duration::from_millis(DEFAULT_REDIRECT_DELAY_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `LINKMARK_BASE_URL`: default `http://localhost:5000`
    /// - `LINKMARK_TOKEN_FILE`: default `<config dir>/linkmark/authToken`
    /// - `LINKMARK_REDIRECT_DELAY_MS`: default 1500
    /// - `LINKMARK_REQUEST_TIMEOUT_SECS`: default 30
    /// - `LINKMARK_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to a value that cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to a value that cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let base_url = match get("LINKMARK_BASE_URL") {
            Some(raw) => normalize_base_url("LINKMARK_BASE_URL", &raw)?,
            None => defaults.base_url,
        };
        let token_file = get("LINKMARK_TOKEN_FILE").map_or(defaults.token_file, PathBuf::from);
        let redirect_delay = parse_u64(&get, "LINKMARK_REDIRECT_DELAY_MS")?
            .map_or(defaults.redirect_delay, Duration::from_millis);
        let request_timeout = parse_u64(&get, "LINKMARK_REQUEST_TIMEOUT_SECS")?
            .map_or(defaults.request_timeout, Duration::from_secs);
        let connect_timeout = parse_u64(&get, "LINKMARK_CONNECT_TIMEOUT_SECS")?
            .map_or(defaults.connect_timeout, Duration::from_secs);

        Ok(Self { base_url, token_file, redirect_delay, request_timeout, connect_timeout })
    }

    /// Replace the backend origin, e.g. from a command-line flag.
    ///
    /// # Errors
    ///
    /// Returns an error if `raw` is not an absolute http(s) URL.
    pub fn with_base_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.base_url = normalize_base_url("--base-url", raw)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_token_file(mut self, path: PathBuf) -> Self {
        self.token_file = path;
        self
    }
}

fn parse_u64<G>(get: &G, var: &'static str) -> Result<Option<u64>, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    get(var)
        .map(|value| value.parse::<u64>().map_err(|_| ConfigError::InvalidNumber { var, value }))
        .transpose()
}

fn normalize_base_url(var: &'static str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    match Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(trimmed.to_owned()),
        _ => Err(ConfigError::InvalidUrl { var, value: raw.to_owned() }),
    }
}
