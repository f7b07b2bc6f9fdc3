use std::{env, time::Duration};

use thiserror::Error;
use url::Url;

pub const DEFAULT_ANALYZER_URL: &str = "http://localhost:5001/analyze";
pub const DEFAULT_SCAN_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub analyzer_url: Url,
    pub scan_timeout: Duration,
    pub request_timeout: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid HTTP URL {url:?}: {reason}")]
    InvalidTargetUrl { url: String, reason: String },
    #[error("unsupported URL scheme {0:?}: expected http or https")]
    UnsupportedScheme(String),
    #[error("MCP_SCAN_ANALYZER_URL must be a valid http(s) URL")]
    InvalidAnalyzerUrl,
    #[error("{0} must be a positive number of seconds")]
    InvalidTimeout(&'static str),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analyzer_url: Url::parse(DEFAULT_ANALYZER_URL).expect("default analyzer url"),
            scan_timeout: Duration::from_secs(DEFAULT_SCAN_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. `from_env` is the
    /// production entry point; tests pass a closure over a fixed map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let analyzer_url = read("MCP_SCAN_ANALYZER_URL")
            .map(|value| {
                Url::parse(&value)
                    .ok()
                    .filter(|url| matches!(url.scheme(), "http" | "https"))
                    .ok_or(ConfigError::InvalidAnalyzerUrl)
            })
            .transpose()?;

        let scan_timeout = read("MCP_SCAN_TIMEOUT_SECS")
            .map(|value| parse_secs(&value, "MCP_SCAN_TIMEOUT_SECS"))
            .transpose()?
            .unwrap_or(DEFAULT_SCAN_TIMEOUT_SECS);

        let request_timeout = read("MCP_SCAN_REQUEST_TIMEOUT_SECS")
            .map(|value| parse_secs(&value, "MCP_SCAN_REQUEST_TIMEOUT_SECS"))
            .transpose()?
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let defaults = Self::default();
        Ok(Self {
            analyzer_url: analyzer_url.unwrap_or(defaults.analyzer_url),
            scan_timeout: Duration::from_secs(scan_timeout),
            request_timeout: Duration::from_secs(request_timeout),
        })
    }
}

fn parse_secs(value: &str, key: &'static str) -> Result<u64, ConfigError> {
    value
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .ok_or(ConfigError::InvalidTimeout(key))
}

/// Validates the MCP endpoint the scan will talk to. Runs before any network
/// activity so a malformed target never produces traffic.
pub fn parse_target_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidTargetUrl {
        url: raw.to_string(),
        reason,
    };

    if raw.trim().is_empty() {
        return Err(invalid("URL is empty".to_string()));
    }
    if raw.chars().any(char::is_whitespace) {
        return Err(invalid("URL contains whitespace".to_string()));
    }

    let url = Url::parse(raw).map_err(|err| invalid(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}
