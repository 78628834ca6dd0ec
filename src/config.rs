#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;

use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_CHECK_PATH, DEFAULT_DOMAIN, DEFAULT_TIMEOUT_SECS,
};

/// Client configuration, read from the environment (and `.env`).
///
/// * `REPORTCARD_URL`: backend base URL
/// * `REPORTCARD_DOMAIN`: public domain used for badge and report links
/// * `REPORTCARD_CHECK_PATH`: path of the grading endpoint
/// * `REPORTCARD_TIMEOUT_SECS`: request timeout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Backend base URL, without a trailing slash.
    base_url:   String,
    /// Public domain for badge links.
    domain:     String,
    /// Grading endpoint path, with a leading slash.
    check_path: String,
    /// Request timeout.
    timeout:    Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url:   DEFAULT_BASE_URL.to_string(),
            domain:     DEFAULT_DOMAIN.to_string(),
            check_path: DEFAULT_CHECK_PATH.to_string(),
            timeout:    Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`. Blank values fall back to
    /// the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let base_url = read("REPORTCARD_URL")
            .map(|url| url.trim_end_matches('/').to_owned())
            .unwrap_or(defaults.base_url);
        let domain = read("REPORTCARD_DOMAIN").unwrap_or(defaults.domain);
        let check_path = read("REPORTCARD_CHECK_PATH")
            .map(|path| format!("/{}", path.trim_start_matches('/')))
            .unwrap_or(defaults.check_path);
        let timeout = read_timeout_secs(read("REPORTCARD_TIMEOUT_SECS"), DEFAULT_TIMEOUT_SECS);

        Self {
            base_url,
            domain,
            check_path,
            timeout,
        }
    }

    /// Returns the backend base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the badge domain.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Returns the request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Full URL of the grading endpoint.
    pub fn check_url(&self) -> String {
        format!("{}{}", self.base_url, self.check_path)
    }

    /// Resolves a redirect target against the base URL. Absolute URLs are
    /// returned unchanged.
    pub fn resolve(&self, target: &str) -> String {
        if target.starts_with("http://") || target.starts_with("https://") {
            target.to_string()
        } else {
            format!("{}/{}", self.base_url, target.trim_start_matches('/'))
        }
    }

    /// Builds the shared HTTP client.
    pub fn http_client(&self) -> Result<Client> {
        Client::builder()
            // Avoid macOS dynamic store lookups that fail in sandboxed environments.
            .no_proxy()
            .timeout(self.timeout)
            .user_agent(concat!("reportcard/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to construct shared HTTP client")
    }
}

/// Parses a value into a `Duration`, falling back to `default_secs` when
/// parsing fails or the value is missing.
fn read_timeout_secs(value: Option<String>, default_secs: u64) -> Duration {
    value
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default_secs))
}
