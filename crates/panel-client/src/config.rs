use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Default backend address
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8888";

/// Competition requests wait for several agents, so the timeout is generous.
const DEFAULT_TIMEOUT_SECS: u64 = 300;

const DEFAULT_POLL_SECS: u64 = 30;

/// Client configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Backend root, without trailing slash
    pub base_url: String,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Certification poll period (None = no background polling)
    pub poll_interval: Option<Duration>,
    /// Sent with every training request
    pub force_retrain: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("PANEL_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_BASE_URL.into()),
            request_timeout: Duration::from_secs(
                env_secs("PANEL_REQUEST_TIMEOUT_SECS").unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            poll_interval: poll_from_env(),
            force_retrain: true,
        }
    }
}

/// `0` disables polling.
fn poll_from_env() -> Option<Duration> {
    match env_secs("PANEL_POLL_INTERVAL_SECS") {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => Some(Duration::from_secs(DEFAULT_POLL_SECS)),
    }
}

fn env_secs(key: &str) -> Option<u64> {
    std::env::var(key).ok()?.trim().parse().ok()
}

/// Host-supplied overrides; absent keys keep the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigOverrides {
    base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    poll_interval_secs: Option<u64>,
    force_retrain: Option<bool>,
}

impl ClientConfig {
    /// Parse a TOML document on top of [`ClientConfig::default`].
    ///
    /// ```toml
    /// base_url = "http://panel.internal:8888"
    /// request_timeout_secs = 120
    /// poll_interval_secs = 0   # disable polling
    /// force_retrain = false
    /// ```
    pub fn from_toml_str(doc: &str) -> Result<Self> {
        let overrides: ConfigOverrides =
            toml::from_str(doc).context("Failed to parse client configuration")?;

        let mut config = Self::default();
        if let Some(url) = overrides.base_url {
            anyhow::ensure!(
                url.starts_with("http://") || url.starts_with("https://"),
                "base_url must be an http(s) URL, got '{}'",
                url
            );
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = overrides.request_timeout_secs {
            anyhow::ensure!(secs > 0, "request_timeout_secs must be positive");
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = overrides.poll_interval_secs {
            config.poll_interval = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(force) = overrides.force_retrain {
            config.force_retrain = force;
        }
        Ok(config)
    }

    /// Absolute URL of a backend path such as `/api/query`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
