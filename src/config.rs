//! Webhook configuration.
//!
//! Configuration is via environment variables:
//! - `PROGRESS_WEBHOOK_URL` - Delivery endpoint (notifications are disabled when unset or empty)
//! - `PROGRESS_N8N_WEBHOOK_URL` - Older name for the endpoint, read only when the above is unset or empty
//! - `PROGRESS_WEBHOOK_TIMEOUT_SECS` - Request timeout in seconds (default: 5)

use std::time::Duration;

pub const WEBHOOK_URL_ENV: &str = "PROGRESS_WEBHOOK_URL";
pub const LEGACY_WEBHOOK_URL_ENV: &str = "PROGRESS_N8N_WEBHOOK_URL";
pub const WEBHOOK_TIMEOUT_ENV: &str = "PROGRESS_WEBHOOK_TIMEOUT_SECS";

/// Default timeout for a single webhook delivery.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyConfig {
    /// Where progress events are POSTed. `None` disables delivery.
    pub endpoint: Option<String>,
    pub timeout: Duration,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl NotifyConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var(WEBHOOK_URL_ENV).ok(),
            std::env::var(LEGACY_WEBHOOK_URL_ENV).ok(),
            std::env::var(WEBHOOK_TIMEOUT_ENV).ok(),
        )
    }

    /// Create with an explicit endpoint and the default timeout.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            ..Self::default()
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    fn from_values(
        endpoint: Option<String>,
        legacy_endpoint: Option<String>,
        timeout_secs: Option<String>,
    ) -> Self {
        let non_empty = |url: Option<String>| {
            url.map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty())
        };
        let endpoint = non_empty(endpoint).or_else(|| {
            let legacy = non_empty(legacy_endpoint);
            if legacy.is_some() {
                tracing::debug!(
                    "Using {} for the webhook endpoint, {} is unset",
                    LEGACY_WEBHOOK_URL_ENV,
                    WEBHOOK_URL_ENV
                );
            }
            legacy
        });

        let timeout = match timeout_secs {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    tracing::warn!(
                        "Ignoring invalid {}={:?}, using {}s",
                        WEBHOOK_TIMEOUT_ENV,
                        raw,
                        DEFAULT_TIMEOUT.as_secs()
                    );
                    DEFAULT_TIMEOUT
                }
            },
            None => DEFAULT_TIMEOUT,
        };

        Self { endpoint, timeout }
    }
}
