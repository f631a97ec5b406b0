//! Read API configuration.

use std::time::Duration;

use tondns_ops::Network;

/// Attempts made while the server keeps answering 429.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Fixed pause after a 429, in milliseconds.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 1000;

/// Per-request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration of a [`crate::ToncenterClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// toncenter v3 base URL, ending with `/`.
    pub base_url: String,

    /// Sent as `X-API-Key` when present.
    pub api_key: Option<String>,

    /// Maximum number of attempts while rate limited.
    pub max_retries: u32,

    /// Pause between rate-limited attempts.
    pub retry_backoff: Duration,

    /// Timeout for each HTTP request.
    pub timeout: Duration,
}

impl ApiConfig {
    /// Configuration for the given network's public endpoint.
    pub fn for_network(network: Network) -> Self {
        Self {
            base_url: network.api_base_url().to_string(),
            api_key: None,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Use a custom base URL. A trailing `/` is added if missing.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        self.base_url = base_url;
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::for_network(Network::Mainnet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, "https://toncenter.com/api/v3/");
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.retry_backoff, Duration::from_millis(1000));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_builders() {
        let config = ApiConfig::for_network(Network::Testnet)
            .with_api_key("secret")
            .with_max_retries(2)
            .with_retry_backoff(Duration::ZERO)
            .with_timeout(Duration::from_secs(3));

        assert_eq!(config.base_url, "https://testnet.toncenter.com/api/v3/");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.retry_backoff, Duration::ZERO);
        assert_eq!(config.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let config = ApiConfig::default().with_base_url("http://localhost:8081/api/v3");
        assert_eq!(config.base_url, "http://localhost:8081/api/v3/");
    }
}
