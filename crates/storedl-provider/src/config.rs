//! Public configuration for the provider client.
//!
//! The internal config is derived from this.

use std::time::Duration;

/// Default provider endpoint, a locally running store proxy.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8787/api/";

/// Configuration for the provider client.
///
/// # Example
///
/// ```
/// use storedl_provider::ProviderClientConfig;
/// use std::time::Duration;
///
/// let config = ProviderClientConfig::new()
///     .with_base_url("https://store.example.net/api/")
///     .with_timeout(Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct ProviderClientConfig {
    pub(crate) base_url: String,
    pub(crate) user_agent: String,
    /// Per-request timeout. Bounds connecting and manifest bodies; payload
    /// streams fail when no chunk arrives within it.
    pub(crate) timeout: Duration,
    /// Retries for 5xx responses and connection failures
    pub(crate) max_retries: u8,
    /// Base delay for exponential backoff
    pub(crate) retry_base_delay: Duration,
}

impl Default for ProviderClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: concat!("storedl/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_base_delay: Duration::from_millis(500),
        }
    }
}

impl ProviderClientConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the provider API root.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Defaults to 30 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Defaults to 3 retries.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }

    /// Defaults to 500ms.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
