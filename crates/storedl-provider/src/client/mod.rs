//! Provider client.
//!
//! Generic over an HTTP backend so tests can run without a network.

use crate::config::ProviderClientConfig;
use crate::error::ProviderHttpResult;
use crate::http::{HttpBackend, ReqwestBackend};
use crate::models::ProviderConfig;

// ============================================================================
// Type Aliases
// ============================================================================

/// Provider client using the reqwest HTTP backend.
pub type HttpProviderClient = ProviderClient<ReqwestBackend>;

// ============================================================================
// Client
// ============================================================================

/// Client for the content provider API.
///
/// External code should not name the backend parameter; use
/// [`HttpProviderClient::new`] and the `ProviderClientPort` trait.
pub struct ProviderClient<B: HttpBackend> {
    pub(crate) backend: B,
    pub(crate) config: ProviderConfig,
}

impl HttpProviderClient {
    /// Create a client. Fails if the base URL is unusable.
    pub fn new(config: &ProviderClientConfig) -> ProviderHttpResult<Self> {
        let internal_config = Self::to_internal_config(config)?;
        let backend = ReqwestBackend::new(config)?;
        Ok(Self {
            backend,
            config: internal_config,
        })
    }

    fn to_internal_config(config: &ProviderClientConfig) -> ProviderHttpResult<ProviderConfig> {
        #[allow(clippy::cast_possible_truncation)]
        let retry_base_delay_ms = config.retry_base_delay.as_millis() as u64;
        ProviderConfig::new(&config.base_url, config.max_retries, retry_base_delay_ms)
    }
}

impl<B: HttpBackend> ProviderClient<B> {
    /// Create a client with a custom backend.
    #[cfg(test)]
    pub(crate) const fn with_backend(config: ProviderConfig, backend: B) -> Self {
        Self { backend, config }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        self.config.base_url.as_str()
    }
}
