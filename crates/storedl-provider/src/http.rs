//! HTTP backend abstraction for the provider API.
//!
//! The production implementation uses reqwest with automatic retry for
//! transient errors. Tests inject [`testing::FakeBackend`].

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use storedl_core::{PayloadStream, ProviderError};
use url::Url;

use crate::config::ProviderClientConfig;
use crate::error::{ProviderHttpError, ProviderHttpResult};

// ============================================================================
// HTTP Backend Trait
// ============================================================================

/// Trait for HTTP backends that can fetch JSON and byte streams.
///
/// This is an implementation detail - external code uses `ProviderClientPort`.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// Fetch JSON from a URL and deserialize it.
    async fn get_json<T: DeserializeOwned + Send>(
        &self,
        url: &Url,
        bearer: &str,
    ) -> ProviderHttpResult<T>;

    /// Open a streaming download. Status errors are reported before any bytes.
    /// `bearer` is `None` for hosts that must not see the session token.
    async fn get_stream(
        &self,
        url: &Url,
        bearer: Option<&str>,
    ) -> ProviderHttpResult<PayloadStream>;
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Production HTTP backend using reqwest with retry logic.
///
/// Retries 5xx responses and connection failures with exponential backoff.
/// Once a payload stream is open, failures are not retried.
pub struct ReqwestBackend {
    client: reqwest::Client,
    max_retries: u8,
    retry_base_delay_ms: u64,
    /// Whole-request bound for JSON bodies, and the longest a payload
    /// stream may go without delivering a chunk.
    request_timeout: Duration,
}

impl ReqwestBackend {
    pub fn new(config: &ProviderClientConfig) -> ProviderHttpResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
            #[allow(clippy::cast_possible_truncation)]
            retry_base_delay_ms: config.retry_base_delay.as_millis() as u64,
            request_timeout: config.timeout,
        })
    }

    fn build_request(&self, url: &Url, bearer: Option<&str>) -> reqwest::RequestBuilder {
        let request = self.client.get(url.as_str());
        match bearer {
            Some(bearer) => request.header("Authorization", format!("Bearer {bearer}")),
            None => request,
        }
    }

    /// Fetch a URL with automatic retry for transient errors.
    async fn fetch_with_retry(
        &self,
        url: &Url,
        bearer: Option<&str>,
        timeout: Option<Duration>,
    ) -> ProviderHttpResult<reqwest::Response> {
        let mut attempt: u8 = 0;
        loop {
            if attempt > 0 {
                let delay = Duration::from_millis(
                    self.retry_base_delay_ms * 2u64.pow(u32::from(attempt) - 1),
                );
                tracing::debug!(
                    target: "storedl.provider",
                    url = %url,
                    attempt,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "retrying provider request"
                );
                tokio::time::sleep(delay).await;
            }

            let mut request = self.build_request(url, bearer);
            if let Some(timeout) = timeout {
                request = request.timeout(timeout);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    // 5xx errors are retryable (server-side issues)
                    if status.is_server_error() && attempt < self.max_retries {
                        tracing::warn!(
                            target: "storedl.provider",
                            url = %url,
                            status = status.as_u16(),
                            "provider returned server error"
                        );
                        attempt += 1;
                        continue;
                    }

                    // 4xx errors or final attempt - fail immediately
                    return Err(ProviderHttpError::ApiRequestFailed {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }
                Err(e) => {
                    // Connection failures are retryable
                    if (e.is_connect() || e.is_timeout()) && attempt < self.max_retries {
                        tracing::warn!(
                            target: "storedl.provider",
                            url = %url,
                            error = %e,
                            "provider request failed"
                        );
                        attempt += 1;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn get_json<T: DeserializeOwned + Send>(
        &self,
        url: &Url,
        bearer: &str,
    ) -> ProviderHttpResult<T> {
        let response = self
            .fetch_with_retry(url, Some(bearer), Some(self.request_timeout))
            .await?;
        let body = response.bytes().await?;
        let data: T = serde_json::from_slice(&body)?;
        Ok(data)
    }

    async fn get_stream(
        &self,
        url: &Url,
        bearer: Option<&str>,
    ) -> ProviderHttpResult<PayloadStream> {
        let response = self.fetch_with_retry(url, bearer, None).await?;
        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| ProviderError::Stream(e.to_string())));
        Ok(bounded_reads(stream, self.request_timeout))
    }
}

/// End a payload stream with `ProviderError::Stream` when no chunk arrives
/// within `read_timeout`. reqwest only bounds connect and whole requests, so a
/// body that stalls mid-transfer would otherwise never fail.
pub(crate) fn bounded_reads<S>(stream: S, read_timeout: Duration) -> PayloadStream
where
    S: Stream<Item = Result<Bytes, ProviderError>> + Send + 'static,
{
    let stream = Box::pin(stream);
    Box::pin(futures_util::stream::unfold(
        Some(stream),
        move |state| async move {
            let mut stream = state?;
            match tokio::time::timeout(read_timeout, stream.next()).await {
                Ok(Some(chunk)) => Some((chunk, Some(stream))),
                Ok(None) => None,
                Err(_) => {
                    tracing::warn!(
                        target: "storedl.provider",
                        timeout_ms = u64::try_from(read_timeout.as_millis()).unwrap_or(u64::MAX),
                        "payload stream stalled"
                    );
                    let error = ProviderError::Stream(format!(
                        "no data received for {} ms",
                        read_timeout.as_millis()
                    ));
                    Some((Err(error), None))
                }
            }
        },
    ))
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reqwest_backend_creation() {
        let config = ProviderClientConfig::new()
            .with_max_retries(2)
            .with_retry_delay(Duration::from_millis(250))
            .with_timeout(Duration::from_secs(5));
        let backend = ReqwestBackend::new(&config).unwrap();
        assert_eq!(backend.max_retries, 2);
        assert_eq!(backend.retry_base_delay_ms, 250);
        assert_eq!(backend.request_timeout, Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_payload_fails_after_read_timeout() {
        let body = futures_util::stream::iter(vec![Ok(Bytes::from_static(b"abcd"))])
            .chain(futures_util::stream::pending::<Result<Bytes, ProviderError>>());
        let mut stream = bounded_reads(body, Duration::from_secs(1));

        assert_eq!(stream.next().await.unwrap().unwrap(), Bytes::from_static(b"abcd"));
        assert!(matches!(stream.next().await, Some(Err(ProviderError::Stream(_)))));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_steady_payload_passes_through() {
        let chunks = vec![Ok(Bytes::from_static(b"ab")), Ok(Bytes::from_static(b"c"))];
        let stream = bounded_reads(futures_util::stream::iter(chunks), Duration::from_secs(1));
        let collected: Vec<_> = stream.collect().await;
        assert_eq!(collected.len(), 2);
        assert!(collected.iter().all(Result::is_ok));
    }

    mod fake_backend_tests {
        use super::super::testing::*;
        use super::*;
        use serde_json::json;

        #[tokio::test]
        async fn test_fake_backend_returns_canned_json() {
            let backend = FakeBackend::new()
                .with_response("manifest", CannedResponse::Json(json!({"version": "1.0"})));

            let url = Url::parse("https://example.net/versions/1.0/manifest").unwrap();
            let result: serde_json::Value = backend.get_json(&url, "tok").await.unwrap();

            assert_eq!(result["version"], "1.0");
            assert_eq!(backend.calls(), vec![(url.to_string(), Some("tok".to_string()))]);
        }

        #[tokio::test]
        async fn test_fake_backend_returns_404_for_unknown_url() {
            let backend = FakeBackend::new();
            let url = Url::parse("https://example.net/unknown").unwrap();

            let result: ProviderHttpResult<serde_json::Value> = backend.get_json(&url, "t").await;
            assert!(matches!(
                result,
                Err(ProviderHttpError::ApiRequestFailed { status: 404, .. })
            ));
        }

        #[tokio::test]
        async fn test_fake_backend_streams_chunks() {
            let backend = FakeBackend::new().with_response(
                "blobs",
                CannedResponse::Payload(vec![Bytes::from_static(b"ab"), Bytes::from_static(b"c")]),
            );
            let url = Url::parse("https://example.net/blobs/1").unwrap();
            let stream = backend.get_stream(&url, Some("t")).await.unwrap();
            let chunks: Vec<_> = stream.collect().await;
            assert_eq!(chunks.len(), 2);
        }
    }
}
