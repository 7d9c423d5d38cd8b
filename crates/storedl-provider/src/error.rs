//! Internal error types for provider HTTP operations.
//!
//! These errors are mapped to core `ProviderError` at the port boundary.

use thiserror::Error;

/// Result type alias for provider HTTP operations.
pub type ProviderHttpResult<T> = Result<T, ProviderHttpError>;

/// Errors raised by the HTTP layer.
#[derive(Debug, Error)]
pub enum ProviderHttpError {
    /// The provider answered with a non-success status.
    #[error("Provider request failed with status {status}: {url}")]
    ApiRequestFailed { status: u16, url: String },

    /// The response did not describe a usable manifest.
    #[error("Invalid response from provider: {message}")]
    InvalidResponse { message: String },

    /// The configured base URL cannot carry path segments.
    #[error("Base URL cannot be used for API requests: {0}")]
    InvalidBaseUrl(String),

    /// Network or HTTP client error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_request_failed_error_message() {
        let error = ProviderHttpError::ApiRequestFailed {
            status: 403,
            url: "https://store.example.net/api/versions/1.25.0/manifest".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("403"));
        assert!(msg.contains("1.25.0"));
    }

    #[test]
    fn test_invalid_response_error_message() {
        let error = ProviderHttpError::InvalidResponse {
            message: "Missing required field 'files'".to_string(),
        };
        assert!(error.to_string().contains("Missing required field"));
    }
}
