//! Error types for provider port operations.

use thiserror::Error;

/// Errors from provider port operations.
///
/// Implementation-specific errors (HTTP, JSON) are mapped to these.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider could not be reached.
    #[error("Provider unreachable: {0}")]
    Unreachable(String),

    /// The session token was rejected.
    #[error("Session rejected by provider")]
    Unauthorized,

    /// The account is not entitled to the requested content.
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The response body could not be understood.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The payload stream broke mid-transfer.
    #[error("Stream error: {0}")]
    Stream(String),
}

/// Result type alias for provider port operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProviderError::Http {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert!(err.to_string().contains("502"));
        assert!(ProviderError::AccessDenied("1.25.0".into())
            .to_string()
            .contains("1.25.0"));
    }
}
