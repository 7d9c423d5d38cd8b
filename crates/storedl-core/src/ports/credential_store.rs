//! Credential store port.
//!
//! Persists the provider session token across restarts. The stored record is
//! opaque to everything except the implementation; callers only see
//! existence, the token, and I/O failures.

use thiserror::Error;

use crate::domain::SessionToken;

/// Errors from credential store operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialError {
    /// No credential is stored.
    #[error("No stored session")]
    NotFound,

    /// A record exists but cannot be parsed or holds an invalid token.
    #[error("Stored session is corrupt: {0}")]
    Corrupt(String),

    /// Reading or writing the record failed.
    #[error("Session storage I/O error ({kind}): {message}")]
    Io { kind: String, message: String },
}

impl CredentialError {
    #[must_use]
    pub fn from_io_error(err: &std::io::Error) -> Self {
        Self::Io {
            kind: format!("{:?}", err.kind()),
            message: err.to_string(),
        }
    }
}

/// Port for the persisted session token.
///
/// Implementations never perform network calls.
pub trait CredentialStorePort: Send + Sync {
    /// True if a record is present and holds a structurally valid token.
    fn exists(&self) -> bool;

    fn load(&self) -> Result<SessionToken, CredentialError>;

    /// Replace the stored record.
    fn save(&self, token: &SessionToken) -> Result<(), CredentialError>;

    /// Remove the stored record. Succeeds when nothing is stored.
    fn delete(&self) -> Result<(), CredentialError>;
}
