//! CLI-specific error types and mappings.
//!
//! Maps failures from the lower crates to exit codes. Job failures keep their
//! error record so the message can be rendered by `presentation::messages`.

use storedl_core::{CredentialError, ErrorRecord, PathError, SessionError};
use storedl_provider::ProviderHttpError;
use thiserror::Error;

use crate::presentation::messages;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// A job or login ended with a failure.
    #[error("{}", messages::describe(.0))]
    Job(ErrorRecord),

    /// Argument parsing error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 0: Success
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Job(_) => 1,
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Io(_) => 74,       // EX_IOERR
            Self::Config(_) => 78,   // EX_CONFIG
        }
    }
}

impl From<ErrorRecord> for CliError {
    fn from(record: ErrorRecord) -> Self {
        Self::Job(record)
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<ProviderHttpError> for CliError {
    fn from(err: ProviderHttpError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<CredentialError> for CliError {
    fn from(err: CredentialError) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<SessionError> for CliError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Credential(e) => e.into(),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
