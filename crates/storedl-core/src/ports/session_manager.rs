//! Session manager port definition.
//!
//! This port defines the public interface of the download subsystem. It hides
//! cancellation tokens, the HTTP client and the credential file behind a small
//! API consumed by presentation adapters.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use super::credential_store::CredentialError;
use crate::domain::{BuildVersion, DownloadMode};
use crate::download::{ErrorRecord, JobUpdateStream, SessionStatus};

/// Errors from session manager control operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Credential(#[from] CredentialError),
}

/// Configuration for creating a session manager.
#[derive(Debug, Clone)]
pub struct SessionManagerConfig {
    /// Directory holding one subdirectory per installed version.
    pub install_root: PathBuf,
    /// Minimum spacing of progress updates. First and final updates are
    /// always published.
    pub progress_interval: Duration,
    /// Forced re-logins allowed per job when a stored session is rejected.
    pub max_relogin_attempts: u8,
}

impl Default for SessionManagerConfig {
    fn default() -> Self {
        Self {
            install_root: PathBuf::from("."),
            progress_interval: Duration::from_millis(100),
            max_relogin_attempts: 1,
        }
    }
}

impl SessionManagerConfig {
    #[must_use]
    pub fn new(install_root: PathBuf) -> Self {
        Self {
            install_root,
            ..Default::default()
        }
    }

    #[must_use]
    pub const fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    #[must_use]
    pub const fn with_max_relogin_attempts(mut self, attempts: u8) -> Self {
        self.max_relogin_attempts = attempts;
        self
    }
}

/// Port for the download session manager.
///
/// # Usage
///
/// ```ignore
/// let manager: Arc<dyn SessionManagerPort> = /* ... */;
///
/// let mut updates = Arc::clone(&manager).start(version, DownloadMode::Download)?;
/// while let Some(update) = updates.next().await {
///     // render progress, then handle the single `Finished` outcome
/// }
///
/// // From another task, at any time:
/// manager.stop().await?;
/// ```
#[async_trait]
pub trait SessionManagerPort: Send + Sync {
    /// Begin a job for `version`.
    ///
    /// Rejects synchronously with `ALREADY_DOWNLOADING` if a job is active;
    /// the active job is not affected. The `self: Arc<Self>` receiver lets
    /// implementations spawn the job onto the runtime.
    fn start(
        self: Arc<Self>,
        version: BuildVersion,
        mode: DownloadMode,
    ) -> Result<JobUpdateStream, ErrorRecord>;

    /// Cancel the active job and wait until it has returned to idle.
    /// Succeeds immediately when idle.
    async fn stop(&self) -> Result<(), SessionError>;

    /// Whether a usable session is stored.
    fn session_exists(&self) -> bool;

    /// Forget the stored session. Does not stop an active job.
    fn delete_session(&self) -> Result<(), SessionError>;

    /// Current job status.
    fn status(&self) -> SessionStatus;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = SessionManagerConfig::new(PathBuf::from("/games"));
        assert_eq!(config.install_root, PathBuf::from("/games"));
        assert_eq!(config.progress_interval, Duration::from_millis(100));
        assert_eq!(config.max_relogin_attempts, 1);

        let tuned = config
            .with_progress_interval(Duration::ZERO)
            .with_max_relogin_attempts(0);
        assert_eq!(tuned.progress_interval, Duration::ZERO);
        assert_eq!(tuned.max_relogin_attempts, 0);
    }
}
