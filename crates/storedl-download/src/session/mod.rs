//! Download session manager.
//!
//! Concrete implementation of `SessionManagerPort`.
//!
//! # Architecture
//!
//! - **Slot**: `Mutex<Option<ActiveJob>>`, the single point of mutual
//!   exclusion. Never held across an await.
//! - **Status channel**: one `watch` channel of `SessionStatus`, written by the
//!   pipeline and read by update streams, `status()` and `stop()`.
//! - **Pipeline**: one spawned task per job (see `pipeline`).
//!
//! # Ordering
//!
//! The slot is cleared and idle is published before the outcome reaches the
//! caller, so a `start` issued after a `Finished` update always succeeds.

mod pipeline;
mod updates;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::{oneshot, watch};
use tokio_util::sync::CancellationToken;

use storedl_core::{
    BuildVersion, CredentialStorePort, DownloadMode, ErrorRecord, JobId, JobUpdateStream,
    LoginSurfacePort, ManifestRequest, ProviderClientPort, SessionError, SessionManagerConfig,
    SessionManagerPort, SessionStatus,
};

use crate::auth::AuthFlow;
use crate::manifest::ManifestResolver;
use crate::transfer::TransferEngine;

/// The job currently owning the manager.
struct ActiveJob {
    job: JobId,
    version: BuildVersion,
    cancel: CancellationToken,
}

/// Dependencies for building a session manager.
pub struct SessionManagerDeps<P, C, L>
where
    P: ProviderClientPort + 'static,
    C: CredentialStorePort + 'static,
    L: LoginSurfacePort + 'static,
{
    /// Port for manifest and payload access.
    pub provider: Arc<P>,
    /// Port for the persisted session.
    pub credentials: Arc<C>,
    /// Port for the interactive login UI.
    pub login: Arc<L>,
    pub config: SessionManagerConfig,
}

/// Build a session manager from its dependencies.
///
/// Wrap the result in an `Arc` to call `start`; adapters usually hold it as
/// `Arc<dyn SessionManagerPort>`.
pub fn build_session_manager<P, C, L>(deps: SessionManagerDeps<P, C, L>) -> SessionManager
where
    P: ProviderClientPort + 'static,
    C: CredentialStorePort + 'static,
    L: LoginSurfacePort + 'static,
{
    SessionManager::new(deps.provider, deps.credentials, deps.login, deps.config)
}

/// Download session manager. At most one job runs at a time.
pub struct SessionManager {
    credentials: Arc<dyn CredentialStorePort>,
    auth: AuthFlow,
    resolver: ManifestResolver,
    engine: TransferEngine,
    config: SessionManagerConfig,
    slot: Mutex<Option<ActiveJob>>,
    next_job: AtomicU64,
    status_tx: watch::Sender<SessionStatus>,
}

impl SessionManager {
    pub fn new(
        provider: Arc<dyn ProviderClientPort>,
        credentials: Arc<dyn CredentialStorePort>,
        login: Arc<dyn LoginSurfacePort>,
        config: SessionManagerConfig,
    ) -> Self {
        let (status_tx, _) = watch::channel(SessionStatus::idle());
        Self {
            auth: AuthFlow::new(Arc::clone(&credentials), login),
            resolver: ManifestResolver::new(Arc::clone(&provider)),
            engine: TransferEngine::new(
                provider,
                config.install_root.clone(),
                config.progress_interval,
            ),
            credentials,
            config,
            slot: Mutex::new(None),
            next_job: AtomicU64::new(0),
            status_tx,
        }
    }

    /// Receiver of every status change. Terminal states are published briefly
    /// before the manager returns to idle.
    pub fn subscribe_status(&self) -> watch::Receiver<SessionStatus> {
        self.status_tx.subscribe()
    }

    /// Version of the active job, if any.
    pub fn downloading_version(&self) -> Option<BuildVersion> {
        self.status_tx.borrow().active_version().cloned()
    }

    pub const fn config(&self) -> &SessionManagerConfig {
        &self.config
    }

    fn lock_slot(&self) -> MutexGuard<'_, Option<ActiveJob>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl SessionManagerPort for SessionManager {
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    fn start(
        self: Arc<Self>,
        version: BuildVersion,
        mode: DownloadMode,
    ) -> Result<JobUpdateStream, ErrorRecord> {
        let (job, cancel) = {
            let mut slot = self.lock_slot();
            if let Some(active) = slot.as_ref() {
                tracing::warn!(
                    target: "storedl.session",
                    requested = %version,
                    active = %active.version,
                    "rejecting start while a job is active"
                );
                return Err(ErrorRecord::busy(&active.version));
            }

            let job = JobId::new(self.next_job.fetch_add(1, Ordering::Relaxed) + 1);
            let cancel = CancellationToken::new();
            *slot = Some(ActiveJob {
                job,
                version: version.clone(),
                cancel: cancel.clone(),
            });
            self.status_tx
                .send_replace(SessionStatus::started(job, version.clone(), mode));
            (job, cancel)
        };

        tracing::info!(
            target: "storedl.session",
            %job,
            version = %version,
            mode = mode.as_str(),
            "job started"
        );

        let status = self.status_tx.subscribe();
        let (report_tx, report_rx) = oneshot::channel();
        let request = ManifestRequest::new(version.clone(), mode);
        let worker = tokio::spawn(Arc::clone(&self).run_job(job, request, cancel));
        tokio::spawn(Arc::clone(&self).supervise(job, worker, report_tx));

        Ok(updates::job_updates(job, version, status, report_rx))
    }

    async fn stop(&self) -> Result<(), SessionError> {
        let active = self.lock_slot().as_ref().map(|active| {
            active.cancel.cancel();
            active.job
        });
        let Some(job) = active else {
            tracing::debug!(target: "storedl.session", "stop requested while idle");
            return Ok(());
        };

        tracing::info!(target: "storedl.session", %job, "stopping job");
        let mut status = self.status_tx.subscribe();
        if status.wait_for(|s| s.job != Some(job)).await.is_err() {
            tracing::warn!(target: "storedl.session", %job, "status channel closed during stop");
        }
        Ok(())
    }

    fn session_exists(&self) -> bool {
        self.credentials.exists()
    }

    fn delete_session(&self) -> Result<(), SessionError> {
        self.credentials.delete()?;
        tracing::info!(target: "storedl.session", "stored session deleted");
        Ok(())
    }

    fn status(&self) -> SessionStatus {
        self.status_tx.borrow().clone()
    }
}
