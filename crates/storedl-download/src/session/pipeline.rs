//! Job pipeline: auth, manifest, transfer.
//!
//! Runs on its own task under a supervisor. The pipeline writes only to the
//! status channel; the supervisor hands the outcome to the stream through the
//! report sender. The slot is released before that report is sent, including
//! when the pipeline task panics.

use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use storedl_core::{
    ErrorRecord, JobId, JobOutcome, JobState, ManifestRequest, ProgressSnapshot, SessionStatus,
    SessionToken,
};

use super::SessionManager;
use super::updates::{JobReport, lost_outcome};
use crate::transfer::TransferRequest;

impl SessionManager {
    /// Await the pipeline task and deliver its report. A task that dies
    /// without one still releases the slot.
    pub(super) async fn supervise(
        self: Arc<Self>,
        job: JobId,
        worker: JoinHandle<JobReport>,
        report: oneshot::Sender<JobReport>,
    ) {
        let finished = match worker.await {
            Ok(finished) => finished,
            Err(e) => {
                tracing::error!(
                    target: "storedl.session",
                    %job,
                    panicked = e.is_panic(),
                    "job task ended abnormally"
                );
                let outcome = lost_outcome(job);
                let progress = self.finish(job, &outcome);
                JobReport { outcome, progress }
            }
        };
        if report.send(finished).is_err() {
            tracing::debug!(target: "storedl.session", "update stream dropped before the outcome");
        }
    }

    pub(super) async fn run_job(
        self: Arc<Self>,
        job: JobId,
        request: ManifestRequest,
        cancel: CancellationToken,
    ) -> JobReport {
        let span = tracing::info_span!(
            target: "storedl.session",
            "job",
            %job,
            version = %request.version,
            mode = request.mode.as_str()
        );

        let outcome = async {
            let outcome = match self.execute(job, &request, &cancel).await {
                Ok(()) => JobOutcome::Succeeded {
                    version: request.version.clone(),
                    mode: request.mode,
                },
                Err(e) => JobOutcome::from_error(e),
            };
            match &outcome {
                JobOutcome::Succeeded { .. } => {
                    tracing::info!(target: "storedl.session", "job succeeded");
                }
                JobOutcome::Cancelled { reason } => {
                    tracing::info!(target: "storedl.session", ?reason, "job cancelled");
                }
                JobOutcome::Failed { error } => {
                    tracing::warn!(
                        target: "storedl.session",
                        code = error.code.as_str(),
                        error = %error,
                        "job failed"
                    );
                }
            }
            outcome
        }
        .instrument(span)
        .await;

        let progress = self.finish(job, &outcome);
        JobReport { outcome, progress }
    }

    /// Acquire a token and run the job, re-logging in once if the provider
    /// rejects a stored session.
    async fn execute(
        &self,
        job: JobId,
        request: &ManifestRequest,
        cancel: &CancellationToken,
    ) -> Result<(), ErrorRecord> {
        let mut acquired = self.auth.acquire(cancel).await?;
        let mut relogins: u8 = 0;

        loop {
            match self.attempt(job, request, &acquired.token, cancel).await {
                Err(e)
                    if e.is_session_expired()
                        && acquired.reused
                        && relogins < self.config.max_relogin_attempts =>
                {
                    relogins += 1;
                    self.set_state(job, JobState::AwaitingAuth);
                    acquired = self.auth.relogin(cancel).await?;
                }
                other => return other,
            }
        }
    }

    async fn attempt(
        &self,
        job: JobId,
        request: &ManifestRequest,
        token: &SessionToken,
        cancel: &CancellationToken,
    ) -> Result<(), ErrorRecord> {
        self.set_state(job, JobState::Resolving);
        let manifest = self.resolver.resolve(token, request, cancel).await?;

        let on_progress = |snapshot: ProgressSnapshot| self.publish_progress(job, snapshot);
        self.engine
            .run(
                TransferRequest {
                    token,
                    manifest: &manifest,
                    mode: request.mode,
                    cancel,
                },
                &on_progress,
            )
            .await?;
        Ok(())
    }

    fn set_state(&self, job: JobId, state: JobState) {
        self.status_tx.send_if_modified(|status| {
            if status.job != Some(job) || status.state == state {
                return false;
            }
            tracing::debug!(target: "storedl.session", from = %status.state, to = %state, "job state");
            status.state = state;
            true
        });
    }

    fn publish_progress(&self, job: JobId, snapshot: ProgressSnapshot) {
        self.status_tx.send_if_modified(|status| {
            if status.job != Some(job) {
                return false;
            }
            status.state = JobState::Transferring;
            status.progress = snapshot;
            true
        });
    }

    /// Release the slot and return the manager to idle. Returns the last
    /// progress the job published while transferring.
    fn finish(&self, job: JobId, outcome: &JobOutcome) -> Option<ProgressSnapshot> {
        let mut slot = self.lock_slot();
        if slot.as_ref().is_some_and(|active| active.job == job) {
            *slot = None;
        }

        let terminal = match outcome {
            JobOutcome::Succeeded { .. } => JobState::Succeeded,
            JobOutcome::Cancelled { .. } => JobState::Cancelled,
            JobOutcome::Failed { .. } => JobState::Failed,
        };

        let mut last = None;
        let ours = self.status_tx.send_if_modified(|status| {
            if status.job != Some(job) {
                return false;
            }
            if status.state == JobState::Transferring {
                last = Some(status.progress);
            }
            status.state = terminal;
            true
        });
        if ours {
            self.status_tx.send_replace(SessionStatus::idle());
        }
        drop(slot);
        last
    }
}
