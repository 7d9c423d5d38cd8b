//! Per-job update stream.
//!
//! Progress is read from the manager's status channel, filtered to the
//! stream's own job. The terminal outcome arrives on a oneshot so it cannot be
//! coalesced away.

use tokio::sync::{oneshot, watch};

use storedl_core::{
    BuildVersion, ErrorCode, ErrorRecord, JobId, JobOutcome, JobState, JobUpdate, JobUpdateStream,
    ProgressEvent, ProgressSnapshot, SessionStatus,
};

/// What the pipeline hands to the stream when a job ends.
#[derive(Debug)]
pub(super) struct JobReport {
    pub outcome: JobOutcome,
    /// Last progress published while transferring, if the job got that far.
    pub progress: Option<ProgressSnapshot>,
}

enum Step {
    Progress(ProgressSnapshot),
    Finished(JobReport),
    Idle,
}

/// Build the stream handed out by `start`.
pub(super) fn job_updates(
    job: JobId,
    version: BuildVersion,
    mut status: watch::Receiver<SessionStatus>,
    mut report: oneshot::Receiver<JobReport>,
) -> JobUpdateStream {
    Box::pin(async_stream::stream! {
        let mut last: Option<u64> = None;
        let mut watching = true;

        loop {
            let step = tokio::select! {
                biased;

                finished = &mut report => Step::Finished(finished.unwrap_or_else(|_| lost_job(job))),

                changed = status.changed(), if watching => {
                    if changed.is_err() {
                        watching = false;
                        Step::Idle
                    } else {
                        let current = status.borrow_and_update();
                        if current.job == Some(job) && current.state == JobState::Transferring {
                            Step::Progress(current.progress)
                        } else {
                            Step::Idle
                        }
                    }
                }
            };

            match step {
                Step::Progress(snapshot) => {
                    if advances(last, snapshot) {
                        last = Some(snapshot.current);
                        yield JobUpdate::Progress(ProgressEvent::new(
                            snapshot.current,
                            snapshot.total,
                            version.clone(),
                        ));
                    }
                }
                Step::Finished(finished) => {
                    if let Some(snapshot) = finished.progress {
                        if advances(last, snapshot) {
                            yield JobUpdate::Progress(ProgressEvent::new(
                                snapshot.current,
                                snapshot.total,
                                version.clone(),
                            ));
                        }
                    }
                    yield JobUpdate::Finished(finished.outcome);
                    break;
                }
                Step::Idle => {}
            }
        }
    })
}

/// Progress only moves forward on a stream, including across a re-login.
fn advances(last: Option<u64>, snapshot: ProgressSnapshot) -> bool {
    last.is_none_or(|last| snapshot.current > last)
}

fn lost_job(job: JobId) -> JobReport {
    tracing::error!(target: "storedl.session", %job, "job ended without reporting an outcome");
    JobReport {
        outcome: lost_outcome(job),
        progress: None,
    }
}

/// Outcome of a job whose task died before producing one.
pub(super) fn lost_outcome(job: JobId) -> JobOutcome {
    JobOutcome::Failed {
        error: ErrorRecord::with_detail(
            ErrorCode::Unknown("JOB_LOST".to_string()),
            format!("{job} ended without an outcome"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use storedl_core::{CancelReason, DownloadMode};

    fn version() -> BuildVersion {
        BuildVersion::parse("1.29.1").unwrap()
    }

    fn transferring(job: JobId, current: u64, total: u64) -> SessionStatus {
        SessionStatus {
            state: JobState::Transferring,
            progress: ProgressSnapshot::new(current, total),
            ..SessionStatus::started(job, version(), DownloadMode::Download)
        }
    }

    #[tokio::test]
    async fn final_progress_is_not_lost_to_coalescing() {
        let job = JobId::new(1);
        let (tx, rx) = watch::channel(SessionStatus::started(job, version(), DownloadMode::Download));
        let (report_tx, report_rx) = oneshot::channel();
        let mut updates = job_updates(job, version(), rx, report_rx);

        tx.send_replace(transferring(job, 0, 10));
        let first = updates.next().await.unwrap();
        assert_eq!(
            first,
            JobUpdate::Progress(ProgressEvent::new(0, 10, version()))
        );

        tx.send_replace(SessionStatus::idle());
        report_tx
            .send(JobReport {
                outcome: JobOutcome::Succeeded {
                    version: version(),
                    mode: DownloadMode::Download,
                },
                progress: Some(ProgressSnapshot::new(10, 10)),
            })
            .unwrap();

        let rest: Vec<_> = updates.collect().await;
        assert_eq!(
            rest,
            vec![
                JobUpdate::Progress(ProgressEvent::new(10, 10, version())),
                JobUpdate::Finished(JobOutcome::Succeeded {
                    version: version(),
                    mode: DownloadMode::Download,
                }),
            ]
        );
    }

    #[tokio::test]
    async fn other_jobs_and_regressions_are_filtered() {
        let job = JobId::new(2);
        let (tx, rx) = watch::channel(SessionStatus::idle());
        let (report_tx, report_rx) = oneshot::channel();
        let mut updates = job_updates(job, version(), rx, report_rx);

        tx.send_replace(transferring(job, 5, 10));
        assert!(matches!(
            updates.next().await,
            Some(JobUpdate::Progress(ProgressEvent { current: 5, .. }))
        ));

        // A restart after re-login begins again at zero.
        tx.send_replace(transferring(job, 0, 10));
        tx.send_replace(transferring(JobId::new(9), 9, 10));
        report_tx
            .send(JobReport {
                outcome: JobOutcome::Cancelled {
                    reason: CancelReason::DownloadStopped,
                },
                progress: Some(ProgressSnapshot::new(3, 10)),
            })
            .unwrap();

        let rest: Vec<_> = updates.collect().await;
        assert_eq!(
            rest,
            vec![JobUpdate::Finished(JobOutcome::Cancelled {
                reason: CancelReason::DownloadStopped
            })]
        );
    }

    #[tokio::test]
    async fn dropped_reporter_still_finishes_stream() {
        let job = JobId::new(3);
        let (_tx, rx) = watch::channel(SessionStatus::idle());
        let (report_tx, report_rx) = oneshot::channel::<JobReport>();
        drop(report_tx);

        let updates: Vec<_> = job_updates(job, version(), rx, report_rx).collect().await;
        assert_eq!(updates.len(), 1);
        match &updates[0] {
            JobUpdate::Finished(JobOutcome::Failed { error }) => {
                assert_eq!(error.code.display_code(), "UNKNOWN_ERROR");
            }
            other => panic!("unexpected update {other:?}"),
        }
    }
}
