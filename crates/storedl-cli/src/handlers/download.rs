//! Download and verify handler.
//!
//! Starts a job, renders its progress and reports the outcome. Ctrl-C stops
//! the job; the outcome still arrives through the update stream.

use std::sync::Arc;

use futures_util::StreamExt;
use storedl_core::{
    BuildVersion, DownloadMode, ErrorCode, ErrorRecord, JobOutcome, JobUpdate, SessionManagerPort,
};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{JobProgressPrinter, remediation_hint, success_message};

/// Execute a download or verify command.
pub async fn execute(ctx: &CliContext, version: &str, mode: DownloadMode) -> Result<(), CliError> {
    let version = BuildVersion::parse(version).map_err(|e| CliError::Arguments(e.to_string()))?;

    let mut updates = Arc::clone(&ctx.manager).start(version, mode)?;
    let mut printer = JobProgressPrinter::new(mode);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut stopping = false;

    let outcome = loop {
        tokio::select! {
            update = updates.next() => match update {
                Some(JobUpdate::Progress(event)) => printer.update(&event),
                Some(JobUpdate::Finished(outcome)) => break outcome,
                None => break JobOutcome::from_error(ErrorRecord::new(ErrorCode::parse("JOB_LOST"))),
            },
            _ = &mut ctrl_c, if !stopping => {
                stopping = true;
                eprintln!("Stopping...");
                ctx.manager.stop().await?;
            }
        }
    };
    printer.finish();

    report(outcome)
}

fn report(outcome: JobOutcome) -> Result<(), CliError> {
    match outcome {
        JobOutcome::Succeeded { version, mode } => {
            println!("{}", success_message(&version, mode));
            Ok(())
        }
        JobOutcome::Cancelled { reason } => {
            tracing::debug!(?reason, "job cancelled");
            eprintln!("Cancelled.");
            Ok(())
        }
        JobOutcome::Failed { error } => {
            if let Some(action) = error.remediation() {
                eprintln!("{}", remediation_hint(action));
            }
            Err(CliError::Job(error))
        }
    }
}
