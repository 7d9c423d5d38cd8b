//! Session command handlers.

use storedl_core::{
    CredentialStorePort, ErrorRecord, LoginOutcome, LoginSurfacePort, SessionManagerPort,
};

use crate::bootstrap::CliContext;
use crate::commands::SessionCommand;
use crate::error::CliError;

/// Dispatch a session subcommand.
pub async fn execute(ctx: &CliContext, command: &SessionCommand) -> Result<(), CliError> {
    match command {
        SessionCommand::Status => status(ctx),
        SessionCommand::Delete => delete(ctx),
        SessionCommand::Login => login(ctx).await,
    }
}

fn status(ctx: &CliContext) -> Result<(), CliError> {
    if !ctx.manager.session_exists() {
        println!("No stored session.");
        return Ok(());
    }
    match ctx.credentials.saved_at() {
        Ok(saved_at) => println!(
            "Session stored at {} (saved {saved_at})",
            ctx.credentials.path().display()
        ),
        Err(e) => {
            tracing::debug!(error = %e, "could not read session timestamp");
            println!("Session stored at {}", ctx.credentials.path().display());
        }
    }
    Ok(())
}

fn delete(ctx: &CliContext) -> Result<(), CliError> {
    ctx.manager.delete_session()?;
    println!("Session deleted.");
    Ok(())
}

async fn login(ctx: &CliContext) -> Result<(), CliError> {
    match ctx.login.login().await {
        LoginOutcome::Completed(token) => {
            ctx.credentials.save(&token)?;
            println!("Logged in. Session saved to {}", ctx.credentials.path().display());
            Ok(())
        }
        LoginOutcome::Cancelled => {
            eprintln!("Login cancelled.");
            Ok(())
        }
        LoginOutcome::Failed { code, detail } => Err(CliError::Job(match detail {
            Some(detail) => ErrorRecord::with_detail(code, detail),
            None => ErrorRecord::new(code),
        })),
    }
}
