//! CLI entry point - the composition root.
//!
//! This is the ONLY place where infrastructure is wired together via
//! bootstrap. Command dispatch routes to handlers which delegate to the
//! session manager.

use std::process::ExitCode;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use storedl_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers};
use storedl_core::DownloadMode;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    // Dispatch to appropriate handler
    let Some(command) = cli.command else {
        // No command provided - show help
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = CliConfig {
        install_dir: cli.install_dir,
        provider_url: cli.provider_url,
    };

    match command {
        Commands::Paths => {
            handlers::paths::execute(config.install_dir.as_deref())?;
        }
        Commands::Download { version } => {
            // Bootstrap the CLI context (composition root)
            let ctx = bootstrap(config)?;
            handlers::download::execute(&ctx, &version, DownloadMode::Download).await?;
        }
        Commands::Verify { version } => {
            let ctx = bootstrap(config)?;
            handlers::download::execute(&ctx, &version, DownloadMode::Verify).await?;
        }
        Commands::Session { command } => {
            let ctx = bootstrap(config)?;
            handlers::session::execute(&ctx, &command).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            let code = err.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}
