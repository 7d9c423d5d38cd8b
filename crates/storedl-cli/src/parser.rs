//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for downloading and verifying application builds.
///
/// This is the top-level parser that handles global options and dispatches
/// to subcommands.
#[derive(Parser)]
#[command(name = "storedl")]
#[command(about = "Download and verify application builds from the content provider")]
#[command(version)]
pub struct Cli {
    /// Override the install directory for this invocation
    #[arg(long = "install-dir", global = true, env = "STOREDL_INSTALL_DIR")]
    pub install_dir: Option<String>,

    /// Provider API root (e.g. "https://store.example.net/api/")
    #[arg(long = "provider-url", global = true, env = "STOREDL_PROVIDER_URL")]
    pub provider_url: Option<String>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
