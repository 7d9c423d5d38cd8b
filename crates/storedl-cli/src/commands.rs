//! Main commands enum and subcommands.

use clap::Subcommand;

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Download a version into the install directory
    Download {
        /// Version to download (e.g. "1.29.1")
        version: String,
    },

    /// Check an installed version and repair files that do not match
    Verify {
        /// Version to verify
        version: String,
    },

    /// Manage the stored provider session
    Session {
        #[command(subcommand)]
        command: SessionCommand,
    },

    /// Show resolved paths for all storedl directories
    Paths,
}

/// Session subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum SessionCommand {
    /// Show whether a session is stored
    Status,
    /// Forget the stored session
    Delete,
    /// Log in now and store the session
    Login,
}
