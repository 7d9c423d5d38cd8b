//! Command-line adapter for storedl.
//!
//! Composition root for the download session manager, plus the terminal
//! login surface, progress rendering and error-code translation.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used only by the binary target
use anyhow as _;
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod login;
pub mod parser;
pub mod presentation;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::{Commands, SessionCommand};
pub use error::CliError;
pub use login::TerminalLoginSurface;
pub use parser::Cli;
