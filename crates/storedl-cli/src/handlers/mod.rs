//! Command handlers.
//!
//! Handlers follow the canonical pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<(), CliError>`
//! - Thin wrappers that:
//!   1. Parse/validate CLI-specific input
//!   2. Call the session manager
//!   3. Format output for the terminal
//!
//! Handlers should NOT touch the install directory or the credential file
//! directly, except through the ports the context exposes.

pub mod download;
pub mod paths;
pub mod session;
