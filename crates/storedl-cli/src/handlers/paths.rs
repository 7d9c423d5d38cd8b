//! Paths command handler.
//!
//! Displays all resolved paths for diagnostics and debugging.

use storedl_core::ResolvedPaths;

use crate::error::CliError;

/// Execute the paths command.
///
/// Prints every path storedl uses in `key = value` format. Runs without
/// bootstrapping so it works even when the provider URL is invalid.
pub fn execute(install_dir: Option<&str>) -> Result<(), CliError> {
    let paths = ResolvedPaths::resolve_with_install_root(install_dir)?;
    println!("{paths}");
    Ok(())
}
