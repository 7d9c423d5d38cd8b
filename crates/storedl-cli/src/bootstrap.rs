//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter:
//! - Path resolution (via storedl-core)
//! - HTTP provider client (via storedl-provider)
//! - Credential store and session manager (via storedl-download)
//!
//! Command handlers receive the composed `CliContext`.

use std::sync::Arc;

use storedl_core::{ResolvedPaths, SessionManagerConfig};
use storedl_download::{
    FileCredentialStore, SessionManager, SessionManagerDeps, build_session_manager,
};
use storedl_provider::{HttpProviderClient, ProviderClientConfig};

use crate::error::CliError;
use crate::login::TerminalLoginSurface;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Install root override (`--install-dir`).
    pub install_dir: Option<String>,
    /// Provider API root override (`--provider-url`).
    pub provider_url: Option<String>,
}

/// Fully composed context for CLI commands.
pub struct CliContext {
    /// The download session manager.
    pub manager: Arc<SessionManager>,
    /// The store the manager persists sessions into.
    pub credentials: Arc<FileCredentialStore>,
    /// Login surface shared with the manager.
    pub login: Arc<TerminalLoginSurface>,
    pub paths: ResolvedPaths,
}

/// Bootstrap the CLI application.
///
/// Resolves paths, builds the HTTP provider client and assembles the session
/// manager. Nothing touches the network until a command runs.
pub fn bootstrap(config: CliConfig) -> Result<CliContext, CliError> {
    let paths = ResolvedPaths::resolve_with_install_root(config.install_dir.as_deref())?;

    let mut provider_config = ProviderClientConfig::new();
    if let Some(url) = config.provider_url {
        provider_config = provider_config.with_base_url(url);
    }
    let provider = Arc::new(HttpProviderClient::new(&provider_config)?);

    let credentials = Arc::new(FileCredentialStore::new(paths.credential_path.clone()));
    let login =
        Arc::new(TerminalLoginSurface::stdin().with_login_url(provider_config.base_url()));

    let manager = build_session_manager(SessionManagerDeps {
        provider,
        credentials: Arc::clone(&credentials),
        login: Arc::clone(&login),
        config: SessionManagerConfig::new(paths.install_root.clone()),
    });

    tracing::debug!(
        install_root = %paths.install_root.display(),
        provider = provider_config.base_url(),
        "cli bootstrapped"
    );

    Ok(CliContext {
        manager: Arc::new(manager),
        credentials,
        login,
        paths,
    })
}
