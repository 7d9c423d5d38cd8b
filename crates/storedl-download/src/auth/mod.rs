//! Session acquisition.
//!
//! Produces a token for one job, either silently from the credential store or
//! by driving the interactive login surface. The provider is the only judge of
//! expiry: a reused token that the provider rejects is handled by the session
//! manager through [`AuthFlow::relogin`].

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use storedl_core::{
    AuthErrorCode, CredentialError, CredentialStorePort, ErrorRecord, LoginOutcome,
    LoginSurfacePort, SessionToken,
};

/// A token ready for use.
#[derive(Debug, Clone)]
pub struct AcquiredToken {
    pub token: SessionToken,
    /// True when the token came from the store rather than a fresh login.
    pub reused: bool,
}

/// Obtains session tokens for jobs.
pub struct AuthFlow {
    store: Arc<dyn CredentialStorePort>,
    login: Arc<dyn LoginSurfacePort>,
}

impl AuthFlow {
    pub fn new(store: Arc<dyn CredentialStorePort>, login: Arc<dyn LoginSurfacePort>) -> Self {
        Self { store, login }
    }

    /// Reuse the stored session if there is one, otherwise log in.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<AcquiredToken, ErrorRecord> {
        match self.store.load() {
            Ok(token) => {
                tracing::debug!(target: "storedl.auth", "reusing stored session");
                return Ok(AcquiredToken {
                    token,
                    reused: true,
                });
            }
            Err(CredentialError::NotFound) => {
                tracing::debug!(target: "storedl.auth", "no stored session");
            }
            Err(CredentialError::Corrupt(reason)) => {
                tracing::warn!(
                    target: "storedl.auth",
                    reason = %reason,
                    "stored session is unusable, discarding"
                );
                self.store.delete().map_err(unreadable)?;
            }
            Err(e @ CredentialError::Io { .. }) => return Err(unreadable(e)),
        }

        self.interactive(cancel).await
    }

    /// Discard the stored session and log in again.
    pub async fn relogin(&self, cancel: &CancellationToken) -> Result<AcquiredToken, ErrorRecord> {
        tracing::info!(target: "storedl.auth", "provider rejected stored session, logging in again");
        self.store.delete().map_err(unreadable)?;
        self.interactive(cancel).await
    }

    async fn interactive(&self, cancel: &CancellationToken) -> Result<AcquiredToken, ErrorRecord> {
        tracing::info!(target: "storedl.auth", "waiting for interactive login");

        let outcome = tokio::select! {
            biased;

            () = cancel.cancelled() => {
                tracing::info!(target: "storedl.auth", "login abandoned by stop");
                return Err(ErrorRecord::cancelled());
            }

            outcome = self.login.login() => outcome,
        };

        match outcome {
            LoginOutcome::Completed(token) => {
                self.store.save(&token).map_err(unreadable)?;
                tracing::info!(target: "storedl.auth", "login completed");
                Ok(AcquiredToken {
                    token,
                    reused: false,
                })
            }
            LoginOutcome::Cancelled => {
                tracing::info!(target: "storedl.auth", "login window closed by user");
                Err(ErrorRecord::login_closed())
            }
            LoginOutcome::Failed { code, detail } => {
                tracing::warn!(target: "storedl.auth", code = code.as_str(), "login failed");
                Err(ErrorRecord {
                    code: code.into(),
                    detail,
                })
            }
        }
    }
}

fn unreadable(err: CredentialError) -> ErrorRecord {
    ErrorRecord::with_detail(AuthErrorCode::SessionUnreadable, err.to_string())
}
