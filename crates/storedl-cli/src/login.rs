//! Terminal login surface.
//!
//! The provider's sign-in page hands out a session token; the user pastes it
//! here. An empty line or end of input counts as closing the login.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tokio::sync::Mutex;

use storedl_core::{AuthErrorCode, LoginOutcome, LoginSurfacePort, SessionToken};

type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;

/// Reads a pasted session token, one line per login.
pub struct TerminalLoginSurface {
    lines: Mutex<Lines<BufReader<BoxedReader>>>,
    login_url: Option<String>,
}

impl TerminalLoginSurface {
    /// Read tokens from standard input.
    pub fn stdin() -> Self {
        Self::from_reader(tokio::io::stdin())
    }

    pub fn from_reader(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        let boxed: BoxedReader = Box::new(reader);
        Self {
            lines: Mutex::new(BufReader::new(boxed).lines()),
            login_url: None,
        }
    }

    /// Page to point the user at when prompting.
    #[must_use]
    pub fn with_login_url(mut self, url: impl Into<String>) -> Self {
        self.login_url = Some(url.into());
        self
    }

    fn prompt(&self) {
        eprintln!("A provider session is required.");
        if let Some(url) = &self.login_url {
            eprintln!("Sign in at {url} and copy the session token.");
        }
        eprintln!("Paste the session token (empty line to cancel):");
    }
}

#[async_trait]
impl LoginSurfacePort for TerminalLoginSurface {
    async fn login(&self) -> LoginOutcome {
        let mut lines = self.lines.lock().await;
        self.prompt();

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::debug!(target: "storedl.auth", "login input closed");
                return LoginOutcome::Cancelled;
            }
            Err(e) => {
                return LoginOutcome::failed(AuthErrorCode::LoginUnavailable, e.to_string());
            }
        };

        let raw = line.trim();
        if raw.is_empty() {
            return LoginOutcome::Cancelled;
        }
        match SessionToken::new(raw) {
            Ok(token) => LoginOutcome::Completed(token),
            Err(e) => LoginOutcome::failed(AuthErrorCode::LoginFailed, e.to_string()),
        }
    }
}
