//! Interactive login surface port.

use async_trait::async_trait;

use crate::domain::SessionToken;
use crate::download::AuthErrorCode;

/// Result of one interactive login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The user signed in and the provider issued a token.
    Completed(SessionToken),
    /// The user closed the login surface.
    Cancelled,
    /// The provider or the surface reported an auth error.
    Failed {
        code: AuthErrorCode,
        detail: Option<String>,
    },
}

impl LoginOutcome {
    pub fn failed(code: AuthErrorCode, detail: impl Into<String>) -> Self {
        Self::Failed {
            code,
            detail: Some(detail.into()),
        }
    }
}

/// Port for the external login UI.
///
/// Each call reports exactly one outcome. The call may suspend for as long as
/// the user takes; no timeout is applied by the caller.
#[async_trait]
pub trait LoginSurfacePort: Send + Sync {
    async fn login(&self) -> LoginOutcome;
}
