//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the session manager expects from
//! infrastructure. They contain no implementation details and use only domain
//! types.
//!
//! # Design Rules
//!
//! - No `reqwest` or filesystem types in any signature
//! - Provider failures use `ProviderError`; mapping to `ErrorRecord` codes
//!   happens in the component that calls the port
//! - The credential store is synchronous; everything touching the network is async

pub mod credential_store;
pub mod login_surface;
pub mod provider;
pub mod session_manager;

pub use credential_store::{CredentialError, CredentialStorePort};
pub use login_surface::{LoginOutcome, LoginSurfacePort};
pub use provider::{PayloadStream, ProviderClientPort, ProviderError, ProviderResult};
pub use session_manager::{SessionError, SessionManagerConfig, SessionManagerPort};
