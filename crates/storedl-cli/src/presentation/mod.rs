//! Shared CLI presentation utilities.
//!
//! # Guidelines
//!
//! - Keep this module format-only: no domain transforms
//! - Error codes are translated in `messages` and nowhere else

pub mod messages;
pub mod progress;

pub use messages::{describe, remediation_hint, success_message};
pub use progress::JobProgressPrinter;
