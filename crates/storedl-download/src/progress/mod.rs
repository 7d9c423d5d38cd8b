//! Progress tracking and throttling.
//!
//! This module handles rate-limiting of byte-level progress for transfers.

mod throttle;

pub use throttle::ProgressThrottle;
