//! Progress throttling.
//!
//! Rate-limits progress updates so a fast transfer does not flood observers
//! with one update per network chunk.

use std::time::{Duration, Instant};

/// Rate-limiter for progress updates.
///
/// The first update always passes, and so does the one that reaches the
/// total, so observers always see the start and the end of a transfer.
pub struct ProgressThrottle {
    last_emit: Option<Instant>,
    min_interval: Duration,
}

impl ProgressThrottle {
    /// Create a new throttle with the specified minimum interval.
    pub const fn new(min_interval: Duration) -> Self {
        Self {
            last_emit: None,
            min_interval,
        }
    }

    /// Check if enough time has passed to emit another progress update.
    pub fn should_emit(&mut self) -> bool {
        let now = Instant::now();
        match self.last_emit {
            Some(last) if now.duration_since(last) < self.min_interval => false,
            _ => {
                self.last_emit = Some(now);
                true
            }
        }
    }

    /// Like [`Self::should_emit`], but always true once `current` reaches `total`.
    pub fn should_emit_progress(&mut self, current: u64, total: u64) -> bool {
        if current >= total {
            self.last_emit = Some(Instant::now());
            return true;
        }
        self.should_emit()
    }
}
