//! Time sources for countdowns.

use attrition_core::Time;
use chrono::{Duration, Utc};
use tokio::time::Instant;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current time.
    fn now(&self) -> Time;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Time {
        Utc::now()
    }
}

/// Wall-clock anchor advanced by tokio's monotonic clock.
///
/// Immune to wall-clock jumps while running, and follows tokio's paused
/// clock in tests.
#[derive(Debug, Clone)]
pub struct AnchoredClock {
    anchor: Time,
    started: Instant,
}

impl AnchoredClock {
    /// Anchor at `anchor`, starting now.
    pub fn new(anchor: Time) -> Self {
        Self {
            anchor,
            started: Instant::now(),
        }
    }

    /// Anchor at the current wall-clock time.
    pub fn from_system() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for AnchoredClock {
    fn now(&self) -> Time {
        Duration::from_std(self.started.elapsed())
            .ok()
            .and_then(|elapsed| self.anchor.checked_add_signed(elapsed))
            .unwrap_or(self.anchor)
    }
}
