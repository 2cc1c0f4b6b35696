//! Remaining-time formatting.

use attrition_core::Time;
use chrono::Duration;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Non-negative time left until a task completes.
///
/// Displays largest unit first, e.g. `2h 0m 15s`, `4m 10s`, `59s`. Anything
/// under one second displays as `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RemainingTime(Duration);

impl RemainingTime {
    /// Time left from `now` until `end`, zero once `end` has passed.
    pub fn until(end: Time, now: Time) -> Self {
        Self::from_duration(end - now)
    }

    /// Wrap a duration, clamping negatives to zero.
    pub fn from_duration(duration: Duration) -> Self {
        Self(duration.max(Duration::zero()))
    }

    /// The underlying duration.
    pub fn duration(&self) -> Duration {
        self.0
    }

    /// Whole seconds left, rounded down.
    pub fn whole_seconds(&self) -> i64 {
        self.0.num_seconds()
    }

    /// Less than one second left.
    pub fn is_completed(&self) -> bool {
        self.whole_seconds() < 1
    }
}

impl std::fmt::Display for RemainingTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let total = self.whole_seconds();
        if total < 1 {
            return f.write_str("Completed");
        }

        let hours = total / 3600;
        let minutes = (total % 3600) / 60;
        let seconds = total % 60;

        if hours > 0 {
            write!(f, "{hours}h {minutes}m {seconds}s")
        } else if minutes > 0 {
            write!(f, "{minutes}m {seconds}s")
        } else {
            write!(f, "{seconds}s")
        }
    }
}

impl Serialize for RemainingTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("RemainingTime", 2)?;
        state.serialize_field("seconds", &self.whole_seconds())?;
        state.serialize_field("label", &self.to_string())?;
        state.end()
    }
}
