//! Construction Progress
//!
//! Completion percentage, remaining-time countdowns and the display model
//! for the active construction task.

#![warn(missing_docs)]

pub mod estimator;
pub mod remaining;
pub mod clock;
pub mod countdown;
pub mod tracker;

pub use estimator::{Estimate, ProgressEstimator};
pub use remaining::RemainingTime;
pub use clock::{AnchoredClock, Clock, SystemClock};
pub use countdown::{Countdown, CountdownConfig};
pub use tracker::{ConstructionTracker, TaskCanceller, TaskDisplay};
