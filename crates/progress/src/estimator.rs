//! Completion percentage estimation.

use attrition_core::{ConstructionTask, Result, Time};
use chrono::Duration;
use serde::Serialize;
use tracing::{debug, warn};

use crate::remaining::RemainingTime;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Progress of a task at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    /// Percentage complete (0-100)
    pub percent: f64,

    /// Time left until completion
    pub remaining: RemainingTime,
}

impl Estimate {
    /// Whether the task has reached 100%.
    pub fn is_complete(&self) -> bool {
        self.percent >= 100.0
    }
}

/// Completion estimator.
///
/// Stateless: the same task and `now` always give the same estimate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressEstimator;

impl ProgressEstimator {
    /// Create a new estimator.
    pub fn new() -> Self {
        Self
    }

    /// Estimate task progress at `now`.
    ///
    /// Interpolates linearly between the task start and `completion_at`.
    /// Without a usable start the result is binary: 0 before completion,
    /// 100 from completion on.
    pub fn estimate(&self, task: &ConstructionTask, now: Time) -> Result<Estimate> {
        task.validate()?;

        let end = task.completion_at;
        let percent = match self.start_of(task) {
            Some(start) if start < end => interpolate(start, end, now),
            Some(start) => {
                debug!(%start, %end, "Degenerate task interval, using binary progress");
                binary(end, now)
            }
            None => binary(end, now),
        };

        Ok(Estimate {
            percent,
            remaining: RemainingTime::until(end, now),
        })
    }

    /// The task start: reported, or derived from cost and throughput.
    pub fn start_of(&self, task: &ConstructionTask) -> Option<Time> {
        if let Some(started_at) = task.started_at {
            return Some(started_at);
        }

        if task.cost > 0.0 && task.throughput_per_hour > 0.0 {
            let millis = task.cost / task.throughput_per_hour * MILLIS_PER_HOUR;
            let derived = duration_from_millis(millis)
                .and_then(|duration| task.completion_at.checked_sub_signed(duration));
            if derived.is_none() {
                warn!(
                    cost = task.cost,
                    throughput = task.throughput_per_hour,
                    "Derived task duration out of range"
                );
            }
            return derived;
        }

        None
    }
}

fn duration_from_millis(millis: f64) -> Option<Duration> {
    if !millis.is_finite() || millis >= i64::MAX as f64 {
        return None;
    }
    Duration::try_milliseconds(millis.round() as i64)
}

fn binary(end: Time, now: Time) -> f64 {
    if now >= end {
        100.0
    } else {
        0.0
    }
}

fn interpolate(start: Time, end: Time, now: Time) -> f64 {
    let total = (end - start).num_milliseconds();
    if total <= 0 {
        return binary(end, now);
    }

    let elapsed = (now - start).num_milliseconds().clamp(0, total);
    (100.0 * elapsed as f64 / total as f64).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use attrition_core::CoreError;
    use chrono::{TimeZone, Utc};

    fn t0() -> Time {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_interpolates_between_start_and_end() {
        let task = ConstructionTask::new(t0()).with_started_at(t0() - Duration::hours(4));
        let estimate = ProgressEstimator::new()
            .estimate(&task, t0() - Duration::hours(1))
            .unwrap();
        assert_eq!(estimate.percent, 75.0);
        assert_eq!(estimate.remaining.to_string(), "1h 0m 0s");
        assert!(!estimate.is_complete());
    }

    #[test]
    fn test_derives_start_from_cost_and_throughput() {
        let task = ConstructionTask::new(t0()).with_rate(1000.0, 500.0);
        let estimator = ProgressEstimator::new();
        assert_eq!(estimator.start_of(&task), Some(t0() - Duration::hours(2)));

        let estimate = estimator.estimate(&task, t0() - Duration::hours(1)).unwrap();
        assert_eq!(estimate.percent, 50.0);
    }

    #[test]
    fn test_reported_start_wins_over_derivation() {
        let task = ConstructionTask::new(t0())
            .with_started_at(t0() - Duration::hours(10))
            .with_rate(1000.0, 500.0);
        let estimate = ProgressEstimator::new()
            .estimate(&task, t0() - Duration::hours(5))
            .unwrap();
        assert_eq!(estimate.percent, 50.0);
    }

    #[test]
    fn test_binary_without_start() {
        let estimator = ProgressEstimator::new();
        for task in [
            ConstructionTask::new(t0()),
            ConstructionTask::new(t0()).with_rate(1000.0, 0.0),
            ConstructionTask::new(t0()).with_rate(0.0, 500.0),
            ConstructionTask::new(t0()).with_rate(1000.0, -5.0),
        ] {
            let before = estimator.estimate(&task, t0() - Duration::seconds(1)).unwrap();
            assert_eq!(before.percent, 0.0);
            let at = estimator.estimate(&task, t0()).unwrap();
            assert_eq!(at.percent, 100.0);
        }
    }

    #[test]
    fn test_degenerate_interval_is_binary() {
        let estimator = ProgressEstimator::new();
        let same = ConstructionTask::new(t0()).with_started_at(t0());
        let inverted = ConstructionTask::new(t0()).with_started_at(t0() + Duration::hours(1));

        for task in [same, inverted] {
            let before = estimator.estimate(&task, t0() - Duration::minutes(1)).unwrap();
            assert_eq!(before.percent, 0.0);
            let after = estimator.estimate(&task, t0() + Duration::minutes(1)).unwrap();
            assert_eq!(after.percent, 100.0);
        }
    }

    #[test]
    fn test_clock_skew_before_start_is_zero() {
        let task = ConstructionTask::new(t0()).with_started_at(t0() - Duration::hours(1));
        let estimate = ProgressEstimator::new()
            .estimate(&task, t0() - Duration::hours(3))
            .unwrap();
        assert_eq!(estimate.percent, 0.0);
        assert_eq!(estimate.remaining.to_string(), "3h 0m 0s");
    }

    #[test]
    fn test_after_completion_is_complete() {
        let task = ConstructionTask::new(t0()).with_started_at(t0() - Duration::hours(1));
        let estimate = ProgressEstimator::new()
            .estimate(&task, t0() + Duration::days(2))
            .unwrap();
        assert_eq!(estimate.percent, 100.0);
        assert!(estimate.is_complete());
        assert_eq!(estimate.remaining.to_string(), "Completed");
    }

    #[test]
    fn test_huge_derived_duration_falls_back_to_binary() {
        let task = ConstructionTask::new(t0()).with_rate(f64::MAX, 1e-300);
        let estimator = ProgressEstimator::new();
        assert_eq!(estimator.start_of(&task), None);
        let estimate = estimator.estimate(&task, t0() - Duration::hours(1)).unwrap();
        assert_eq!(estimate.percent, 0.0);
    }

    #[test]
    fn test_non_finite_rate_is_invalid() {
        let task = ConstructionTask::new(t0()).with_rate(f64::NAN, 500.0);
        let err = ProgressEstimator::new().estimate(&task, t0()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }
}
