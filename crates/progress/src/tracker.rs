//! Display model for the active construction task.

use async_trait::async_trait;
use attrition_core::{CancelOutcome, ConstructionStatus, LocationCoord, Result, Time};
use serde::Serialize;
use tracing::{info, warn};

use crate::estimator::{Estimate, ProgressEstimator};

/// What the construction panel should show.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum TaskDisplay {
    /// Nothing under construction
    Idle,

    /// Task in progress
    #[serde(rename_all = "camelCase")]
    Active {
        /// Building or unit key
        key: String,
        /// Level before the upgrade
        current_level: u32,
        /// Level after the upgrade
        target_level: u32,
        /// Progress at the time of the view
        estimate: Estimate,
    },

    /// Finished, waiting for the server to acknowledge the upgrade
    #[serde(rename_all = "camelCase")]
    AwaitingAcknowledgement {
        /// Building or unit key
        key: String,
        /// Level after the upgrade
        target_level: u32,
    },

    /// The status record could not be used; render a neutral placeholder
    Unavailable {
        /// Why the record was rejected
        reason: String,
    },
}

/// The API layer's cancel-task operation.
#[async_trait]
pub trait TaskCanceller: Send + Sync {
    /// Cancel the task running at `location`.
    async fn cancel(&self, location: &LocationCoord) -> Result<CancelOutcome>;
}

/// Builds [`TaskDisplay`] values from task-status records.
#[derive(Debug, Clone, Default)]
pub struct ConstructionTracker {
    estimator: ProgressEstimator,
}

impl ConstructionTracker {
    /// Create a new tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Display state for a status record at `now`.
    ///
    /// `throughput_per_hour` comes from the capacity query and is only used
    /// when the record has no start time. Malformed records become
    /// [`TaskDisplay::Unavailable`] instead of an error.
    pub fn view(
        &self,
        status: Option<&ConstructionStatus>,
        throughput_per_hour: Option<f64>,
        now: Time,
    ) -> TaskDisplay {
        let Some(status) = status else {
            return TaskDisplay::Idle;
        };

        let task = match status.to_task(throughput_per_hour) {
            Ok(Some(task)) => task,
            Ok(None) => return TaskDisplay::Idle,
            Err(e) => {
                warn!(key = %status.key, "Unusable construction status: {}", e);
                return TaskDisplay::Unavailable {
                    reason: e.to_string(),
                };
            }
        };

        match self.estimator.estimate(&task, now) {
            Ok(estimate) if estimate.is_complete() && status.pending_upgrade => {
                TaskDisplay::AwaitingAcknowledgement {
                    key: status.key.clone(),
                    target_level: status.target_level,
                }
            }
            Ok(estimate) => TaskDisplay::Active {
                key: status.key.clone(),
                current_level: status.current_level,
                target_level: status.target_level,
                estimate,
            },
            Err(e) => {
                warn!(key = %status.key, "Failed to estimate progress: {}", e);
                TaskDisplay::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Ask the API layer to cancel the task at `location`.
    pub async fn cancel(
        &self,
        location: &LocationCoord,
        canceller: &dyn TaskCanceller,
    ) -> Result<CancelOutcome> {
        match canceller.cancel(location).await {
            Ok(outcome) => {
                match &outcome {
                    CancelOutcome::Cancelled => info!(%location, "Construction cancelled"),
                    CancelOutcome::Rejected { reason } => {
                        info!(%location, "Cancel rejected: {}", reason)
                    }
                }
                Ok(outcome)
            }
            Err(e) => {
                warn!(%location, "Cancel failed: {}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attrition_core::CoreError;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Mutex;

    fn t0() -> Time {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn status(completion_at: Option<&str>) -> ConstructionStatus {
        ConstructionStatus {
            key: "research_labs".to_string(),
            completion_at: completion_at.map(str::to_string),
            started_at: None,
            current_level: 5,
            target_level: 6,
            credits_cost: 1000.0,
            pending_upgrade: false,
        }
    }

    struct MockCanceller {
        result: Result<CancelOutcome>,
        calls: Mutex<Vec<String>>,
    }

    impl MockCanceller {
        fn new(result: Result<CancelOutcome>) -> Self {
            Self {
                result,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TaskCanceller for MockCanceller {
        async fn cancel(&self, location: &LocationCoord) -> Result<CancelOutcome> {
            self.calls.lock().unwrap().push(location.to_string());
            self.result.clone()
        }
    }

    #[test]
    fn test_no_status_is_idle() {
        let tracker = ConstructionTracker::new();
        assert_eq!(tracker.view(None, Some(500.0), t0()), TaskDisplay::Idle);
        assert_eq!(tracker.view(Some(&status(None)), Some(500.0), t0()), TaskDisplay::Idle);
    }

    #[test]
    fn test_active_uses_throughput_for_start() {
        let tracker = ConstructionTracker::new();
        let display = tracker.view(
            Some(&status(Some("2025-03-01T12:00:00Z"))),
            Some(500.0),
            t0() - Duration::hours(1),
        );

        let TaskDisplay::Active { key, current_level, target_level, estimate } = display else {
            panic!("expected active task");
        };
        assert_eq!(key, "research_labs");
        assert_eq!((current_level, target_level), (5, 6));
        assert_eq!(estimate.percent, 50.0);
        assert_eq!(estimate.remaining.to_string(), "1h 0m 0s");
    }

    #[test]
    fn test_missing_throughput_is_binary() {
        let tracker = ConstructionTracker::new();
        let display = tracker.view(
            Some(&status(Some("2025-03-01T12:00:00Z"))),
            None,
            t0() - Duration::hours(1),
        );
        let TaskDisplay::Active { estimate, .. } = display else {
            panic!("expected active task");
        };
        assert_eq!(estimate.percent, 0.0);
    }

    #[test]
    fn test_completed_pending_upgrade_awaits_acknowledgement() {
        let mut record = status(Some("2025-03-01T12:00:00Z"));
        record.pending_upgrade = true;

        let tracker = ConstructionTracker::new();
        assert_eq!(
            tracker.view(Some(&record), Some(500.0), t0() + Duration::seconds(5)),
            TaskDisplay::AwaitingAcknowledgement {
                key: "research_labs".to_string(),
                target_level: 6,
            }
        );

        // Still running: pending flag alone does not finish it
        let display = tracker.view(Some(&record), Some(500.0), t0() - Duration::minutes(5));
        assert!(matches!(display, TaskDisplay::Active { .. }));
    }

    #[test]
    fn test_malformed_record_is_unavailable() {
        let tracker = ConstructionTracker::new();
        let display = tracker.view(Some(&status(Some("tomorrow"))), Some(500.0), t0());
        assert!(matches!(display, TaskDisplay::Unavailable { .. }));

        let mut record = status(Some("2025-03-01T12:00:00Z"));
        record.credits_cost = f64::NAN;
        let display = tracker.view(Some(&record), Some(500.0), t0());
        assert!(matches!(display, TaskDisplay::Unavailable { .. }));
    }

    #[test]
    fn test_display_serializes_with_state_tag() {
        let display = TaskDisplay::AwaitingAcknowledgement {
            key: "shipyards".to_string(),
            target_level: 2,
        };
        let json = serde_json::to_value(&display).unwrap();
        assert_eq!(json["state"], "awaitingAcknowledgement");
        assert_eq!(json["targetLevel"], 2);
    }

    #[tokio::test]
    async fn test_cancel_forwards_location_and_outcome() {
        let canceller = MockCanceller::new(Ok(CancelOutcome::Cancelled));
        let location = LocationCoord::parse("A00:10:22:10").unwrap();

        let outcome = ConstructionTracker::new()
            .cancel(&location, &canceller)
            .await
            .unwrap();

        assert!(outcome.is_cancelled());
        assert_eq!(*canceller.calls.lock().unwrap(), vec!["A00:10:22:10".to_string()]);
    }

    #[tokio::test]
    async fn test_cancel_reports_rejection_and_errors() {
        let location = LocationCoord::parse("A00:10:22:10").unwrap();
        let tracker = ConstructionTracker::new();

        let rejected = MockCanceller::new(Ok(CancelOutcome::Rejected {
            reason: "already complete".to_string(),
        }));
        let outcome = tracker.cancel(&location, &rejected).await.unwrap();
        assert!(!outcome.is_cancelled());

        let failing = MockCanceller::new(Err(CoreError::Unavailable("api down".to_string())));
        let err = tracker.cancel(&location, &failing).await.unwrap_err();
        assert!(matches!(err, CoreError::Unavailable(_)));
    }
}
