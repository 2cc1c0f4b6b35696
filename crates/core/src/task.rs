//! Construction task model - what the progress estimator works from.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ensure_finite, Result};
use crate::time::{parse_timestamp, Time};

/// A construction or production task as seen by the estimator.
///
/// Built fresh from each API response and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructionTask {
    /// When the task completes
    pub completion_at: Time,

    /// When the task started, if the API reported it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<Time>,

    /// Credits cost, used to derive a start when `started_at` is missing
    #[serde(default)]
    pub cost: f64,

    /// Credits per hour, used to derive a start when `started_at` is missing
    #[serde(default)]
    pub throughput_per_hour: f64,
}

impl ConstructionTask {
    /// Create a task known only by its completion time.
    pub fn new(completion_at: Time) -> Self {
        Self {
            completion_at,
            started_at: None,
            cost: 0.0,
            throughput_per_hour: 0.0,
        }
    }

    /// Set the reported start time.
    pub fn with_started_at(mut self, started_at: Time) -> Self {
        self.started_at = Some(started_at);
        self
    }

    /// Set cost and throughput for start derivation.
    pub fn with_rate(mut self, cost: f64, throughput_per_hour: f64) -> Self {
        self.cost = cost;
        self.throughput_per_hour = throughput_per_hour;
        self
    }

    /// Build a task from raw upstream values.
    ///
    /// An unparseable `completion_at` is an error. An unparseable
    /// `started_at` is dropped so the cost/throughput derivation can still
    /// apply.
    pub fn from_raw(
        completion_at: &str,
        started_at: Option<&str>,
        cost: f64,
        throughput_per_hour: f64,
    ) -> Result<Self> {
        let completion_at = parse_timestamp(completion_at)?;

        let started_at = match started_at {
            Some(raw) => match parse_timestamp(raw) {
                Ok(t) => Some(t),
                Err(e) => {
                    debug!("Ignoring start time: {}", e);
                    None
                }
            },
            None => None,
        };

        let task = Self {
            completion_at,
            started_at,
            cost,
            throughput_per_hour,
        };
        task.validate()?;
        Ok(task)
    }

    /// Check the numeric fields are usable.
    pub fn validate(&self) -> Result<()> {
        ensure_finite("cost", self.cost)?;
        ensure_finite("throughputPerHour", self.throughput_per_hour)
    }
}

/// Task status record returned by the task-status query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructionStatus {
    /// Building or unit key
    pub key: String,

    /// Completion timestamp, absent when nothing is queued
    #[serde(default)]
    pub completion_at: Option<String>,

    /// Start timestamp
    #[serde(default)]
    pub started_at: Option<String>,

    /// Level before the upgrade
    #[serde(default)]
    pub current_level: u32,

    /// Level after the upgrade
    #[serde(default)]
    pub target_level: u32,

    /// Credits spent on the task
    #[serde(default)]
    pub credits_cost: f64,

    /// Upgrade finished server-side but not yet acknowledged
    #[serde(default)]
    pub pending_upgrade: bool,
}

impl ConstructionStatus {
    /// Convert into an estimator task.
    ///
    /// Returns `Ok(None)` when the record has no completion time, i.e. there
    /// is no active task.
    pub fn to_task(&self, throughput_per_hour: Option<f64>) -> Result<Option<ConstructionTask>> {
        let Some(completion_at) = self.completion_at.as_deref() else {
            return Ok(None);
        };

        ConstructionTask::from_raw(
            completion_at,
            self.started_at.as_deref(),
            self.credits_cost,
            throughput_per_hour.unwrap_or(0.0),
        )
        .map(Some)
    }
}
