//! Periodic re-estimation for live countdowns.

use attrition_core::{ConstructionTask, CoreError, Result};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::clock::Clock;
use crate::estimator::{Estimate, ProgressEstimator};

/// Configuration for a countdown.
#[derive(Debug, Clone)]
pub struct CountdownConfig {
    /// Time between estimates
    pub tick: std::time::Duration,
    /// Stop after the first complete estimate
    pub stop_when_complete: bool,
    /// Max estimates before stopping (None = until complete or cancelled)
    pub max_ticks: Option<usize>,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            tick: std::time::Duration::from_secs(1),
            stop_when_complete: true,
            max_ticks: None,
        }
    }
}

/// Re-runs the estimator on a fixed cadence and pushes each estimate to a
/// channel.
///
/// Cancel by dropping the receiver or the `run` future; nothing is left in
/// flight.
pub struct Countdown<C: Clock> {
    estimator: ProgressEstimator,
    clock: C,
    config: CountdownConfig,
}

impl<C: Clock> Countdown<C> {
    /// Create a countdown reading time from `clock`.
    pub fn new(clock: C) -> Self {
        Self {
            estimator: ProgressEstimator::new(),
            clock,
            config: CountdownConfig::default(),
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: CountdownConfig) -> Self {
        self.config = config;
        self
    }

    /// Run until the task completes, `max_ticks` is reached or the receiver
    /// goes away. Returns the number of estimates delivered.
    pub async fn run(&self, task: &ConstructionTask, tx: mpsc::Sender<Estimate>) -> Result<usize> {
        task.validate()?;
        if self.config.tick.is_zero() {
            return Err(CoreError::InvalidInput("countdown tick must be non-zero".to_string()));
        }

        let mut ticker = tokio::time::interval(self.config.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut delivered = 0;

        loop {
            ticker.tick().await;

            let estimate = self.estimator.estimate(task, self.clock.now())?;
            let complete = estimate.is_complete();

            if tx.send(estimate).await.is_err() {
                debug!("Countdown receiver dropped after {} ticks", delivered);
                break;
            }
            delivered += 1;

            if complete && self.config.stop_when_complete {
                debug!("Countdown reached completion");
                break;
            }
            if self.config.max_ticks.is_some_and(|max| delivered >= max) {
                break;
            }
        }

        Ok(delivered)
    }
}
