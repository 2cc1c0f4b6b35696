//! Cross-check of server-aggregated capacities.
//!
//! The capacity query returns values already aggregated upstream. Feeding
//! the same breakdown through [`CapacityAggregator`] must give the same
//! number; a mismatch means the two sides disagree on the stacking rules.
//! Upstream breakdowns carry their baseline as an ordinary flat line, so
//! the recomputation uses a base of zero.

use attrition_core::{ensure_finite, CapacityKind, CapacityReport, CapacityResult, Result};
use serde::Serialize;
use tracing::{debug, warn};

use crate::aggregator::CapacityAggregator;

/// Configuration for reconciliation.
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    /// Allowed difference, relative to the reported value (absolute below 1.0)
    pub tolerance: f64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self { tolerance: 1e-6 }
    }
}

/// Outcome of comparing a reported capacity with a recomputed one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconciliation {
    /// Value the server reported
    pub reported: f64,
    /// Value recomputed from the breakdown
    pub computed: f64,
    /// `computed - reported`
    pub delta: f64,
    /// Whether the difference is within tolerance
    pub consistent: bool,
}

/// Recomputes reported capacities from their breakdowns.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    aggregator: CapacityAggregator,
    config: ReconcileConfig,
}

impl Reconciler {
    /// Create a reconciler with default tolerance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: ReconcileConfig) -> Self {
        self.config = config;
        self
    }

    /// Compare one reported capacity with its recomputation.
    pub fn reconcile(&self, reported: &CapacityResult) -> Result<Reconciliation> {
        ensure_finite("reported value", reported.value)?;

        let computed = self.aggregator.aggregate(0.0, &reported.breakdown)?.value;
        let delta = computed - reported.value;
        let consistent = delta.abs() <= self.config.tolerance * reported.value.abs().max(1.0);

        Ok(Reconciliation {
            reported: reported.value,
            computed,
            delta,
            consistent,
        })
    }

    /// Reconcile every kind in a capacity report, in kind order.
    pub fn reconcile_report(
        &self,
        report: &CapacityReport,
    ) -> Result<Vec<(CapacityKind, Reconciliation)>> {
        report
            .iter()
            .map(|(kind, result)| {
                let reconciliation = self.reconcile(result)?;
                if reconciliation.consistent {
                    debug!(%kind, value = reconciliation.reported, "Capacity consistent");
                } else {
                    warn!(
                        %kind,
                        reported = reconciliation.reported,
                        computed = reconciliation.computed,
                        "Capacity mismatch"
                    );
                }
                Ok((kind, reconciliation))
            })
            .collect()
    }
}
