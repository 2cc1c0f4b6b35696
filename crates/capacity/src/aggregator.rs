//! Capacity aggregation.
//!
//! Flat contributions are summed first (together with the base), then the
//! summed percentage is applied once:
//!
//! ```text
//! value = (base + Σ flat) * (1 + Σ percent)
//! ```
//!
//! Percentages stack additively. Two +5% bonuses give +10%, not 1.05 * 1.05.

use attrition_core::{ensure_finite, BonusContribution, BonusKind, CapacityResult, Result};
use serde::Serialize;
use tracing::debug;

/// Intermediate sums behind a capacity value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Totals {
    /// Base plus all flat contributions
    pub flat_total: f64,
    /// Sum of all percent fractions
    pub percent_total: f64,
}

impl Totals {
    /// Final capacity for these sums.
    pub fn value(&self) -> f64 {
        self.flat_total * (1.0 + self.percent_total)
    }
}

/// Capacity aggregator.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapacityAggregator;

impl CapacityAggregator {
    /// Create a new aggregator.
    pub fn new() -> Self {
        Self
    }

    /// Sum flat and percent contributions separately.
    pub fn totals(&self, base: f64, contributions: &[BonusContribution]) -> Result<Totals> {
        ensure_finite("base", base)?;

        let (flats, percents): (Vec<_>, Vec<_>) = contributions
            .iter()
            .partition(|c| c.kind == BonusKind::Flat);

        let mut flat_total = base;
        for contribution in flats {
            ensure_finite(&contribution.source, contribution.value)?;
            flat_total += contribution.value;
        }

        let mut percent_total = 0.0;
        for contribution in percents {
            ensure_finite(&contribution.source, contribution.value)?;
            percent_total += contribution.value;
        }

        Ok(Totals {
            flat_total,
            percent_total,
        })
    }

    /// Aggregate `base` and `contributions` into a capacity value.
    ///
    /// The breakdown is the contribution list as given; the implicit base is
    /// not added to it.
    pub fn aggregate(&self, base: f64, contributions: &[BonusContribution]) -> Result<CapacityResult> {
        let totals = self.totals(base, contributions)?;
        let value = totals.value();

        debug!(
            flat_total = totals.flat_total,
            percent_total = totals.percent_total,
            value,
            "Aggregated {} contributions",
            contributions.len()
        );

        Ok(CapacityResult {
            value,
            breakdown: contributions.to_vec(),
        })
    }
}
