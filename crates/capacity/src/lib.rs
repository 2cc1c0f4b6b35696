//! Capacity Bonuses
//!
//! Aggregation of flat and percentage bonus contributions into a capacity
//! value, grouping of the breakdown by origin, and cross-checking of
//! capacities the server already aggregated.

#![warn(missing_docs)]

pub mod aggregator;
pub mod classification;
pub mod reconcile;

pub use aggregator::{CapacityAggregator, Totals};
pub use classification::{
    classify, BonusClassifier, ClassificationError, ClassifiedBreakdown, ClassifierRule,
    ClassifierRules, RuleClassifier,
};
pub use reconcile::{Reconciler, ReconcileConfig, Reconciliation};
