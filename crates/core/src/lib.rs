//! Attrition client core data models.
//!
//! Shared types for the progress and capacity crates: construction tasks,
//! bonus contributions, the upstream API contracts they are built from,
//! and the error taxonomy.

#![warn(missing_docs)]

mod error;
mod time;

// Construction tasks
mod task;
mod location;

// Capacity bonuses
mod bonus;

// Re-exports
pub use error::{ensure_finite, CoreError, Result};
pub use time::{parse_timestamp, Time};

pub use task::{ConstructionStatus, ConstructionTask};
pub use location::{CancelOutcome, LocationCoord};

pub use bonus::{
    BonusCategory, BonusContribution, BonusKind, CapacityKind, CapacityReport, CapacityResult,
};
