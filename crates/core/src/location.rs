//! Location coordinates and the cancel-task outcome.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Coordinate of the base a task runs at, e.g. `A00:10:22:10`.
///
/// The format belongs to the API; only non-emptiness is checked here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationCoord(String);

impl LocationCoord {
    /// Create from a raw coordinate string.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidInput("empty location coordinate".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Borrow the coordinate.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LocationCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for LocationCoord {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// What the cancel-task operation reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CancelOutcome {
    /// Task was cancelled
    Cancelled,
    /// The API refused to cancel
    Rejected {
        /// Reason given by the API
        reason: String,
    },
}

impl CancelOutcome {
    /// Whether the cancel went through.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CancelOutcome::Cancelled)
    }
}
