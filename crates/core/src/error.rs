//! Error taxonomy shared by the core crates.

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors reported by the estimation and aggregation code.
///
/// Callers turn these into a neutral "unavailable" display state; they are
/// never meant to cross into rendering code as panics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Malformed timestamp, non-finite number or otherwise unusable value
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Upstream data did not carry a required field
    #[error("unavailable: {0}")]
    Unavailable(String),
}

/// Reject NaN and infinities for a named numeric field.
pub fn ensure_finite(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CoreError::InvalidInput(format!(
            "{field} must be finite, got {value}"
        )))
    }
}
