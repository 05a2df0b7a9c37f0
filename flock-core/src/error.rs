//! Error types for flock-core.

use thiserror::Error;

/// Result type for simulation operations.
pub type Result<T> = std::result::Result<T, SimulationError>;

/// Errors reported synchronously to the caller of a simulation operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// An operation that needs a live simulation ran before one was created.
    #[error("no active simulation")]
    NoActiveSimulation,

    /// A caller-supplied value was rejected before anything was applied.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl SimulationError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        SimulationError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            SimulationError::NoActiveSimulation => "no_active_simulation",
            SimulationError::InvalidParameter { .. } => "invalid_parameter",
        }
    }
}

/// Rejects NaN, infinite, or negative values.
pub(crate) fn ensure_non_negative(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(SimulationError::invalid(name, format!("must be finite, got {}", value)));
    }
    if value < 0.0 {
        return Err(SimulationError::invalid(name, format!("must not be negative, got {}", value)));
    }
    Ok(())
}

/// Rejects NaN, infinite, zero, or negative values.
pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<()> {
    ensure_non_negative(name, value)?;
    if value == 0.0 {
        return Err(SimulationError::invalid(name, "must be greater than zero"));
    }
    Ok(())
}
