//! Error types surfaced by the estimator.
//!
//! Two failure classes exist:
//! - [`ConfigError`] — rejected at construction, fatal to the run.
//! - [`OutOfOrderError`] — malformed feed ordering; aborts the remainder of
//!   the feed while results for stints completed earlier stay available.
//!
//! Numerical degeneracy (near-zero innovation variance) is handled locally by
//! ε-clamping inside the filter and never surfaces as an error.

use crate::types::StintId;
use thiserror::Error;

/// Invalid filter or runner configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be positive (got {value})")]
    NonPositive { name: &'static str, value: f64 },
    #[error("outlier penalty factor must be at least 1 (got {0})")]
    PenaltyBelowOne(f64),
}

impl ConfigError {
    /// Check a single config field for positivity.
    pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
        if value > 0.0 && value.is_finite() {
            Ok(())
        } else {
            Err(ConfigError::NonPositive { name, value })
        }
    }
}

/// The lap feed violated its ordering contract.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OutOfOrderError {
    /// A stint id went backwards as lap numbers advanced.
    #[error("{next} at lap {lap_number} arrives after {prev}; stint ids must not decrease")]
    StintRegression {
        lap_number: u32,
        prev: StintId,
        next: StintId,
    },
    /// A lap number failed to increase inside one stint.
    #[error("lap {lap_number} in {stint} does not advance past lap {prev_lap}")]
    LapRegression {
        stint: StintId,
        prev_lap: u32,
        lap_number: u32,
    },
}
