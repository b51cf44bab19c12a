//! Fundamental types used across the entire workspace.

use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Scalar type: use f64 throughout for numerical precision in the filter.
// ---------------------------------------------------------------------------

/// 2-state estimate vector: [level (s), rate (s/lap)]
pub type StateVec = Vector2<f64>;

/// 2×2 estimate covariance matrix
pub type StateCov = Matrix2<f64>;

// ---------------------------------------------------------------------------
// Identifier types — newtype wrappers so IDs are never confused at compile time
// ---------------------------------------------------------------------------

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct StintId(pub u32);

impl fmt::Display for StintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stint {}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tyre compound
// ---------------------------------------------------------------------------

/// Tyre compound fitted for a stint, as reported by the timing feed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Compound {
    Soft,
    Medium,
    Hard,
    Intermediate,
    Wet,
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Compound::Soft => "SOFT",
            Compound::Medium => "MEDIUM",
            Compound::Hard => "HARD",
            Compound::Intermediate => "INTERMEDIATE",
            Compound::Wet => "WET",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// LapRecord — one row of the upstream telemetry feed
// ---------------------------------------------------------------------------

/// A single clean racing lap as delivered by the extraction feed.
///
/// Field names map 1:1 onto the CSV header produced upstream
/// (`LapNumber,Stint,Compound,TyreLife,TrackTemp,LapTime_Sec,Degradation_Delta`).
/// Records are read-only to the estimator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LapRecord {
    /// Race lap number (positive, increases within a stint)
    #[serde(rename = "LapNumber")]
    pub lap_number: u32,
    /// Stint this lap belongs to
    #[serde(rename = "Stint")]
    pub stint_id: StintId,
    /// Compound fitted for the stint
    #[serde(rename = "Compound")]
    pub compound: Compound,
    /// Laps already done on this tyre set
    #[serde(rename = "TyreLife")]
    pub tyre_life: u32,
    /// Track surface temperature (°C)
    #[serde(rename = "TrackTemp")]
    pub track_temp: f64,
    /// Lap time in seconds (> 0)
    #[serde(rename = "LapTime_Sec")]
    pub lap_time_sec: f64,
    /// Lap time minus the stint's fastest lap (≥ 0). The noisy measurement.
    #[serde(rename = "Degradation_Delta")]
    pub degradation_delta: f64,
}

// ---------------------------------------------------------------------------
// FilteredLap — one estimator output per input lap
// ---------------------------------------------------------------------------

/// Posterior estimate and diagnostics for one processed lap.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct FilteredLap {
    #[serde(rename = "LapNumber")]
    pub lap_number: u32,
    #[serde(rename = "Stint")]
    pub stint_id: StintId,
    /// Raw degradation delta as measured (s)
    #[serde(rename = "RawDelta")]
    pub raw_delta: f64,
    /// Smoothed absolute degradation level (s)
    #[serde(rename = "EstLevel")]
    pub estimated_level: f64,
    /// Estimated degradation rate (s/lap)
    #[serde(rename = "EstRate")]
    pub estimated_rate: f64,
    /// Innovation: measurement minus predicted level (s)
    #[serde(rename = "Residual")]
    pub residual: f64,
    /// True when the measurement failed the σ-gate and was down-weighted
    #[serde(rename = "IsOutlier")]
    pub is_outlier: bool,
    /// Probability the tyre has reached its performance cliff
    #[serde(rename = "CliffProb")]
    pub cliff_probability: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compound_roundtrips_through_feed_spelling() {
        // The upstream feed spells compounds in caps; serde must accept them.
        let c: Compound = serde_json::from_str("\"MEDIUM\"").unwrap();
        assert_eq!(c, Compound::Medium);
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"MEDIUM\"");
        assert_eq!(c.to_string(), "MEDIUM");
    }

    #[test]
    fn stint_id_display() {
        assert_eq!(StintId(2).to_string(), "stint 2");
    }
}
