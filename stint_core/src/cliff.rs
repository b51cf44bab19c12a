//! Tyre-cliff probability mapping.
//!
//! Maps a smoothed degradation level onto the probability that the tyre has
//! reached its performance cliff, via a logistic curve centred on the cliff
//! threshold. Purely a diagnostic output; when to pit is someone else's call.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Parameters of the logistic cliff curve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CliffConfig {
    /// Degradation level (s) at which the probability crosses 0.5
    pub threshold: f64,
    /// Steepness of the transition; higher means a more sudden cliff
    pub steepness: f64,
}

impl Default for CliffConfig {
    fn default() -> Self {
        Self {
            threshold: 0.60,
            steepness: 15.0,
        }
    }
}

impl CliffConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::require_positive("cliff_threshold", self.threshold)?;
        ConfigError::require_positive("cliff_steepness", self.steepness)
    }

    /// Probability in [0, 1] that a tyre at `level` seconds of degradation
    /// has fallen off the cliff.
    pub fn probability(&self, level: f64) -> f64 {
        1.0 / (1.0 + (-self.steepness * (level - self.threshold)).exp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn half_probability_at_threshold() {
        let cliff = CliffConfig::default();
        assert_abs_diff_eq!(cliff.probability(0.60), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn monotonic_in_level() {
        let cliff = CliffConfig::default();
        let mut prev = cliff.probability(0.0);
        for i in 1..=20 {
            let p = cliff.probability(i as f64 * 0.1);
            assert!(p > prev);
            assert!((0.0..=1.0).contains(&p));
            prev = p;
        }
    }

    #[test]
    fn fresh_tyre_is_nowhere_near_the_cliff() {
        let cliff = CliffConfig::default();
        assert!(cliff.probability(0.05) < 0.01);
        assert!(cliff.probability(1.2) > 0.99);
    }
}
