//! Degradation filter: predict and update steps.
//!
//! # Design choices
//! - Linear KF with a constant-wear-rate model: the tyre loses a roughly
//!   constant amount of lap time per lap, so rate is carried as state instead
//!   of being a fixed tunable.
//! - All math is done in `f64` via `nalgebra` for numerical stability.
//! - Measurements that fail the σ-gate are down-weighted, never discarded, so
//!   a single bad lap (traffic, lockup) cannot yank the trend while a genuine
//!   cliff still pulls the estimate over the following laps.
//!
//! ## State vector
//! x = [level, rate]ᵀ  (seconds, seconds/lap)
//!
//! ## Transition model
//! F = [[1, dt], [0, 1]]  i.e. level += rate·dt per lap
//!
//! ## Observation model
//! H = [1, 0] — only the absolute degradation level is measured.

use crate::error::ConfigError;
use crate::types::{StateCov, StateVec};
use nalgebra::Matrix2;

/// Innovation variance floor. S can underflow to ≤ 0 through cancellation
/// when the covariance has collapsed; dividing by it would blow up the gain.
const INNOVATION_EPS: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Tunable noise model for one filter run.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FilterConfig {
    /// Process noise on the degradation level (s² per lap)
    pub process_noise_level: f64,
    /// Process noise on the wear rate ((s/lap)² per lap)
    pub process_noise_rate: f64,
    /// Measurement noise variance R (s²)
    pub measurement_noise: f64,
    /// Gate threshold k: residuals beyond k·√S are treated as outliers
    pub gate_threshold: f64,
    /// Factor by which R is inflated for a gated measurement (≥ 1)
    pub outlier_penalty_factor: f64,
    /// Initial variance on both state components (large: we know little)
    pub initial_covariance_prior: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            process_noise_level: 0.01, // wear itself wanders a little lap to lap
            process_noise_rate: 0.005,
            measurement_noise: 0.05, // traffic and driver noise on the delta
            gate_threshold: 3.0,     // 3σ
            outlier_penalty_factor: 100.0,
            initial_covariance_prior: 1.0,
        }
    }
}

impl FilterConfig {
    /// Fail fast on a non-positive noise term, threshold, or prior.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::require_positive("process_noise_level", self.process_noise_level)?;
        ConfigError::require_positive("process_noise_rate", self.process_noise_rate)?;
        ConfigError::require_positive("measurement_noise", self.measurement_noise)?;
        ConfigError::require_positive("gate_threshold", self.gate_threshold)?;
        ConfigError::require_positive("initial_covariance_prior", self.initial_covariance_prior)?;
        if self.outlier_penalty_factor < 1.0 || self.outlier_penalty_factor.is_nan() {
            return Err(ConfigError::PenaltyBelowOne(self.outlier_penalty_factor));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Estimate vector and covariance for one stint.
///
/// Owned by exactly one filter run; created at stint start and discarded at
/// stint end, since the tyre set (and therefore the latent state) changes.
#[derive(Clone, Copy, Debug)]
pub struct KalmanState {
    /// [level, rate]
    pub x: StateVec,
    /// Covariance P, kept symmetric positive semi-definite
    pub p: StateCov,
}

impl KalmanState {
    /// Smoothed absolute degradation level (s).
    pub fn level(&self) -> f64 {
        self.x[0]
    }

    /// Estimated wear rate (s/lap).
    pub fn rate(&self) -> f64 {
        self.x[1]
    }
}

/// Result of one update step, exposed for diagnostics.
#[derive(Clone, Copy, Debug)]
pub struct UpdateOutcome {
    pub state: KalmanState,
    /// Innovation ν = z − level_pred
    pub residual: f64,
    /// Innovation variance S = P[0,0] + R (after ε-clamping)
    pub innovation_var: f64,
    /// Normalized gate value g = |ν| / √S
    pub gate_value: f64,
    /// True when g exceeded the gate threshold and R was inflated
    pub is_outlier: bool,
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// Constant-wear-rate Kalman filter over per-lap degradation deltas.
#[derive(Clone, Debug)]
pub struct DegradationFilter {
    config: FilterConfig,
}

impl DegradationFilter {
    /// Build a filter, rejecting invalid configuration up front.
    pub fn new(config: FilterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Seed the state from the first measurement of a stint: the level is
    /// taken at face value, the rate starts at zero, and the covariance is
    /// the configured wide prior.
    pub fn initialize(&self, first_measurement: f64) -> KalmanState {
        KalmanState {
            x: StateVec::new(first_measurement, 0.0),
            p: StateCov::identity() * self.config.initial_covariance_prior,
        }
    }

    /// Advance the state by `dt` laps under the constant-rate model.
    /// Pure: returns a new state, the input is untouched.
    pub fn predict(&self, state: &KalmanState, dt: u32) -> KalmanState {
        let dt = dt as f64;
        let f = Matrix2::new(1.0, dt, 0.0, 1.0);
        let q = Matrix2::new(
            self.config.process_noise_level,
            0.0,
            0.0,
            self.config.process_noise_rate,
        );
        KalmanState {
            x: f * state.x,
            p: f * state.p * f.transpose() + q * dt,
        }
    }

    /// Fold one measurement into a predicted state.
    ///
    /// A residual outside `gate_threshold` standard deviations marks the lap
    /// as an outlier and re-runs the correction with R inflated by
    /// `outlier_penalty_factor`, shrinking the gain without discarding the
    /// measurement. Residual and flag are always reported, gated or not.
    pub fn update(&self, predicted: &KalmanState, measurement: f64) -> UpdateOutcome {
        let residual = measurement - predicted.x[0];
        let s = (predicted.p[(0, 0)] + self.config.measurement_noise).max(INNOVATION_EPS);
        let gate_value = residual.abs() / s.sqrt();
        let is_outlier = gate_value > self.config.gate_threshold;

        // Down-weighted update for gated laps: same equations, larger R.
        let r_eff = if is_outlier {
            self.config.measurement_noise * self.config.outlier_penalty_factor
        } else {
            self.config.measurement_noise
        };
        let s_eff = (predicted.p[(0, 0)] + r_eff).max(INNOVATION_EPS);

        // With H = [1, 0] the gain collapses to the first covariance column.
        let k = StateVec::new(predicted.p[(0, 0)] / s_eff, predicted.p[(1, 0)] / s_eff);
        let x = predicted.x + k * residual;

        // P' = (I − K·H)·P, then symmetrize to keep P numerically SPD.
        let i_kh = Matrix2::new(1.0 - k[0], 0.0, -k[1], 1.0);
        let p = i_kh * predicted.p;
        let p = (p + p.transpose()) * 0.5;

        UpdateOutcome {
            state: KalmanState { x, p },
            residual,
            innovation_var: s,
            gate_value,
            is_outlier,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
