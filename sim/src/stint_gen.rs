//! Synthetic stint generation.
//!
//! Lap times are built as base + linear wear + Gaussian noise, with a chance
//! per lap of an outlier excursion (traffic, a mistake) and an optional
//! super-linear cliff tail. Degradation deltas are then derived the same way
//! the real extraction step derives them: lap time minus the stint's fastest
//! lap, so the minimum delta in every stint is exactly zero.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use stint_core::{Compound, LapRecord, StintId};

/// Shape of one synthetic stint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StintProfile {
    pub stint_id: StintId,
    pub compound: Compound,
    /// Number of laps in the stint
    pub laps: u32,
    /// Representative clean lap time at zero wear (s)
    pub base_lap_time: f64,
    /// True linear wear rate (s/lap)
    pub wear_rate: f64,
    /// Gaussian lap-time noise, 1σ (s)
    pub noise_std: f64,
    /// Per-lap probability of an outlier excursion
    pub outlier_prob: f64,
    /// Size of an outlier excursion (s, added on top of the clean time)
    pub outlier_magnitude: f64,
    /// Tyre life at which the cliff starts, if any
    pub cliff_onset: Option<u32>,
    /// Additional wear per lap past the cliff (s/lap, quadratic-ish growth)
    pub cliff_rate: f64,
    /// Track temperature reported on every lap (°C)
    pub track_temp: f64,
}

impl StintProfile {
    /// A plain medium-compound stint with mild noise and no cliff.
    pub fn steady(stint_id: u32, laps: u32) -> Self {
        Self {
            stint_id: StintId(stint_id),
            compound: Compound::Medium,
            laps,
            base_lap_time: 104.0,
            wear_rate: 0.06,
            noise_std: 0.12,
            outlier_prob: 0.0,
            outlier_magnitude: 0.0,
            cliff_onset: None,
            cliff_rate: 0.0,
            track_temp: 31.0,
        }
    }
}

/// Deterministic generator for whole-race lap feeds.
pub struct SessionGenerator {
    rng: ChaCha8Rng,
}

impl SessionGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Generate one stint's laps, starting at `first_lap_number`.
    pub fn generate_stint(
        &mut self,
        profile: &StintProfile,
        first_lap_number: u32,
    ) -> Vec<LapRecord> {
        let mut lap_times = Vec::with_capacity(profile.laps as usize);
        for i in 0..profile.laps {
            let tyre_life = i + 1;
            let mut t = profile.base_lap_time + profile.wear_rate * i as f64;
            if let Some(onset) = profile.cliff_onset {
                if tyre_life > onset {
                    let past = (tyre_life - onset) as f64;
                    t += profile.cliff_rate * past * past;
                }
            }
            // Box-Muller keeps the dependency surface small; rand's uniform
            // source is all we need.
            t += gaussian(&mut self.rng) * profile.noise_std;
            if profile.outlier_prob > 0.0 && self.rng.gen_bool(profile.outlier_prob) {
                t += profile.outlier_magnitude;
            }
            lap_times.push(t);
        }

        let fastest = lap_times.iter().copied().fold(f64::INFINITY, f64::min);
        lap_times
            .iter()
            .enumerate()
            .map(|(i, &t)| LapRecord {
                lap_number: first_lap_number + i as u32,
                stint_id: profile.stint_id,
                compound: profile.compound,
                tyre_life: i as u32 + 1,
                track_temp: profile.track_temp,
                lap_time_sec: t,
                degradation_delta: t - fastest,
            })
            .collect()
    }

    /// Generate a full session: stints back to back with continuous race lap
    /// numbering, in stint-id order.
    pub fn generate_session(&mut self, profiles: &[StintProfile]) -> Vec<LapRecord> {
        let mut laps = Vec::new();
        let mut next_lap = 1;
        for profile in profiles {
            let stint = self.generate_stint(profile, next_lap);
            next_lap += profile.laps;
            laps.extend(stint);
        }
        laps
    }
}

/// Standard normal via Box-Muller.
fn gaussian(rng: &mut ChaCha8Rng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
