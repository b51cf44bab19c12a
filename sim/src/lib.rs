//! `sim` — Synthetic lap feeds for tests, benchmarks, and demo runs.
//!
//! Generates stints with linear wear, Gaussian lap-time noise, injected
//! outlier laps, and an optional cliff tail. All output is deterministic
//! given the same seed.

pub mod scenarios;
pub mod stint_gen;

pub use scenarios::{RaceScenario, ScenarioKind};
pub use stint_gen::{SessionGenerator, StintProfile};
