//! `stint_core` — Tyre-degradation state estimation over racing stints.
//!
//! Given an ordered feed of per-lap degradation deltas (lap time lost versus
//! the stint's fastest lap), maintains a running 2-state Kalman estimate of
//! the latent degradation level and wear rate per stint, with σ-gated
//! down-weighting of laps that look like traffic or driver error rather than
//! tyre wear.
//!
//! # Module layout
//! - [`types`]     — Fundamental types (lap records, compounds, outputs)
//! - [`error`]     — ConfigError / OutOfOrderError
//! - [`filter`]    — Kalman filter (initialize / predict / update)
//! - [`segmenter`] — Stint boundary detection over the lap feed
//! - [`runner`]    — Full-run orchestrator, parallel across stints
//! - [`cliff`]     — Tyre-cliff probability mapping
//! - [`metrics`]   — Per-stint residual diagnostics

pub mod cliff;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod runner;
pub mod segmenter;
pub mod types;

pub use cliff::CliffConfig;
pub use error::{ConfigError, OutOfOrderError};
pub use filter::{DegradationFilter, FilterConfig, KalmanState, UpdateOutcome};
pub use runner::{RunReport, RunnerConfig, StintEstimator, StintPhase, StintRunner};
pub use segmenter::{segment, Stint, StintSegmenter};
pub use types::{Compound, FilteredLap, LapRecord, StateCov, StateVec, StintId};
