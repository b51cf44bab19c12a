//! Runner orchestrator: the full estimation cycle for one lap feed.
//!
//! # Processing steps per run
//! 1. Segment the ordered feed into stints (lazy, stops at the first fault)
//! 2. Resolve the filter config for each stint's compound
//! 3. Filter each stint independently (predict / update per lap), in
//!    parallel across stints; no state is shared between stints
//! 4. Reassemble outputs in original feed order and attach per-stint
//!    summaries and any ordering fault that cut the feed short
//!
//! Within a stint the recursion is inherently sequential: each lap's update
//! depends on the previous posterior.

use crate::{
    cliff::CliffConfig,
    error::{ConfigError, OutOfOrderError},
    filter::{DegradationFilter, FilterConfig, KalmanState},
    metrics::{StintMetrics, StintSummary},
    segmenter::{segment, Stint},
    types::{Compound, FilteredLap, LapRecord, StintId},
};
use rayon::prelude::*;
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Configuration for a full run: a base filter config, optional per-compound
/// overrides applied at stint boundaries, and the cliff curve.
///
/// Compound overrides are the supported way to widen noise for a compound
/// switch; the resolution happens once per stint, never mid-stint.
#[derive(Clone, Debug, Default)]
pub struct RunnerConfig {
    pub filter: FilterConfig,
    pub compound_overrides: HashMap<Compound, FilterConfig>,
    pub cliff: CliffConfig,
}

impl RunnerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.filter.validate()?;
        for cfg in self.compound_overrides.values() {
            cfg.validate()?;
        }
        self.cliff.validate()
    }
}

// ---------------------------------------------------------------------------
// Per-stint estimator lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle of one stint's estimator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StintPhase {
    /// No lap seen yet
    Uninitialized,
    /// At least one lap folded in
    Tracking,
    /// Stint ended; no transition leaves this phase
    Closed,
}

/// Drives one filter through one stint, lap by lap.
///
/// `Uninitialized → Tracking` on the first lap, `Tracking → Tracking` on each
/// subsequent lap, `→ Closed` on [`StintEstimator::close`]. A closed
/// estimator ignores further laps.
pub struct StintEstimator<'a> {
    filter: &'a DegradationFilter,
    cliff: &'a CliffConfig,
    stint_id: StintId,
    compound: Compound,
    phase: StintPhase,
    state: Option<KalmanState>,
    last_lap_number: u32,
    metrics: StintMetrics,
}

impl<'a> StintEstimator<'a> {
    pub fn new(
        filter: &'a DegradationFilter,
        cliff: &'a CliffConfig,
        stint_id: StintId,
        compound: Compound,
    ) -> Self {
        Self {
            filter,
            cliff,
            stint_id,
            compound,
            phase: StintPhase::Uninitialized,
            state: None,
            last_lap_number: 0,
            metrics: StintMetrics::default(),
        }
    }

    pub fn phase(&self) -> StintPhase {
        self.phase
    }

    /// Fold one lap in. Returns `None` once the estimator is closed.
    pub fn step(&mut self, lap: &LapRecord) -> Option<FilteredLap> {
        let z = lap.degradation_delta;
        let filtered = match self.phase {
            StintPhase::Closed => return None,
            StintPhase::Uninitialized => {
                // First lap seeds the state; no correction is possible yet.
                let state = self.filter.initialize(z);
                self.phase = StintPhase::Tracking;
                self.state = Some(state);
                self.make_output(lap, &state, 0.0, false)
            }
            StintPhase::Tracking => {
                let prev = self.state.as_ref()?;
                // Upstream clean-lap filtering can drop laps, so gaps larger
                // than one lap are real and must inflate the covariance.
                let dt = lap.lap_number.saturating_sub(self.last_lap_number).max(1);
                let predicted = self.filter.predict(prev, dt);
                let out = self.filter.update(&predicted, z);
                self.state = Some(out.state);
                self.make_output(lap, &out.state, out.residual, out.is_outlier)
            }
        };
        self.last_lap_number = lap.lap_number;
        self.metrics.accumulate(&filtered);
        Some(filtered)
    }

    fn make_output(
        &self,
        lap: &LapRecord,
        state: &KalmanState,
        residual: f64,
        is_outlier: bool,
    ) -> FilteredLap {
        FilteredLap {
            lap_number: lap.lap_number,
            stint_id: self.stint_id,
            raw_delta: lap.degradation_delta,
            estimated_level: state.level(),
            estimated_rate: state.rate(),
            residual,
            is_outlier,
            cliff_probability: self.cliff.probability(state.level()),
        }
    }

    /// End the stint and emit its summary. The state is discarded here: the
    /// next stint runs on a different tyre set and starts from scratch.
    pub fn close(&mut self) -> StintSummary {
        self.phase = StintPhase::Closed;
        let (final_level, final_rate) = match self.state.take() {
            Some(state) => (state.level(), state.rate()),
            None => (0.0, 0.0),
        };
        StintSummary {
            stint_id: self.stint_id,
            compound: self.compound,
            laps: self.metrics.n_laps,
            outliers: self.metrics.n_outliers,
            final_level,
            final_rate,
            residual_rmse: self.metrics.residual_rmse(),
        }
    }
}

// ---------------------------------------------------------------------------
// Run output
// ---------------------------------------------------------------------------

/// Everything a run produced. Partial results survive an ordering fault:
/// `laps` and `stints` cover every stint completed before `failure`.
#[derive(Clone, Debug)]
pub struct RunReport {
    /// One output per processed input lap, in original feed order
    pub laps: Vec<FilteredLap>,
    /// Per-stint summaries, in feed order
    pub stints: Vec<StintSummary>,
    /// Ordering fault that cut the feed short, if any
    pub failure: Option<OutOfOrderError>,
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Feeds segmented laps through per-stint filters and collects the results.
#[derive(Debug)]
pub struct StintRunner {
    config: RunnerConfig,
    base: DegradationFilter,
    by_compound: HashMap<Compound, DegradationFilter>,
}

impl StintRunner {
    /// Build a runner, validating every filter config up front.
    pub fn new(config: RunnerConfig) -> Result<Self, ConfigError> {
        config.cliff.validate()?;
        let base = DegradationFilter::new(config.filter)?;
        let mut by_compound = HashMap::new();
        for (&compound, &cfg) in &config.compound_overrides {
            by_compound.insert(compound, DegradationFilter::new(cfg)?);
        }
        Ok(Self {
            config,
            base,
            by_compound,
        })
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Filter config in effect for a compound (override or base).
    fn filter_for(&self, compound: Compound) -> &DegradationFilter {
        self.by_compound.get(&compound).unwrap_or(&self.base)
    }

    /// Process a full ordered lap feed.
    ///
    /// Stints are filtered in parallel (they are independent by
    /// construction) and the output is reassembled in feed order before
    /// returning: output ordering is part of the external contract.
    pub fn run(&self, laps: impl IntoIterator<Item = LapRecord>) -> RunReport {
        let mut groups: Vec<Stint> = Vec::new();
        let mut failure = None;
        for group in segment(laps) {
            match group {
                Ok(stint) => groups.push(stint),
                Err(err) => {
                    tracing::warn!(%err, "lap feed broke ordering; keeping completed stints");
                    failure = Some(err);
                    break;
                }
            }
        }

        let per_stint: Vec<(Vec<FilteredLap>, StintSummary)> = groups
            .par_iter()
            .map(|stint| self.run_stint(stint))
            .collect();

        let mut laps_out = Vec::with_capacity(per_stint.iter().map(|(l, _)| l.len()).sum());
        let mut stints = Vec::with_capacity(per_stint.len());
        for (filtered, summary) in per_stint {
            laps_out.extend(filtered);
            stints.push(summary);
        }

        RunReport {
            laps: laps_out,
            stints,
            failure,
        }
    }

    /// Run one stint through a freshly initialized filter.
    fn run_stint(&self, stint: &Stint) -> (Vec<FilteredLap>, StintSummary) {
        let filter = self.filter_for(stint.compound);
        let mut estimator =
            StintEstimator::new(filter, &self.config.cliff, stint.id, stint.compound);

        let mut filtered = Vec::with_capacity(stint.len());
        for lap in &stint.laps {
            if let Some(out) = estimator.step(lap) {
                filtered.push(out);
            }
        }
        let summary = estimator.close();
        tracing::debug!(
            stint = %summary.stint_id,
            compound = %summary.compound,
            laps = summary.laps,
            outliers = summary.outliers,
            final_level = summary.final_level,
            final_rate = summary.final_rate,
            "stint filtered"
        );
        (filtered, summary)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
