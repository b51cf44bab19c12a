//! End-to-end properties of the estimator over whole lap feeds.

use approx::assert_abs_diff_eq;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use stint_core::{
    Compound, DegradationFilter, FilterConfig, FilteredLap, LapRecord, RunnerConfig, StintId,
    StintRunner,
};

fn lap(lap_number: u32, stint: u32, delta: f64) -> LapRecord {
    LapRecord {
        lap_number,
        stint_id: StintId(stint),
        compound: Compound::Medium,
        tyre_life: lap_number,
        track_temp: 30.0,
        lap_time_sec: 104.0 + delta,
        degradation_delta: delta,
    }
}

fn default_runner() -> StintRunner {
    StintRunner::new(RunnerConfig::default()).unwrap()
}

#[test]
fn single_lap_stint_echoes_the_measurement() {
    let report = default_runner().run(vec![lap(12, 4, 0.27)]);
    assert_eq!(report.laps.len(), 1);
    assert_abs_diff_eq!(report.laps[0].estimated_level, 0.27);
    assert!(!report.laps[0].is_outlier);
}

#[test]
fn constant_measurement_converges_to_it() {
    let v = 0.30;
    let laps: Vec<_> = (1..=20).map(|i| lap(i, 1, v)).collect();
    let report = default_runner().run(laps);

    let mut prev_err = f64::INFINITY;
    for out in &report.laps {
        let err = (out.estimated_level - v).abs();
        assert!(err <= prev_err + 1e-12, "level error must not grow");
        prev_err = err;
    }
    let last = report.laps.last().unwrap();
    assert_abs_diff_eq!(last.estimated_level, v, epsilon = 1e-6);
    assert_abs_diff_eq!(last.estimated_rate, 0.0, epsilon = 1e-6);
}

#[test]
fn linear_wear_recovers_the_true_rate() {
    let true_rate = 0.2;
    let laps: Vec<_> = (1..=25)
        .map(|i| lap(i, 1, true_rate * (i - 1) as f64))
        .collect();
    let report = default_runner().run(laps);
    let last = report.laps.last().unwrap();
    assert_abs_diff_eq!(last.estimated_rate, true_rate, epsilon = 0.01);
    assert_abs_diff_eq!(last.estimated_level, true_rate * 24.0, epsilon = 0.1);
}

#[test]
fn extreme_outlier_is_gated_and_damped() {
    let v = 0.2;
    let mut deltas = vec![v; 10];
    deltas[4] = v + 100.0;
    let laps: Vec<_> = deltas
        .iter()
        .enumerate()
        .map(|(i, &d)| lap(i as u32 + 1, 1, d))
        .collect();
    let report = default_runner().run(laps);

    let spike = &report.laps[4];
    assert!(spike.is_outlier, "the inserted spike must be flagged");

    // An unweighted average over the first five laps lands at v + 20; the
    // down-weighted update must stay much closer to v than that.
    let avg_dev = (v * 4.0 + v + 100.0) / 5.0 - v;
    let filter_dev = (spike.estimated_level - v).abs();
    assert!(
        filter_dev < avg_dev,
        "gated update moved level by {filter_dev}, average would move {avg_dev}"
    );
    assert!(report.stints[0].outliers >= 1);
}

#[test]
fn reruns_are_bit_identical() {
    let laps: Vec<_> = (1..=15)
        .map(|i| lap(i, 1, 0.05 * i as f64 + if i % 3 == 0 { 0.07 } else { 0.0 }))
        .collect();
    let a = default_runner().run(laps.clone());
    let b = default_runner().run(laps);
    assert_eq!(a.laps.len(), b.laps.len());
    for (x, y) in a.laps.iter().zip(&b.laps) {
        assert_eq!(x.estimated_level.to_bits(), y.estimated_level.to_bits());
        assert_eq!(x.estimated_rate.to_bits(), y.estimated_rate.to_bits());
        assert_eq!(x.residual.to_bits(), y.residual.to_bits());
        assert_eq!(x.is_outlier, y.is_outlier);
    }
}

#[test]
fn stints_are_order_independent() {
    let stint_a: Vec<_> = (1..=8).map(|i| lap(i, 1, 0.08 * i as f64)).collect();
    let stint_b: Vec<_> = (9..=14).map(|i| lap(i, 2, 0.03 * (i - 8) as f64)).collect();

    let combined = default_runner().run(stint_a.iter().chain(&stint_b).copied());
    let alone_a = default_runner().run(stint_a.clone());
    let alone_b = default_runner().run(stint_b.clone());

    let per_stint = |report: &[FilteredLap], id: StintId| -> Vec<(u64, u64)> {
        report
            .iter()
            .filter(|l| l.stint_id == id)
            .map(|l| (l.estimated_level.to_bits(), l.estimated_rate.to_bits()))
            .collect()
    };

    assert_eq!(
        per_stint(&combined.laps, StintId(1)),
        per_stint(&alone_a.laps, StintId(1))
    );
    assert_eq!(
        per_stint(&combined.laps, StintId(2)),
        per_stint(&alone_b.laps, StintId(2))
    );
}

#[test]
fn covariance_stays_symmetric_psd_under_fuzz() {
    let filter = DegradationFilter::new(FilterConfig::default()).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(0xD6A5);

    for _ in 0..1000 {
        let mut state = filter.initialize(rng.gen_range(0.0..1.0));
        for _ in 0..20 {
            let dt = rng.gen_range(1..4);
            let predicted = filter.predict(&state, dt);
            // Mostly plausible deltas, occasionally a wild spike.
            let z = if rng.gen_bool(0.05) {
                rng.gen_range(20.0..80.0)
            } else {
                rng.gen_range(0.0..2.0)
            };
            let out = filter.update(&predicted, z);
            state = out.state;

            assert_abs_diff_eq!(state.p[(0, 1)], state.p[(1, 0)], epsilon = 1e-12);
            assert!(state.p[(0, 0)] >= 0.0, "level variance went negative");
            assert!(state.p[(1, 1)] >= 0.0, "rate variance went negative");
            assert!(state.level().is_finite() && state.rate().is_finite());
        }
    }
}

#[test]
fn documented_ramp_scenario() {
    // Four laps of steadily growing degradation with the documented tuning:
    // the rate estimate must climb toward the true ~0.2 s/lap without any
    // lap being flagged.
    let cfg = RunnerConfig {
        filter: FilterConfig {
            process_noise_level: 0.01,
            process_noise_rate: 0.01,
            measurement_noise: 0.05,
            gate_threshold: 3.0,
            ..FilterConfig::default()
        },
        ..RunnerConfig::default()
    };
    let runner = StintRunner::new(cfg).unwrap();
    let deltas = [0.10, 0.35, 0.52, 0.70];
    let laps: Vec<_> = deltas
        .iter()
        .enumerate()
        .map(|(i, &d)| lap(i as u32 + 1, 1, d))
        .collect();
    let report = runner.run(laps);

    assert!(report.laps.iter().all(|l| !l.is_outlier));
    let rates: Vec<f64> = report.laps.iter().map(|l| l.estimated_rate).collect();
    for w in rates.windows(2) {
        assert!(w[1] > w[0] - 1e-12, "rate estimate should keep climbing");
    }
    let final_rate = *rates.last().unwrap();
    assert!(
        (0.15..0.25).contains(&final_rate),
        "final rate {final_rate} should be near the true 0.2 s/lap"
    );
}
