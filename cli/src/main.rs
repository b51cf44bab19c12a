//! `tyretrend` CLI: filter recorded lap feeds, run synthetic scenarios.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use sim::scenarios::{RaceScenario, ScenarioKind};
use sim::stint_gen::SessionGenerator;
use std::path::PathBuf;
use stint_core::{CliffConfig, FilterConfig, RunReport, RunnerConfig, StintRunner};

#[derive(Parser)]
#[command(name = "tyretrend", about = "Tyre degradation estimator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Overrides for the estimator tuning; unset flags keep the documented
/// defaults from `FilterConfig::default()` / `CliffConfig::default()`.
#[derive(Args)]
struct TuningArgs {
    /// Process noise on the degradation level (s² per lap)
    #[arg(long)]
    process_noise_level: Option<f64>,
    /// Process noise on the wear rate ((s/lap)² per lap)
    #[arg(long)]
    process_noise_rate: Option<f64>,
    /// Measurement noise variance R (s²)
    #[arg(long)]
    measurement_noise: Option<f64>,
    /// Outlier gate threshold in standard deviations
    #[arg(long)]
    gate_threshold: Option<f64>,
    /// R inflation factor for gated laps
    #[arg(long)]
    outlier_penalty_factor: Option<f64>,
    /// Initial covariance prior on both state components
    #[arg(long)]
    initial_covariance_prior: Option<f64>,
    /// Degradation level (s) at the middle of the cliff
    #[arg(long)]
    cliff_threshold: Option<f64>,
    /// Steepness of the cliff transition
    #[arg(long)]
    cliff_steepness: Option<f64>,
}

impl TuningArgs {
    fn runner_config(&self) -> RunnerConfig {
        let defaults = FilterConfig::default();
        let cliff_defaults = CliffConfig::default();
        RunnerConfig {
            filter: FilterConfig {
                process_noise_level: self.process_noise_level.unwrap_or(defaults.process_noise_level),
                process_noise_rate: self.process_noise_rate.unwrap_or(defaults.process_noise_rate),
                measurement_noise: self.measurement_noise.unwrap_or(defaults.measurement_noise),
                gate_threshold: self.gate_threshold.unwrap_or(defaults.gate_threshold),
                outlier_penalty_factor: self
                    .outlier_penalty_factor
                    .unwrap_or(defaults.outlier_penalty_factor),
                initial_covariance_prior: self
                    .initial_covariance_prior
                    .unwrap_or(defaults.initial_covariance_prior),
            },
            cliff: CliffConfig {
                threshold: self.cliff_threshold.unwrap_or(cliff_defaults.threshold),
                steepness: self.cliff_steepness.unwrap_or(cliff_defaults.steepness),
            },
            ..RunnerConfig::default()
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Filter a recorded lap feed CSV and report per-stint degradation.
    Process {
        /// Input CSV with the extraction-step header
        input: PathBuf,
        /// Write the filtered series as CSV
        #[arg(long)]
        output: Option<PathBuf>,
        /// Write the filtered series as pretty JSON
        #[arg(long)]
        json: Option<PathBuf>,
        /// Write run metrics as JSON
        #[arg(long)]
        metrics: Option<PathBuf>,
        #[command(flatten)]
        tuning: TuningArgs,
    },
    /// Generate a synthetic race, filter it, and print the lap table.
    Synth {
        #[arg(value_enum)]
        scenario: ScenarioKind,
        /// Random seed for reproducibility
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Also save the generated feed CSV
        #[arg(long)]
        save_feed: Option<PathBuf>,
        /// Write the filtered series as CSV
        #[arg(long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        tuning: TuningArgs,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            input,
            output,
            json,
            metrics,
            tuning,
        } => {
            run_process(
                &input,
                output.as_deref(),
                json.as_deref(),
                metrics.as_deref(),
                &tuning,
            )?;
        }
        Commands::Synth {
            scenario,
            seed,
            save_feed,
            output,
            tuning,
        } => {
            run_synth(scenario, seed, save_feed.as_deref(), output.as_deref(), &tuning)?;
        }
    }

    Ok(())
}

fn run_process(
    input: &std::path::Path,
    output: Option<&std::path::Path>,
    json: Option<&std::path::Path>,
    metrics: Option<&std::path::Path>,
    tuning: &TuningArgs,
) -> Result<()> {
    let laps = telemetry::read_laps(input)?;
    tracing::info!(laps = laps.len(), input = %input.display(), "feed loaded");

    let runner = StintRunner::new(tuning.runner_config())?;
    let start = std::time::Instant::now();
    let report = runner.run(laps);
    let elapsed = start.elapsed();

    print_summary(&report);
    println!(
        "Done: {} laps, {} stints, elapsed={:.2}ms",
        report.laps.len(),
        report.stints.len(),
        elapsed.as_secs_f64() * 1000.0
    );
    if let Some(err) = &report.failure {
        println!("WARNING: feed cut short: {err}");
    }

    if let Some(path) = output {
        telemetry::write_filtered_csv(path, &report.laps)?;
        println!("Filtered series saved to {}", path.display());
    }
    if let Some(path) = json {
        telemetry::write_filtered_json(path, &report.laps)?;
        println!("Filtered series saved to {}", path.display());
    }
    if let Some(path) = metrics {
        write_metrics(path, &report, elapsed.as_secs_f64())?;
        println!("Metrics saved to {}", path.display());
    }

    Ok(())
}

fn run_synth(
    kind: ScenarioKind,
    seed: u64,
    save_feed: Option<&std::path::Path>,
    output: Option<&std::path::Path>,
    tuning: &TuningArgs,
) -> Result<()> {
    let scenario = RaceScenario::build(kind);
    let laps = SessionGenerator::new(seed).generate_session(&scenario.profiles);
    println!(
        "Scenario '{}' (seed={}): {} laps over {} stints",
        scenario.name,
        seed,
        laps.len(),
        scenario.profiles.len()
    );

    if let Some(path) = save_feed {
        telemetry::write_laps_csv(path, &laps)?;
        println!("Feed saved to {}", path.display());
    }

    let runner = StintRunner::new(tuning.runner_config())?;
    let report = runner.run(laps);

    println!("Lap   Stint  RawDelta  Smoothed  Rate    Cliff%  Gated");
    println!("-------------------------------------------------------");
    for lap in &report.laps {
        println!(
            "{:<5} {:<6} {:<9.3} {:<9.3} {:<7.3} {:<7.1} {}",
            lap.lap_number,
            lap.stint_id.0,
            lap.raw_delta,
            lap.estimated_level,
            lap.estimated_rate,
            lap.cliff_probability * 100.0,
            if lap.is_outlier { "*" } else { "" }
        );
    }
    print_summary(&report);

    if let Some(path) = output {
        telemetry::write_filtered_csv(path, &report.laps)?;
        println!("Filtered series saved to {}", path.display());
    }

    Ok(())
}

fn print_summary(report: &RunReport) {
    for s in &report.stints {
        println!(
            "{} ({}): {} laps, {} gated, final level {:.3}s, rate {:.3}s/lap, residual rmse {:.3}s",
            s.stint_id, s.compound, s.laps, s.outliers, s.final_level, s.final_rate, s.residual_rmse
        );
    }
}

fn write_metrics(path: &std::path::Path, report: &RunReport, elapsed_s: f64) -> Result<()> {
    let json = serde_json::json!({
        "laps": report.laps.len(),
        "stints": report.stints.len(),
        "gated_laps": report.stints.iter().map(|s| s.outliers).sum::<u64>(),
        "elapsed_s": elapsed_s,
        "failure": report.failure.as_ref().map(|e| e.to_string()),
    });
    std::fs::write(path, serde_json::to_string_pretty(&json)?)?;
    Ok(())
}
