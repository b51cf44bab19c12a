//! Scenario definitions.
//!
//! Each scenario is a named set of stint profiles approximating a race
//! strategy. All scenarios are deterministic given the same seed.

use crate::stint_gen::StintProfile;
use serde::{Deserialize, Serialize};
use stint_core::Compound;

/// Which pre-defined scenario to generate.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
pub enum ScenarioKind {
    /// Two medium stints, mild noise, no surprises
    OneStop,
    /// Soft / medium / hard with rising wear rates
    TwoStop,
    /// A long stint that runs past its cliff
    Cliff,
    /// Heavy traffic: frequent multi-second outlier laps
    Traffic,
}

/// A fully configured synthetic race.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RaceScenario {
    pub name: String,
    pub profiles: Vec<StintProfile>,
}

impl RaceScenario {
    /// Build the named scenario.
    pub fn build(kind: ScenarioKind) -> Self {
        match kind {
            ScenarioKind::OneStop => Self::one_stop(),
            ScenarioKind::TwoStop => Self::two_stop(),
            ScenarioKind::Cliff => Self::cliff(),
            ScenarioKind::Traffic => Self::traffic(),
        }
    }

    fn one_stop() -> Self {
        Self {
            name: "one-stop".into(),
            profiles: vec![
                StintProfile::steady(1, 26),
                StintProfile {
                    wear_rate: 0.05,
                    ..StintProfile::steady(2, 24)
                },
            ],
        }
    }

    fn two_stop() -> Self {
        Self {
            name: "two-stop".into(),
            profiles: vec![
                StintProfile {
                    compound: Compound::Soft,
                    wear_rate: 0.11,
                    ..StintProfile::steady(1, 15)
                },
                StintProfile {
                    wear_rate: 0.07,
                    ..StintProfile::steady(2, 20)
                },
                StintProfile {
                    compound: Compound::Hard,
                    base_lap_time: 104.6,
                    wear_rate: 0.04,
                    ..StintProfile::steady(3, 18)
                },
            ],
        }
    }

    fn cliff() -> Self {
        Self {
            name: "cliff".into(),
            profiles: vec![StintProfile {
                compound: Compound::Soft,
                wear_rate: 0.09,
                cliff_onset: Some(18),
                cliff_rate: 0.08,
                ..StintProfile::steady(1, 28)
            }],
        }
    }

    fn traffic() -> Self {
        Self {
            name: "traffic".into(),
            profiles: vec![
                StintProfile {
                    outlier_prob: 0.15,
                    outlier_magnitude: 3.5,
                    ..StintProfile::steady(1, 22)
                },
                StintProfile {
                    outlier_prob: 0.15,
                    outlier_magnitude: 3.5,
                    compound: Compound::Hard,
                    wear_rate: 0.04,
                    ..StintProfile::steady(2, 25)
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stint_gen::SessionGenerator;

    #[test]
    fn every_scenario_builds_a_non_empty_feed() {
        for kind in [
            ScenarioKind::OneStop,
            ScenarioKind::TwoStop,
            ScenarioKind::Cliff,
            ScenarioKind::Traffic,
        ] {
            let scenario = RaceScenario::build(kind);
            let laps = SessionGenerator::new(42).generate_session(&scenario.profiles);
            assert!(!laps.is_empty(), "{} produced no laps", scenario.name);
        }
    }

    #[test]
    fn stint_ids_increase_across_a_scenario() {
        let scenario = RaceScenario::build(ScenarioKind::TwoStop);
        let ids: Vec<u32> = scenario.profiles.iter().map(|p| p.stint_id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
