//! Scenario files: a unit configuration, chemistry, initial fouling and a
//! list of constant-input segments.

use crate::error::{CliError, CliResult};
use serde::{Deserialize, Serialize};
use sg_chemistry::{ChemistryLevels, DesignChemistry};
use sg_fouling::FoulingModel;
use sg_unit::{StepInputs, StepReport, SteamGeneratorConfig, SteamGeneratorUnit};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub const SCENARIO_VERSION: u32 = 1;

/// Deposits present before the first step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialFouling {
    /// Uniform TSP deposit (mm).
    pub tsp_deposit_mm: f64,
    /// Tube interior scale (mm).
    pub tube_scale_mm: f64,
}

/// A run of `steps` identical steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub steps: u64,
    #[serde(default)]
    pub inputs: StepInputs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub version: u32,
    #[serde(default)]
    pub config: SteamGeneratorConfig,
    #[serde(default)]
    pub chemistry: ChemistryLevels,
    #[serde(default)]
    pub initial: InitialFouling,
    pub segments: Vec<Segment>,
}

/// One sampled report.
#[derive(Debug, Clone, Serialize)]
pub struct Sample {
    pub step: u64,
    pub time_s: f64,
    pub values: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    pub samples: Vec<Sample>,
    pub final_state: BTreeMap<String, f64>,
}

impl Scenario {
    pub fn from_yaml(text: &str) -> CliResult<Self> {
        let scenario: Scenario = serde_yaml::from_str(text)?;
        if scenario.version != SCENARIO_VERSION {
            return Err(CliError::ScenarioVersion {
                found: scenario.version,
                supported: SCENARIO_VERSION,
            });
        }
        Ok(scenario)
    }

    pub fn load(path: &Path) -> CliResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    /// Build the unit with its own design-chemistry provider and apply the
    /// initial fouling.
    pub fn build_unit(&self) -> CliResult<SteamGeneratorUnit> {
        let chemistry = Arc::new(DesignChemistry::new(self.chemistry));
        let mut unit = SteamGeneratorUnit::new(self.config.clone(), chemistry)?;
        if self.initial.tsp_deposit_mm > 0.0 {
            unit.tsp_mut().seed_deposits(self.initial.tsp_deposit_mm);
        }
        if self.initial.tube_scale_mm > 0.0 {
            unit.tube_interior_mut().set_thickness(self.initial.tube_scale_mm);
        }
        Ok(unit)
    }

    pub fn total_steps(&self) -> u64 {
        self.segments.iter().map(|s| s.steps).sum()
    }

    /// Step `unit` through every segment, sampling every `every` steps and
    /// always at the last step.
    pub fn run(&self, unit: &mut SteamGeneratorUnit, every: u64) -> RunOutput {
        let total = self.total_steps();
        let mut samples = Vec::new();
        let mut step = 0;
        let mut time_s = 0.0;
        for (index, segment) in self.segments.iter().enumerate() {
            info!(segment = index, steps = segment.steps, "running segment");
            for _ in 0..segment.steps {
                let report: StepReport = unit.step(&segment.inputs);
                step += 1;
                time_s += segment.inputs.dt_s.max(0.0);
                if (every > 0 && step % every == 0) || step == total {
                    samples.push(Sample {
                        step,
                        time_s,
                        values: report.to_map(),
                    });
                }
            }
        }
        info!(
            steps = step,
            tsp_fouling = unit.tsp().fouling_fraction(),
            tube_scale_mm = unit.tube_interior().thickness_mm(),
            "scenario complete"
        );
        RunOutput {
            samples,
            final_state: unit.state_map(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
version: 1
chemistry:
  iron_ppm: 0.2
initial:
  tsp_deposit_mm: 1.5
  tube_scale_mm: 0.2
segments:
  - steps: 3
    inputs:
      dt_s: 60.0
  - steps: 2
    inputs:
      feedwater_flow: 0.0
"#;

    #[test]
    fn parses_with_defaults() {
        let scenario = Scenario::from_yaml(SCENARIO).unwrap();
        assert_eq!(scenario.total_steps(), 5);
        assert_eq!(scenario.chemistry.iron_ppm, 0.2);
        assert_eq!(scenario.chemistry.ph, ChemistryLevels::default().ph);
        assert_eq!(scenario.config, SteamGeneratorConfig::default());
        assert_eq!(scenario.segments[1].inputs.primary_flow, 5700.0);
    }

    #[test]
    fn rejects_other_versions() {
        let err = Scenario::from_yaml("version: 3\nsegments: []\n").unwrap_err();
        assert!(matches!(err, CliError::ScenarioVersion { found: 3, .. }));
    }

    #[test]
    fn run_samples_and_finishes() {
        let scenario = Scenario::from_yaml(SCENARIO).unwrap();
        let mut unit = scenario.build_unit().unwrap();
        assert!((unit.tsp().fouling_fraction() - 0.3).abs() < 1e-9);

        let out = scenario.run(&mut unit, 2);
        let steps: Vec<u64> = out.samples.iter().map(|s| s.step).collect();
        assert_eq!(steps, vec![2, 4, 5]);
        assert!((out.samples[2].time_s - 182.0).abs() < 1e-9);
        assert!(out.final_state.contains_key("tsp_fouling_fraction"));
    }

    #[test]
    fn bundled_demo_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/design_week.yaml");
        let scenario = Scenario::load(&path).unwrap();
        assert_eq!(scenario.total_steps(), 172);
        assert!(scenario.build_unit().is_ok());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Scenario::load(Path::new("no/such/scenario.yaml")).unwrap_err();
        assert!(matches!(err, CliError::FileRead { .. }));
    }
}
