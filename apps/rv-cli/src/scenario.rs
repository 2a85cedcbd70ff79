//! YAML scenario loading.
//!
//! Every section is optional; a missing section falls back to the reference
//! rover, Mars, the reference experiment and the default integrator options.

use crate::error::{CliError, CliResult};
use rv_model::{Planet, Rover, reference_rover};
use rv_sim::{EndConditions, Experiment, SolverOptions};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioFile {
    pub vehicle: Option<Rover>,
    pub planet: Option<Planet>,
    pub experiment: Option<Experiment>,
    pub end_conditions: Option<EndConditions>,
    pub solver: Option<SolverOptions>,
}

/// Fully resolved inputs of one CLI invocation.
#[derive(Clone, Debug)]
pub struct Scenario {
    pub rover: Rover,
    pub planet: Planet,
    pub experiment: Experiment,
    pub end_conditions: EndConditions,
    pub solver: SolverOptions,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::from(ScenarioFile::default())
    }
}

impl From<ScenarioFile> for Scenario {
    fn from(file: ScenarioFile) -> Self {
        Self {
            rover: file.vehicle.unwrap_or_else(reference_rover),
            planet: file.planet.unwrap_or_else(Planet::mars),
            experiment: file.experiment.unwrap_or_else(Experiment::reference),
            end_conditions: file.end_conditions.unwrap_or_else(EndConditions::reference),
            solver: file.solver.unwrap_or_default(),
        }
    }
}

impl Scenario {
    pub fn parse(yaml: &str) -> CliResult<Self> {
        let file: ScenarioFile = serde_yaml::from_str(yaml)?;
        let scenario = Self::from(file);
        scenario.validate()?;
        Ok(scenario)
    }

    /// Load from `path`, or the reference scenario when no path is given.
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        debug!(path = %path.display(), "loading scenario");
        let content = std::fs::read_to_string(path).map_err(|e| CliError::ScenarioRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Rover and planet only; experiment inputs are checked by the commands
    /// that use them.
    pub fn validate(&self) -> CliResult<()> {
        self.rover.validate()?;
        self.planet.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_reference_scenario() {
        let scenario = Scenario::parse("{}").unwrap();
        assert_eq!(scenario.rover, reference_rover());
        assert_eq!(scenario.experiment, Experiment::reference());
        assert_eq!(scenario.end_conditions, EndConditions::reference());
        assert_eq!(scenario.solver, SolverOptions::default());
    }

    #[test]
    fn overrides_sections() {
        let yaml = r#"
planet:
  gravity: 9.81
end_conditions:
  max_distance: 50.0
  max_time: 100.0
  min_velocity: 0.0
solver:
  rtol: 1.0e-6
"#;
        let scenario = Scenario::parse(yaml).unwrap();
        assert_eq!(scenario.planet.g(), 9.81);
        assert_eq!(scenario.end_conditions.max_distance, 50.0);
        assert_eq!(scenario.solver.rtol, 1e-6);
        assert_eq!(scenario.solver.atol, SolverOptions::default().atol);
    }

    #[test]
    fn rejects_unknown_sections_and_bad_vehicles() {
        assert!(matches!(
            Scenario::parse("rover: {}"),
            Err(CliError::ScenarioParse(_))
        ));

        let mut file = ScenarioFile::default();
        let mut rover = reference_rover();
        rover.wheel_assembly.wheel.radius = rv_core::units::m(-0.3);
        file.vehicle = Some(rover);
        let yaml = serde_yaml::to_string(&file).unwrap();
        assert!(matches!(Scenario::parse(&yaml), Err(CliError::Model(_))));
    }

    #[test]
    fn bundled_reference_file_matches_defaults() {
        let scenario = Scenario::parse(include_str!("../scenarios/reference.yaml")).unwrap();
        assert_eq!(scenario.rover, reference_rover());
        assert_eq!(scenario.experiment, Experiment::reference());
    }
}
