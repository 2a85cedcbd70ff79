//! Error type for the command line front-end.

use rv_model::ModelError;
use rv_sim::SimError;
use rv_solver::SolverError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Failed to read scenario file: {path}")]
    ScenarioRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse scenario YAML: {0}")]
    ScenarioParse(#[from] serde_yaml::Error),

    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("Simulation error: {0}")]
    Sim(#[from] SimError),
}

pub type CliResult<T> = Result<T, CliError>;
