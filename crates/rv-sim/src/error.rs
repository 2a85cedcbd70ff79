//! Error types for simulation operations.

use rv_model::ModelError;
use rv_solver::SolverError;
use thiserror::Error;

/// Errors encountered while setting up or integrating a run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Integration failed: {what}")]
    IntegrationFailed { what: String },

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    /// True when the run was rejected because of its inputs.
    pub fn is_invalid_argument(&self) -> bool {
        match self {
            Self::InvalidArg { .. } | Self::Model(_) => true,
            Self::Solver(e) => e.is_invalid_argument(),
            Self::IntegrationFailed { .. } => false,
        }
    }

    /// Newton failures that a smaller step may cure.
    pub(crate) fn is_recoverable_by_step_reduction(&self) -> bool {
        matches!(
            self,
            Self::Solver(SolverError::ConvergenceFailed { .. } | SolverError::Numeric { .. })
        )
    }
}
