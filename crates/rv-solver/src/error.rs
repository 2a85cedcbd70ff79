//! Error types for solver operations.

use rv_core::error::RvError;
use rv_model::ModelError;
use thiserror::Error;

/// Errors raised by the root finders and the Newton iteration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Convergence failed: {what}")]
    ConvergenceFailed { what: String },

    #[error("Numeric error: {what}")]
    Numeric { what: String },

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Core error: {0}")]
    Core(#[from] RvError),
}

pub type SolverResult<T> = Result<T, SolverError>;

impl SolverError {
    /// True when the caller supplied bad input, as opposed to a numerical
    /// failure during the solve.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArg { .. } | Self::Model(_) | Self::Core(_))
    }
}

impl From<SolverError> for RvError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::InvalidArg { what } => RvError::InvalidArg { what },
            SolverError::ConvergenceFailed { .. } => RvError::Invariant {
                what: "convergence",
            },
            SolverError::Numeric { .. } => RvError::Invariant { what: "numeric" },
            SolverError::Model(_) => RvError::InvalidArg { what: "model" },
            SolverError::Core(e) => e,
        }
    }
}
