//! Error types for vehicle model operations.

use rv_core::error::RvError;
use thiserror::Error;

/// Errors raised by the vehicle, terrain and force model.
///
/// Every variant is a contract violation by the caller (an invalid
/// argument); none of them is recovered locally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Out of range: {what} = {value} (allowed {min}..={max})")]
    OutOfRange {
        what: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Shape mismatch: {what} (left={left}, right={right})")]
    ShapeMismatch {
        what: &'static str,
        left: usize,
        right: usize,
    },

    #[error("Not supported: {what}")]
    NotSupported { what: String },
}

pub type ModelResult<T> = Result<T, ModelError>;

impl From<RvError> for ModelError {
    fn from(e: RvError) -> Self {
        match e {
            RvError::NonFinite { what, .. } => ModelError::InvalidArg { what },
            RvError::InvalidArg { what } => ModelError::InvalidArg { what },
            RvError::LengthMismatch { what, left, right } => {
                ModelError::ShapeMismatch { what, left, right }
            }
            RvError::Invariant { what } => ModelError::InvalidArg { what },
        }
    }
}
