//! Shared validation helpers and model constants.

use crate::error::{ModelError, ModelResult};
use rv_core::numeric::ensure_finite;

/// Number of identical wheel/reducer/motor drive units on the rover.
pub const WHEEL_COUNT: usize = 6;

/// Terrain angles outside ±75° are rejected.
pub const SLOPE_LIMIT_DEG: f64 = 75.0;

/// Gain applied to rover velocity inside the erf that smooths the
/// rolling-resistance direction.
pub const ROLLING_SIGN_GAIN: f64 = 40.0;

/// Ensure a value is finite, returning ModelError if not.
pub fn check_finite(value: f64, what: &'static str) -> ModelResult<f64> {
    ensure_finite(value, what).map_err(|_| ModelError::InvalidArg { what })
}

/// Finite and strictly positive.
pub fn check_positive(value: f64, what: &'static str) -> ModelResult<f64> {
    check_finite(value, what)?;
    if value <= 0.0 {
        return Err(ModelError::InvalidArg { what });
    }
    Ok(value)
}

/// Finite and not negative.
pub fn check_non_negative(value: f64, what: &'static str) -> ModelResult<f64> {
    check_finite(value, what)?;
    if value < 0.0 {
        return Err(ModelError::InvalidArg { what });
    }
    Ok(value)
}

/// Terrain angle in degrees within [-75, 75].
pub fn check_slope(slope_deg: f64) -> ModelResult<f64> {
    if !(-SLOPE_LIMIT_DEG..=SLOPE_LIMIT_DEG).contains(&slope_deg) {
        return Err(ModelError::OutOfRange {
            what: "terrain angle [deg]",
            value: slope_deg,
            min: -SLOPE_LIMIT_DEG,
            max: SLOPE_LIMIT_DEG,
        });
    }
    Ok(slope_deg)
}

/// Coefficient of rolling resistance, positive scalar.
pub fn check_crr(crr: f64) -> ModelResult<f64> {
    check_positive(crr, "Crr must be a positive scalar")
}
