//! Mechanical power and battery energy.
//!
//! Mechanical power is that of a single drive unit. The six-unit factor
//! enters only when converting to electrical power drawn from the battery:
//!
//! ```text
//! P_mech = tau(omega) * omega
//! P_elec = 6 * P_mech / eta(tau)      (0 where eta <= 1e-9)
//! E      = trapz(P_elec, t)
//! ```

use crate::common::{WHEEL_COUNT, check_finite};
use crate::error::{ModelError, ModelResult};
use crate::operand::{Operand, Value};
use crate::vehicle::Rover;
use rv_core::CubicSpline;
use rv_core::numeric::trapezoid;

/// Efficiencies at or below this are treated as "motor draws nothing".
pub const MIN_EFFICIENCY: f64 = 1e-9;

/// Mechanical output power [W] of one motor at rover velocity `v` [m/s].
pub fn mechanical_power<'a>(v: impl Into<Operand<'a>>, rover: &Rover) -> ModelResult<Value> {
    rover.validate()?;
    v.into().map("velocity must be finite", |v| {
        let omega = rover.motor_speed(v);
        Ok(rover.motor().torque(omega) * omega)
    })
}

/// Battery power [W] drawn by all six motors at each velocity sample.
pub fn electrical_power(v: &[f64], rover: &Rover) -> ModelResult<Vec<f64>> {
    rover.validate()?;
    let efficiency = rover.motor().efficiency.spline()?;
    v.iter()
        .map(|&v| {
            let v = check_finite(v, "velocity must be finite")?;
            Ok(electrical_power_at(v, rover, &efficiency))
        })
        .collect()
}

fn electrical_power_at(v: f64, rover: &Rover, efficiency: &CubicSpline) -> f64 {
    let omega = rover.motor_speed(v);
    let tau = rover.motor().torque(omega);
    let eta = efficiency.eval(tau);
    if eta <= MIN_EFFICIENCY {
        return 0.0;
    }
    tau * omega / eta * WHEEL_COUNT as f64
}

/// Battery energy [J] consumed along a sampled velocity history.
///
/// Fewer than two samples, or samples spanning zero time, give exactly 0.
pub fn battery_energy(t: &[f64], v: &[f64], rover: &Rover) -> ModelResult<f64> {
    if t.len() != v.len() {
        return Err(ModelError::ShapeMismatch {
            what: "time/velocity samples",
            left: t.len(),
            right: v.len(),
        });
    }
    for &ti in t {
        check_finite(ti, "time sample must be finite")?;
    }
    if t.len() < 2 || t[t.len() - 1] == t[0] {
        return Ok(0.0);
    }
    let power = electrical_power(v, rover)?;
    Ok(trapezoid(&power, t)?)
}
