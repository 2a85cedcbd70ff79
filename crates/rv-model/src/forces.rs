//! Longitudinal force balance.
//!
//! ## Model
//!
//! ```text
//! F_drive   = 6 * tau(omega) * Ng / r
//! F_gravity = -m * g * sin(theta)
//! F_rolling = -erf(40 * v) * Crr * m * g * cos(theta),   v = omega / Ng * r
//! F_net     = F_drive + F_gravity + F_rolling
//! ```
//!
//! ## Sign conventions
//!
//! - Forces are positive along the direction of travel.
//! - Positive terrain angle is uphill, so gravity is negative there.
//! - Rolling resistance opposes velocity; erf smooths the sign through zero
//!   so that the net force stays continuous for root finding.

use crate::common::{ROLLING_SIGN_GAIN, WHEEL_COUNT, check_crr, check_slope};
use crate::error::ModelResult;
use crate::operand::{Operand, Value};
use crate::vehicle::{Motor, Planet, Rover};
use libm::erf;

/// Force kernels bound to one validated rover/planet pair.
///
/// Mass, gear ratio and wheel radius are read once at construction; the
/// borrow keeps the rover frozen for as long as the model exists.
#[derive(Clone, Copy, Debug)]
pub struct ForceModel<'a> {
    rover: &'a Rover,
    planet: &'a Planet,
    mass: f64,
    gear_ratio: f64,
    wheel_radius: f64,
}

impl<'a> ForceModel<'a> {
    pub fn new(rover: &'a Rover, planet: &'a Planet) -> ModelResult<Self> {
        rover.validate()?;
        planet.validate()?;
        Ok(Self {
            rover,
            planet,
            mass: rover.total_mass(),
            gear_ratio: rover.gear_ratio(),
            wheel_radius: rover.wheel_radius(),
        })
    }

    pub fn rover(&self) -> &'a Rover {
        self.rover
    }

    pub fn planet(&self) -> &'a Planet {
        self.planet
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Motor shaft speed [rad/s] for rover velocity `v` [m/s].
    pub fn motor_speed(&self, v: f64) -> f64 {
        v / self.wheel_radius * self.gear_ratio
    }

    /// Rover velocity [m/s] for motor shaft speed `omega` [rad/s].
    pub fn rover_speed(&self, omega: f64) -> f64 {
        omega / self.gear_ratio * self.wheel_radius
    }

    /// Combined tractive force of all six drive units [N].
    pub fn drive(&self, omega: f64) -> f64 {
        let tau = self.rover.motor().torque(omega);
        tau * self.gear_ratio / self.wheel_radius * WHEEL_COUNT as f64
    }

    /// Gravity component along the direction of travel [N].
    pub fn gravity(&self, slope_deg: f64) -> ModelResult<f64> {
        let theta = check_slope(slope_deg)?.to_radians();
        Ok(-self.mass * self.planet.g() * theta.sin())
    }

    /// Rolling resistance along the direction of travel [N].
    pub fn rolling(&self, omega: f64, slope_deg: f64, crr: f64) -> ModelResult<f64> {
        let theta = check_slope(slope_deg)?.to_radians();
        let crr = check_crr(crr)?;
        let normal = self.mass * self.planet.g() * theta.cos();
        let v = self.rover_speed(omega);
        Ok(-erf(ROLLING_SIGN_GAIN * v) * crr * normal)
    }

    /// Net force along the direction of travel [N].
    pub fn net(&self, omega: f64, slope_deg: f64, crr: f64) -> ModelResult<f64> {
        let gravity = self.gravity(slope_deg)?;
        let rolling = self.rolling(omega, slope_deg, crr)?;
        Ok(self.drive(omega) + gravity + rolling)
    }

    /// Net force expressed in rover velocity instead of motor speed.
    pub fn net_at_velocity(&self, v: f64, slope_deg: f64, crr: f64) -> ModelResult<f64> {
        self.net(self.motor_speed(v), slope_deg, crr)
    }
}

/// Motor shaft torque [N·m], elementwise.
pub fn motor_torque<'a>(omega: impl Into<Operand<'a>>, motor: &Motor) -> ModelResult<Value> {
    omega
        .into()
        .map("motor speed must be finite", |w| Ok(motor.torque(w)))
}

/// Motor shaft speed [rad/s] for rover velocity [m/s], elementwise.
pub fn motor_speed<'a>(v: impl Into<Operand<'a>>, rover: &Rover) -> ModelResult<Value> {
    rover.validate()?;
    v.into()
        .map("velocity must be finite", |v| Ok(rover.motor_speed(v)))
}

/// Drive force [N] of the whole rover, elementwise.
pub fn drive_force<'a>(omega: impl Into<Operand<'a>>, rover: &Rover) -> ModelResult<Value> {
    rover.validate()?;
    let ng = rover.gear_ratio();
    let r = rover.wheel_radius();
    omega.into().map("motor speed must be finite", |w| {
        Ok(rover.motor().torque(w) * ng / r * WHEEL_COUNT as f64)
    })
}

/// Gravity force [N] along the direction of travel, elementwise.
pub fn gravity_force<'a>(
    slope_deg: impl Into<Operand<'a>>,
    rover: &Rover,
    planet: &Planet,
) -> ModelResult<Value> {
    let model = ForceModel::new(rover, planet)?;
    slope_deg
        .into()
        .map("terrain angle must be finite", |theta| model.gravity(theta))
}

/// Rolling resistance force [N], broadcasting `omega` against `slope_deg`.
pub fn rolling_force<'a, 'b>(
    omega: impl Into<Operand<'a>>,
    slope_deg: impl Into<Operand<'b>>,
    rover: &Rover,
    planet: &Planet,
    crr: f64,
) -> ModelResult<Value> {
    let model = ForceModel::new(rover, planet)?;
    check_crr(crr)?;
    omega.into().zip_map(
        slope_deg.into(),
        ("motor speed must be finite", "terrain angle must be finite"),
        |w, theta| model.rolling(w, theta, crr),
    )
}

/// Net force [N], broadcasting `omega` against `slope_deg`.
pub fn net_force<'a, 'b>(
    omega: impl Into<Operand<'a>>,
    slope_deg: impl Into<Operand<'b>>,
    rover: &Rover,
    planet: &Planet,
    crr: f64,
) -> ModelResult<Value> {
    let model = ForceModel::new(rover, planet)?;
    check_crr(crr)?;
    omega.into().zip_map(
        slope_deg.into(),
        ("motor speed must be finite", "terrain angle must be finite"),
        |w, theta| model.net(w, theta, crr),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::reference::{mars, reference_rover};
    use rv_core::{Tolerances, nearly_equal};

    fn tol() -> Tolerances {
        Tolerances {
            abs: 1e-9,
            rel: 1e-12,
        }
    }

    #[test]
    fn stall_drive_force() {
        let rover = reference_rover();
        let f = drive_force(0.0, &rover).unwrap().as_scalar().unwrap();
        let expected = 170.0 * (0.07_f64 / 0.04).powi(2) / 0.30 * 6.0;
        assert!(nearly_equal(f, expected, tol()));
    }

    #[test]
    fn gravity_opposes_uphill_motion() {
        let rover = reference_rover();
        let planet = mars();
        let up = gravity_force(10.0, &rover, &planet).unwrap().as_scalar().unwrap();
        let down = gravity_force(-10.0, &rover, &planet).unwrap().as_scalar().unwrap();
        assert!(up < 0.0);
        assert!(nearly_equal(up, -down, tol()));
        let flat = gravity_force(0.0, &rover, &planet).unwrap().as_scalar().unwrap();
        assert_eq!(flat, 0.0);
    }

    #[test]
    fn gravity_rejects_out_of_range_slope() {
        let rover = reference_rover();
        let planet = mars();
        let slopes = [0.0, 80.0];
        let err = gravity_force(&slopes, &rover, &planet).unwrap_err();
        assert!(matches!(err, ModelError::OutOfRange { .. }));
    }

    #[test]
    fn rolling_is_zero_at_rest_and_opposes_motion() {
        let rover = reference_rover();
        let planet = mars();
        let at_rest = rolling_force(0.0, 0.0, &rover, &planet, 0.2).unwrap();
        assert_eq!(at_rest.as_scalar(), Some(0.0));

        let fwd = rolling_force(2.0, 0.0, &rover, &planet, 0.2)
            .unwrap()
            .as_scalar()
            .unwrap();
        let back = rolling_force(-2.0, 0.0, &rover, &planet, 0.2)
            .unwrap()
            .as_scalar()
            .unwrap();
        assert!(fwd < 0.0);
        assert!(nearly_equal(fwd, -back, tol()));

        // erf(40 v) is saturated at cruising speed
        let saturated = -0.2 * rover.total_mass() * planet.g();
        assert!(nearly_equal(fwd, saturated, Tolerances { abs: 1e-6, rel: 1e-9 }));
    }

    #[test]
    fn rolling_requires_positive_crr() {
        let rover = reference_rover();
        let planet = mars();
        assert!(rolling_force(1.0, 0.0, &rover, &planet, 0.0).is_err());
        assert!(net_force(1.0, 0.0, &rover, &planet, -0.1).is_err());
    }

    #[test]
    fn net_force_broadcasts() {
        let rover = reference_rover();
        let planet = mars();
        let omegas = [0.0, 1.0, 2.0, 3.0];
        let out = net_force(&omegas, 5.0, &rover, &planet, 0.1).unwrap();
        assert_eq!(out.len(), 4);

        let model = ForceModel::new(&rover, &planet).unwrap();
        for (w, f) in omegas.iter().zip(out.as_slice()) {
            assert!(nearly_equal(*f, model.net(*w, 5.0, 0.1).unwrap(), tol()));
        }

        let slopes = [0.0, 5.0];
        let err = net_force(&omegas, &slopes, &rover, &planet, 0.1).unwrap_err();
        assert!(matches!(err, ModelError::ShapeMismatch { .. }));
    }

    #[test]
    fn net_is_sum_of_parts() {
        let rover = reference_rover();
        let planet = mars();
        let model = ForceModel::new(&rover, &planet).unwrap();
        let (w, theta, crr) = (1.7, 12.0, 0.15);
        let sum = model.drive(w)
            + model.gravity(theta).unwrap()
            + model.rolling(w, theta, crr).unwrap();
        assert!(nearly_equal(model.net(w, theta, crr).unwrap(), sum, tol()));
    }

    #[test]
    fn motor_torque_vector() {
        let rover = reference_rover();
        let omegas = vec![-1.0, 0.0, 1.9, 3.8, 5.0];
        let tau = motor_torque(&omegas, rover.motor()).unwrap().into_vec();
        assert_eq!(tau, vec![170.0, 170.0, 85.0, 0.0, 0.0]);
    }

    #[test]
    fn force_model_rejects_bad_rover() {
        let mut rover = reference_rover();
        rover.wheel_assembly.speed_reducer.diam_pinion = rv_core::units::m(-0.04);
        let planet = mars();
        assert!(ForceModel::new(&rover, &planet).is_err());
        assert!(drive_force(1.0, &rover).is_err());
    }
}
