//! Rover and planet parameter records.
//!
//! Records are plain data with public fields so they can be loaded from
//! configuration. `validate()` is the single place where shape and range
//! rules are enforced; the force model and solvers call it once on entry
//! and afterwards rely on the record being well formed.
//!
//! ## Mass
//!
//! ```text
//! m = 6 * (m_wheel + m_reducer + m_motor) + m_chassis + m_payload + m_power
//! ```
//!
//! Mass is recomputed from the parts on every call, so edits to any part
//! are always reflected.

use crate::common::{WHEEL_COUNT, check_finite, check_non_negative, check_positive};
use crate::error::{ModelError, ModelResult};
use rv_core::CubicSpline;
use rv_core::units::{Accel, AngularVelocity, Length, Mass, Torque};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Speed reducer construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReducerKind {
    /// Two-stage reverted gear train: both stages share the same pinion/gear
    /// pair, so the overall ratio is the single-stage ratio squared.
    Reverted,
}

impl FromStr for ReducerKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("reverted") {
            Ok(Self::Reverted)
        } else {
            Err(ModelError::NotSupported {
                what: format!("speed reducer type '{s}' (expected 'reverted')"),
            })
        }
    }
}

impl fmt::Display for ReducerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reverted => write!(f, "reverted"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Wheel {
    pub radius: Length,
    pub mass: Mass,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeedReducer {
    #[serde(rename = "type")]
    pub kind: ReducerKind,
    pub diam_pinion: Length,
    pub diam_gear: Length,
    pub mass: Mass,
}

impl SpeedReducer {
    /// Speed reduction ratio Ng (motor speed / wheel speed).
    pub fn gear_ratio(&self) -> f64 {
        match self.kind {
            ReducerKind::Reverted => (self.diam_gear.value / self.diam_pinion.value).powi(2),
        }
    }

    pub fn validate(&self) -> ModelResult<()> {
        check_positive(self.diam_pinion.value, "pinion diameter must be positive")?;
        check_positive(self.diam_gear.value, "gear diameter must be positive")?;
        check_non_negative(self.mass.value, "speed reducer mass cannot be negative")?;
        Ok(())
    }
}

/// Motor efficiency as a function of shaft torque.
///
/// Interpolated with a cubic spline and extrapolated past the last sample.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyCurve {
    /// Shaft torque samples [N·m], strictly increasing.
    pub torque: Vec<f64>,
    /// Efficiency fraction at each torque sample, in [0, 1].
    pub efficiency: Vec<f64>,
}

impl EfficiencyCurve {
    pub fn new(torque: Vec<f64>, efficiency: Vec<f64>) -> ModelResult<Self> {
        let curve = Self { torque, efficiency };
        curve.validate()?;
        Ok(curve)
    }

    pub fn validate(&self) -> ModelResult<()> {
        if self.torque.len() != self.efficiency.len() {
            return Err(ModelError::ShapeMismatch {
                what: "efficiency curve torque/efficiency samples",
                left: self.torque.len(),
                right: self.efficiency.len(),
            });
        }
        for &eta in &self.efficiency {
            check_finite(eta, "efficiency sample")?;
            if !(0.0..=1.0).contains(&eta) {
                return Err(ModelError::OutOfRange {
                    what: "efficiency sample",
                    value: eta,
                    min: 0.0,
                    max: 1.0,
                });
            }
        }
        // Length, monotonic and finiteness rules of the torque axis.
        CubicSpline::new(&self.torque, &self.efficiency)?;
        Ok(())
    }

    /// Torque → efficiency interpolant.
    pub fn spline(&self) -> ModelResult<CubicSpline> {
        Ok(CubicSpline::new(&self.torque, &self.efficiency)?)
    }
}

/// Brushed DC motor with a linear torque–speed characteristic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Motor {
    pub torque_stall: Torque,
    pub torque_noload: Torque,
    pub speed_noload: AngularVelocity,
    pub mass: Mass,
    pub efficiency: EfficiencyCurve,
}

impl Motor {
    /// Shaft torque [N·m] at shaft speed `omega` [rad/s].
    ///
    /// Stall torque below zero speed, zero above no-load speed, linear in
    /// between.
    pub fn torque(&self, omega: f64) -> f64 {
        let stall = self.torque_stall.value;
        let noload = self.torque_noload.value;
        let speed_noload = self.speed_noload.value;

        if omega > speed_noload {
            0.0
        } else if omega < 0.0 {
            stall
        } else {
            stall - (stall - noload) * (omega / speed_noload)
        }
    }

    pub fn validate(&self) -> ModelResult<()> {
        check_positive(self.torque_stall.value, "stall torque must be positive")?;
        check_non_negative(self.torque_noload.value, "no-load torque cannot be negative")?;
        if self.torque_noload.value > self.torque_stall.value {
            return Err(ModelError::InvalidArg {
                what: "no-load torque cannot exceed stall torque",
            });
        }
        check_positive(self.speed_noload.value, "no-load speed must be positive")?;
        check_non_negative(self.mass.value, "motor mass cannot be negative")?;
        self.efficiency.validate()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WheelAssembly {
    pub wheel: Wheel,
    pub speed_reducer: SpeedReducer,
    pub motor: Motor,
}

impl WheelAssembly {
    /// Mass of one wheel + reducer + motor unit.
    pub fn unit_mass(&self) -> f64 {
        self.wheel.mass.value + self.speed_reducer.mass.value + self.motor.mass.value
    }
}

/// Six-wheel rover.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rover {
    pub wheel_assembly: WheelAssembly,
    pub chassis_mass: Mass,
    pub science_payload_mass: Mass,
    pub power_subsys_mass: Mass,
}

impl Rover {
    /// Create a rover, rejecting malformed parameters.
    pub fn new(
        wheel_assembly: WheelAssembly,
        chassis_mass: Mass,
        science_payload_mass: Mass,
        power_subsys_mass: Mass,
    ) -> ModelResult<Self> {
        let rover = Self {
            wheel_assembly,
            chassis_mass,
            science_payload_mass,
            power_subsys_mass,
        };
        rover.validate()?;
        Ok(rover)
    }

    pub fn validate(&self) -> ModelResult<()> {
        let wa = &self.wheel_assembly;
        check_positive(wa.wheel.radius.value, "wheel radius must be positive")?;
        check_non_negative(wa.wheel.mass.value, "wheel mass cannot be negative")?;
        wa.speed_reducer.validate()?;
        wa.motor.validate()?;
        check_non_negative(self.chassis_mass.value, "chassis mass cannot be negative")?;
        check_non_negative(
            self.science_payload_mass.value,
            "science payload mass cannot be negative",
        )?;
        check_non_negative(
            self.power_subsys_mass.value,
            "power subsystem mass cannot be negative",
        )?;
        check_positive(self.total_mass(), "rover mass must be positive")?;
        Ok(())
    }

    /// Total rover mass [kg].
    pub fn total_mass(&self) -> f64 {
        WHEEL_COUNT as f64 * self.wheel_assembly.unit_mass()
            + self.chassis_mass.value
            + self.science_payload_mass.value
            + self.power_subsys_mass.value
    }

    pub fn gear_ratio(&self) -> f64 {
        self.wheel_assembly.speed_reducer.gear_ratio()
    }

    pub fn wheel_radius(&self) -> f64 {
        self.wheel_assembly.wheel.radius.value
    }

    pub fn motor(&self) -> &Motor {
        &self.wheel_assembly.motor
    }

    /// Motor shaft speed [rad/s] for rover velocity `v` [m/s].
    pub fn motor_speed(&self, v: f64) -> f64 {
        v / self.wheel_radius() * self.gear_ratio()
    }

    /// Rover velocity [m/s] for motor shaft speed `omega` [rad/s].
    pub fn rover_speed(&self, omega: f64) -> f64 {
        omega / self.gear_ratio() * self.wheel_radius()
    }

    /// Rover velocity with the motors at no-load speed.
    pub fn max_wheel_speed(&self) -> f64 {
        self.rover_speed(self.motor().speed_noload.value)
    }
}

/// Planet on which the rover drives.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    /// Gravitational acceleration (positive).
    pub gravity: Accel,
}

impl Planet {
    pub fn new(gravity: Accel) -> ModelResult<Self> {
        let planet = Self { gravity };
        planet.validate()?;
        Ok(planet)
    }

    pub fn mars() -> Self {
        Self {
            gravity: rv_core::units::constants::mars_g(),
        }
    }

    pub fn validate(&self) -> ModelResult<()> {
        check_positive(self.gravity.value, "gravity must be positive")?;
        Ok(())
    }

    pub fn g(&self) -> f64 {
        self.gravity.value
    }
}
