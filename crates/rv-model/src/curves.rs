//! Sampled characteristic curves for reporting.

use crate::error::{ModelError, ModelResult};
use crate::vehicle::Rover;
use rv_core::numeric::linspace;
use serde::Serialize;

/// Speed, torque and power sampled along a shaft characteristic.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ShaftCurve {
    /// Shaft speed [rad/s].
    pub speed: Vec<f64>,
    /// Shaft torque [N·m].
    pub torque: Vec<f64>,
    /// Shaft power [W].
    pub power: Vec<f64>,
}

impl ShaftCurve {
    pub fn len(&self) -> usize {
        self.speed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speed.is_empty()
    }

    /// Sample with the highest power.
    pub fn peak_power(&self) -> Option<(f64, f64)> {
        self.speed
            .iter()
            .zip(&self.power)
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(&w, &p)| (w, p))
    }
}

/// Plain (x, y) samples of a tabulated function.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Curve {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

fn check_points(num_points: usize) -> ModelResult<()> {
    if num_points < 2 {
        return Err(ModelError::InvalidArg {
            what: "curve needs at least two points",
        });
    }
    Ok(())
}

/// Motor shaft curve over `[0, no-load speed]`.
pub fn motor_curve(rover: &Rover, num_points: usize) -> ModelResult<ShaftCurve> {
    rover.validate()?;
    check_points(num_points)?;
    let motor = rover.motor();
    let speed = linspace(0.0, motor.speed_noload.value, num_points);
    let torque: Vec<f64> = speed.iter().map(|&w| motor.torque(w)).collect();
    let power = speed.iter().zip(&torque).map(|(w, t)| w * t).collect();
    Ok(ShaftCurve {
        speed,
        torque,
        power,
    })
}

/// Reducer output (wheel side) curve: speed divided by Ng, torque
/// multiplied by Ng, power unchanged.
pub fn reducer_output_curve(rover: &Rover, num_points: usize) -> ModelResult<ShaftCurve> {
    let input = motor_curve(rover, num_points)?;
    let ng = rover.gear_ratio();
    Ok(ShaftCurve {
        speed: input.speed.iter().map(|w| w / ng).collect(),
        torque: input.torque.iter().map(|t| t * ng).collect(),
        power: input.power,
    })
}

/// Motor efficiency over the sampled torque range.
pub fn efficiency_curve(rover: &Rover, num_points: usize) -> ModelResult<Curve> {
    rover.validate()?;
    check_points(num_points)?;
    let (x, y) = rover.motor().efficiency.spline()?.sample(num_points);
    Ok(Curve { x, y })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::reference_rover;

    #[test]
    fn motor_curve_endpoints() {
        let rover = reference_rover();
        let curve = motor_curve(&rover, 101).unwrap();
        assert_eq!(curve.len(), 101);
        assert_eq!(curve.speed[0], 0.0);
        assert_eq!(curve.speed[100], 3.8);
        assert_eq!(curve.torque[0], 170.0);
        assert_eq!(curve.torque[100], 0.0);
        let (w, p) = curve.peak_power().unwrap();
        assert!((w - 1.9).abs() < 1e-12);
        assert!((p - 161.5).abs() < 1e-9);
    }

    #[test]
    fn reducer_conserves_power() {
        let rover = reference_rover();
        let ng = rover.gear_ratio();
        let motor = motor_curve(&rover, 11).unwrap();
        let out = reducer_output_curve(&rover, 11).unwrap();
        for i in 0..11 {
            assert!((out.speed[i] * ng - motor.speed[i]).abs() < 1e-12);
            assert!((out.torque[i] - motor.torque[i] * ng).abs() < 1e-9);
            assert!((out.speed[i] * out.torque[i] - out.power[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn efficiency_curve_spans_samples() {
        let rover = reference_rover();
        let curve = efficiency_curve(&rover, 50).unwrap();
        assert_eq!(curve.x[0], 0.0);
        assert_eq!(curve.x[49], 165.0);
        assert!((curve.y[49] - 0.05).abs() < 1e-12);
    }

    #[test]
    fn too_few_points() {
        let rover = reference_rover();
        assert!(motor_curve(&rover, 1).is_err());
        assert!(efficiency_curve(&rover, 0).is_err());
    }
}
