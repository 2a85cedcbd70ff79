//! Rover state derivative.
//!
//! State `y = [v, x]` (velocity [m/s], position [m]):
//!
//! ```text
//! theta = terrain(x)
//! omega = v / r * Ng
//! y'    = [F_net(omega, theta, Crr) / m, v]
//! ```

use crate::error::{SimError, SimResult};
use crate::experiment::Experiment;
use crate::model::OdeSystem;
use nalgebra::DVector;
use rv_model::common::{check_crr, check_finite};
use rv_model::{ForceModel, Planet, Rover, TerrainProfile};

/// Longitudinal rover dynamics over a terrain profile.
#[derive(Clone, Debug)]
pub struct RoverDynamics<'a> {
    forces: ForceModel<'a>,
    terrain: TerrainProfile,
    crr: f64,
}

impl<'a> RoverDynamics<'a> {
    pub fn new(
        rover: &'a Rover,
        planet: &'a Planet,
        terrain: TerrainProfile,
        crr: f64,
    ) -> SimResult<Self> {
        let forces = ForceModel::new(rover, planet)?;
        let crr = check_crr(crr)?;
        Ok(Self {
            forces,
            terrain,
            crr,
        })
    }

    pub fn terrain(&self) -> &TerrainProfile {
        &self.terrain
    }

    /// `[acceleration, velocity]` at state `y = [velocity, position]`.
    pub fn derivative(&self, y: &[f64]) -> SimResult<[f64; 2]> {
        let [v, x] = <[f64; 2]>::try_from(y).map_err(|_| SimError::InvalidArg {
            what: "state must be [velocity, position]",
        })?;
        let v = check_finite(v, "velocity must be finite")?;
        let x = check_finite(x, "position must be finite")?;

        let theta = self.terrain.angle_at(x)?;
        let omega = self.forces.motor_speed(v);
        let force = self.forces.net(omega, theta, self.crr)?;
        Ok([force / self.forces.mass(), v])
    }
}

impl OdeSystem for RoverDynamics<'_> {
    fn dimension(&self) -> usize {
        2
    }

    fn rhs(&self, _t: f64, y: &DVector<f64>) -> SimResult<DVector<f64>> {
        let dy = self.derivative(y.as_slice())?;
        Ok(DVector::from_row_slice(&dy))
    }
}

/// One-shot state derivative for an experiment's terrain and Crr.
pub fn rover_dynamics(
    _t: f64,
    y: &[f64],
    rover: &Rover,
    planet: &Planet,
    experiment: &Experiment,
) -> SimResult<[f64; 2]> {
    let terrain = experiment.terrain_profile()?;
    RoverDynamics::new(rover, planet, terrain, experiment.crr)?.derivative(y)
}
