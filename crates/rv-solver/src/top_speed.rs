//! Terminal velocity for a fixed slope and rolling resistance.
//!
//! The top speed is the velocity at which the net force vanishes. Net force
//! is non-increasing in velocity, so a single sign change is searched for
//! on `[0, v_upper]`:
//!
//! 1. `F(0) <= 0`: the rover cannot start moving, top speed is 0.
//! 2. `F(v_upper) > 0`: grow `v_upper` geometrically; if the force never
//!    turns negative the rover accelerates without bound (runaway).
//! 3. Otherwise bisect in velocity.

use crate::bisection::{BisectionConfig, bisect};
use crate::error::{SolverError, SolverResult};
use rv_model::{ForceModel, Planet, Rover};
use serde::Serialize;
use tracing::{debug, warn};

/// Outcome of a top-speed search.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", content = "velocity", rename_all = "snake_case")]
pub enum TopSpeed {
    /// Net force at rest is not positive.
    Stalled,
    /// Net force crosses zero at this velocity [m/s].
    Equilibrium(f64),
    /// Net force stays positive at every searched velocity.
    Runaway,
}

impl TopSpeed {
    /// Velocity [m/s]: 0 when stalled, NaN for a runaway.
    pub fn velocity(&self) -> f64 {
        match self {
            Self::Stalled => 0.0,
            Self::Equilibrium(v) => *v,
            Self::Runaway => f64::NAN,
        }
    }

    pub fn is_runaway(&self) -> bool {
        matches!(self, Self::Runaway)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TopSpeedConfig {
    /// Initial upper bracket as a multiple of the no-load wheel speed.
    pub headroom: f64,
    /// Growth factor applied to the upper bracket when no sign change is found.
    pub expansion: f64,
    pub max_expansions: usize,
    pub bisection: BisectionConfig,
}

impl Default for TopSpeedConfig {
    fn default() -> Self {
        Self {
            headroom: 2.0,
            expansion: 1.8,
            max_expansions: 10,
            bisection: BisectionConfig {
                tolerance: 1e-9,
                max_iterations: 200,
            },
        }
    }
}

impl TopSpeedConfig {
    pub fn validate(&self) -> SolverResult<()> {
        if !self.headroom.is_finite() || self.headroom <= 0.0 {
            return Err(SolverError::InvalidArg {
                what: "bracket headroom must be positive",
            });
        }
        if !self.expansion.is_finite() || self.expansion <= 1.0 {
            return Err(SolverError::InvalidArg {
                what: "bracket expansion factor must exceed 1",
            });
        }
        self.bisection.validate()
    }
}

/// Top speed with the default search settings.
pub fn top_speed(rover: &Rover, planet: &Planet, slope_deg: f64, crr: f64) -> SolverResult<TopSpeed> {
    top_speed_with(rover, planet, slope_deg, crr, &TopSpeedConfig::default())
}

pub fn top_speed_with(
    rover: &Rover,
    planet: &Planet,
    slope_deg: f64,
    crr: f64,
    config: &TopSpeedConfig,
) -> SolverResult<TopSpeed> {
    config.validate()?;
    let model = ForceModel::new(rover, planet)?;
    let net = |v: f64| -> SolverResult<f64> { Ok(model.net_at_velocity(v, slope_deg, crr)?) };

    if net(0.0)? <= 0.0 {
        debug!(slope_deg, crr, "rover stalled at rest");
        return Ok(TopSpeed::Stalled);
    }

    let mut v_upper = config.headroom * rover.max_wheel_speed();
    let mut expansions = 0;
    while net(v_upper)? > 0.0 {
        if expansions == config.max_expansions {
            warn!(slope_deg, crr, v_upper, "net force stays positive, no top speed");
            return Ok(TopSpeed::Runaway);
        }
        v_upper *= config.expansion;
        expansions += 1;
        debug!(slope_deg, crr, v_upper, expansions, "expanding top-speed bracket");
    }

    let res = bisect(net, 0.0, v_upper, &config.bisection)?;
    if !res.converged {
        return Err(SolverError::ConvergenceFailed {
            what: format!(
                "top speed bisection stopped after {} iterations (error bound {:.3e})",
                res.iterations, res.error_bound
            ),
        });
    }
    Ok(TopSpeed::Equilibrium(res.root.max(0.0)))
}
