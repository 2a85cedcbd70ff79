//! Rover traverse simulation.

use crate::dynamics::RoverDynamics;
use crate::error::SimResult;
use crate::experiment::{EndConditions, Experiment};
use crate::integrator::{Bdf, SolverOptions};
use crate::telemetry::Telemetry;
use nalgebra::DVector;
use rv_model::{Planet, Rover};
use tracing::info;

/// Simulate a traverse with the default integrator settings.
pub fn simulate_rover(
    rover: &Rover,
    planet: &Planet,
    experiment: &Experiment,
    end: &EndConditions,
) -> SimResult<Telemetry> {
    simulate_rover_with(rover, planet, experiment, end, &SolverOptions::default())
}

/// Simulate a traverse.
///
/// All inputs are validated before the first step; malformed input fails
/// with an invalid-argument error and no integration is attempted.
pub fn simulate_rover_with(
    rover: &Rover,
    planet: &Planet,
    experiment: &Experiment,
    end: &EndConditions,
    options: &SolverOptions,
) -> SimResult<Telemetry> {
    experiment.validate()?;
    end.validate()?;
    options.validate()?;

    let t_span = experiment.time_span()?;
    let y0 = experiment.initial_state()?;
    let dynamics = RoverDynamics::new(rover, planet, experiment.terrain_profile()?, experiment.crr)?;
    let events = end.events();

    info!(
        t0 = t_span.0,
        t_end = t_span.1,
        v0 = y0[0],
        x0 = y0[1],
        crr = experiment.crr,
        "starting rover simulation"
    );
    let solution = Bdf::new(options.clone()).integrate(
        &dynamics,
        t_span,
        DVector::from_row_slice(&y0),
        &events,
    )?;
    info!(
        accepted = solution.stats.accepted,
        rejected = solution.stats.rejected,
        termination = ?solution.termination,
        "rover simulation finished"
    );

    let velocity = solution.component(0);
    let position = solution.component(1);
    Telemetry::from_samples(solution.t, velocity, position, rover, solution.termination)
}
