//! Transient traverse simulation for the rover.
//!
//! Provides:
//! - Variable-step BDF integrator with terminal events
//! - Rover longitudinal dynamics over a terrain spline
//! - Experiment and end-condition definitions
//! - Telemetry: trajectory, power and battery energy

pub mod dynamics;
pub mod error;
pub mod events;
pub mod experiment;
pub mod integrator;
pub mod model;
pub mod sim;
pub mod telemetry;

pub use dynamics::{RoverDynamics, rover_dynamics};
pub use error::{SimError, SimResult};
pub use events::{Direction, Event, EventHit};
pub use experiment::{EndConditions, Experiment};
pub use integrator::{Bdf, Solution, SolverOptions, StepStats, Termination};
pub use model::OdeSystem;
pub use sim::{simulate_rover, simulate_rover_with};
pub use telemetry::Telemetry;
