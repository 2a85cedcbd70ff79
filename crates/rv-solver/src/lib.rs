//! Root finding and top-speed analysis for the rover force model.
//!
//! - [`bisection`]: bracketed scalar root finder
//! - [`top_speed`]: terminal velocity with bracket verification/expansion
//! - [`sweep`]: parallel slope and Crr sweeps
//! - [`newton`], [`jacobian`]: dense Newton iteration used by implicit
//!   integrators

pub mod bisection;
pub mod error;
pub mod jacobian;
pub mod newton;
pub mod sweep;
pub mod top_speed;

pub use bisection::{BisectionConfig, BisectionResult, bisect};
pub use error::{SolverError, SolverResult};
pub use jacobian::finite_difference_jacobian;
pub use newton::{NewtonConfig, NewtonResult, newton_solve};
pub use sweep::{
    SweepDefinition, SweepParameter, TopSpeedGrid, TopSpeedSweep, crr_sweep, grid_sweep,
    slope_sweep,
};
pub use top_speed::{TopSpeed, TopSpeedConfig, top_speed, top_speed_with};
