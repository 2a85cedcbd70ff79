//! rv-model: vehicle parameters and longitudinal force model.
//!
//! Provides:
//! - Rover and planet parameter records with validation
//! - Drive, gravity, rolling and net force (scalar or vector inputs)
//! - Terrain angle along the path
//! - Mechanical power and battery energy
//! - Sampled motor, reducer and efficiency curves
//!
//! # Example
//!
//! ```
//! use rv_model::{ForceModel, reference_rover, Planet};
//!
//! let rover = reference_rover();
//! let planet = Planet::mars();
//! let model = ForceModel::new(&rover, &planet).unwrap();
//!
//! // At rest on flat ground only the stall drive force acts.
//! let f = model.net_at_velocity(0.0, 0.0, 0.1).unwrap();
//! assert!(f > 0.0);
//! ```

pub mod common;
pub mod curves;
pub mod error;
pub mod forces;
pub mod operand;
pub mod power;
pub mod reference;
pub mod terrain;
pub mod vehicle;

// Re-exports
pub use common::{SLOPE_LIMIT_DEG, WHEEL_COUNT};
pub use curves::{Curve, ShaftCurve, efficiency_curve, motor_curve, reducer_output_curve};
pub use error::{ModelError, ModelResult};
pub use forces::{
    ForceModel, drive_force, gravity_force, motor_speed, motor_torque, net_force, rolling_force,
};
pub use operand::{Operand, Value};
pub use power::{battery_energy, electrical_power, mechanical_power};
pub use reference::{mars, reference_rover};
pub use terrain::{TerrainProfile, TerrainSamples};
pub use vehicle::{
    EfficiencyCurve, Motor, Planet, ReducerKind, Rover, SpeedReducer, Wheel, WheelAssembly,
};
