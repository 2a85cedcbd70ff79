//! Reference rover used by the analyses and tests.

use crate::vehicle::{
    EfficiencyCurve, Motor, Planet, ReducerKind, Rover, SpeedReducer, Wheel, WheelAssembly,
};
use rv_core::units::{kg, m, nm, radps};

/// Efficiency map of the reference drive motor (torque [N·m], fraction).
pub const REFERENCE_EFFICIENCY: [(f64, f64); 6] = [
    (0.0, 0.0),
    (10.0, 0.55),
    (20.0, 0.75),
    (40.0, 0.71),
    (70.0, 0.50),
    (165.0, 0.05),
];

/// The baseline rover: 170 N·m / 3.8 rad/s motors behind a 0.04/0.07 m
/// reverted reducer on 0.30 m wheels.
pub fn reference_rover() -> Rover {
    let (torque, efficiency): (Vec<f64>, Vec<f64>) = REFERENCE_EFFICIENCY.iter().copied().unzip();
    Rover {
        wheel_assembly: WheelAssembly {
            wheel: Wheel {
                radius: m(0.30),
                mass: kg(1.0),
            },
            speed_reducer: SpeedReducer {
                kind: ReducerKind::Reverted,
                diam_pinion: m(0.04),
                diam_gear: m(0.07),
                mass: kg(1.5),
            },
            motor: Motor {
                torque_stall: nm(170.0),
                torque_noload: nm(0.0),
                speed_noload: radps(3.8),
                mass: kg(5.0),
                efficiency: EfficiencyCurve { torque, efficiency },
            },
        },
        chassis_mass: kg(659.0),
        science_payload_mass: kg(75.0),
        power_subsys_mass: kg(90.0),
    }
}

/// Mars, g = 3.72 m/s².
pub fn mars() -> Planet {
    Planet::mars()
}
