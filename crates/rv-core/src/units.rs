// rv-core/src/units.rs

use uom::si::f64::{
    Acceleration as UomAcceleration, AngularVelocity as UomAngularVelocity, Length as UomLength,
    Mass as UomMass, Torque as UomTorque,
};

// Public canonical unit types (SI, f64)
pub type Accel = UomAcceleration;
pub type AngularVelocity = UomAngularVelocity;
pub type Length = UomLength;
pub type Mass = UomMass;
pub type Torque = UomTorque;

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn kg(v: f64) -> Mass {
    use uom::si::mass::kilogram;
    Mass::new::<kilogram>(v)
}

#[inline]
pub fn mps2(v: f64) -> Accel {
    use uom::si::acceleration::meter_per_second_squared;
    Accel::new::<meter_per_second_squared>(v)
}

#[inline]
pub fn nm(v: f64) -> Torque {
    use uom::si::torque::newton_meter;
    Torque::new::<newton_meter>(v)
}

#[inline]
pub fn radps(v: f64) -> AngularVelocity {
    use uom::si::angular_velocity::radian_per_second;
    AngularVelocity::new::<radian_per_second>(v)
}

pub mod constants {
    use super::*;

    pub const MARS_G_MPS2: f64 = 3.72;

    #[inline]
    pub fn mars_g() -> Accel {
        mps2(MARS_G_MPS2)
    }
}
