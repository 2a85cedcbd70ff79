//! rv-core: numeric foundation for roverdyn.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real + tolerances + quadrature helpers)
//! - interp (cubic spline with polynomial extrapolation)
//! - error (shared error types)

pub mod error;
pub mod interp;
pub mod numeric;
pub mod units;

pub use error::{RvError, RvResult};
pub use interp::CubicSpline;
pub use numeric::*;
