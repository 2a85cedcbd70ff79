//! OdeSystem trait for first-order systems integrated by [`crate::Bdf`].

use crate::error::SimResult;
use nalgebra::DVector;

/// First-order system `y' = f(t, y)` of fixed dimension.
///
/// `rhs` takes `&self`: the implicit corrector evaluates it from inside
/// non-mutable closures, so implementations must not rely on caching.
pub trait OdeSystem {
    /// Length of the state vector.
    fn dimension(&self) -> usize;

    /// State derivative at `(t, y)`.
    fn rhs(&self, t: f64, y: &DVector<f64>) -> SimResult<DVector<f64>>;
}
