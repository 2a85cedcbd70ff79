//! Scalar bisection.
//!
//! The bracket is not checked for a sign change. Callers that cannot
//! guarantee one (see [`crate::top_speed`]) verify it before calling.

use crate::error::{SolverError, SolverResult};
use serde::Serialize;

/// Bisection stopping rules.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BisectionConfig {
    /// Stop once the error bound (half bracket width) drops below this.
    pub tolerance: f64,
    /// Hard cap on halvings.
    pub max_iterations: usize,
}

impl Default for BisectionConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 1000,
        }
    }
}

impl BisectionConfig {
    pub fn validate(&self) -> SolverResult<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(SolverError::InvalidArg {
                what: "bisection tolerance must be positive",
            });
        }
        if self.max_iterations == 0 {
            return Err(SolverError::InvalidArg {
                what: "bisection needs at least one iteration",
            });
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BisectionResult {
    /// Midpoint of the final bracket.
    pub root: f64,
    /// Half width of the final bracket; 0 for an exact hit.
    pub error_bound: f64,
    pub iterations: usize,
    /// False when the iteration cap was hit before the tolerance.
    pub converged: bool,
}

impl BisectionResult {
    fn exact(root: f64, iterations: usize) -> Self {
        Self {
            root,
            error_bound: 0.0,
            iterations,
            converged: true,
        }
    }
}

fn eval<F>(f: &mut F, x: f64) -> SolverResult<f64>
where
    F: FnMut(f64) -> SolverResult<f64>,
{
    let y = f(x)?;
    if !y.is_finite() {
        return Err(SolverError::InvalidArg {
            what: "bisection function returned a non-finite value",
        });
    }
    Ok(y)
}

/// Find a root of `f` in `[lo, hi]`.
///
/// Each iteration keeps the half whose endpoints straddle a sign change
/// relative to the current lower endpoint.
pub fn bisect<F>(mut f: F, lo: f64, hi: f64, config: &BisectionConfig) -> SolverResult<BisectionResult>
where
    F: FnMut(f64) -> SolverResult<f64>,
{
    config.validate()?;
    if !lo.is_finite() || !hi.is_finite() {
        return Err(SolverError::InvalidArg {
            what: "bisection bracket must be finite",
        });
    }
    if lo >= hi {
        return Err(SolverError::InvalidArg {
            what: "bisection bracket must satisfy lo < hi",
        });
    }

    if eval(&mut f, hi)? == 0.0 {
        return Ok(BisectionResult::exact(hi, 0));
    }
    let mut f_lo = eval(&mut f, lo)?;
    if f_lo == 0.0 {
        return Ok(BisectionResult::exact(lo, 0));
    }

    let (mut lo, mut hi) = (lo, hi);
    let mut iter = 0;
    loop {
        iter += 1;
        let mid = 0.5 * (lo + hi);
        let f_mid = eval(&mut f, mid)?;
        if f_mid == 0.0 {
            return Ok(BisectionResult::exact(mid, iter));
        }

        if f_mid.signum() != f_lo.signum() {
            hi = mid;
        } else {
            lo = mid;
            f_lo = f_mid;
        }

        let error_bound = 0.5 * (hi - lo);
        if error_bound < config.tolerance || iter == config.max_iterations {
            return Ok(BisectionResult {
                root: 0.5 * (lo + hi),
                error_bound,
                iterations: iter,
                converged: error_bound < config.tolerance,
            });
        }
    }
}
