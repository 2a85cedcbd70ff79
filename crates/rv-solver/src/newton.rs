//! Damped Newton iteration for small dense systems.
//!
//! The residual and Jacobian callbacks may fail with any error type that a
//! [`SolverError`] converts into, so callers keep their own error enums.

use crate::error::SolverError;
use nalgebra::{DMatrix, DVector};

/// Iteration limits and stopping tolerances.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NewtonConfig {
    pub max_iterations: usize,
    /// Stop once `|r| < abs_tol`.
    pub abs_tol: f64,
    /// Or once `|r| < rel_tol * |r0|`.
    pub rel_tol: f64,
    /// Step shrink factor per backtrack.
    pub line_search_beta: f64,
    pub max_line_search_iters: usize,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            abs_tol: 1e-6,
            rel_tol: 1e-6,
            line_search_beta: 0.5,
            max_line_search_iters: 20,
        }
    }
}

impl NewtonConfig {
    fn is_converged(&self, r_norm: f64, r0_norm: f64) -> bool {
        r_norm < self.abs_tol || r_norm < self.rel_tol * r0_norm
    }
}

#[derive(Clone, Debug)]
pub struct NewtonResult {
    pub x: DVector<f64>,
    pub residual_norm: f64,
    pub iterations: usize,
    pub converged: bool,
}

fn all_finite(v: &DVector<f64>) -> bool {
    v.iter().all(|x| x.is_finite())
}

/// Newton with backtracking line search.
///
/// Steps that produce a non-finite iterate or residual are backtracked the
/// same way as steps that fail to reduce the residual.
///
/// # Errors
/// `ConvergenceFailed` when the iteration cap is reached or the line search
/// stagnates, `Numeric` when the Jacobian is singular.
pub fn newton_solve<F, J, E>(
    x0: DVector<f64>,
    residual_fn: F,
    jacobian_fn: J,
    config: &NewtonConfig,
) -> Result<NewtonResult, E>
where
    F: Fn(&DVector<f64>) -> Result<DVector<f64>, E>,
    J: Fn(&DVector<f64>) -> Result<DMatrix<f64>, E>,
    E: From<SolverError>,
{
    let mut x = x0;
    let mut r = residual_fn(&x)?;
    if !all_finite(&r) {
        return Err(SolverError::Numeric {
            what: "residual is not finite at the starting point".to_string(),
        }
        .into());
    }
    let r0_norm = r.norm();
    let mut r_norm = r0_norm;
    let mut iterations = 0;

    while !config.is_converged(r_norm, r0_norm) {
        if iterations == config.max_iterations {
            return Err(SolverError::ConvergenceFailed {
                what: format!("no convergence in {iterations} iterations, |r| = {r_norm:e}"),
            }
            .into());
        }

        let dx = jacobian_fn(&x)?
            .lu()
            .solve(&-&r)
            .ok_or_else(|| SolverError::Numeric {
                what: "singular Jacobian".to_string(),
            })?;

        let mut alpha = 1.0;
        let mut trial = &x + &dx;
        let mut r_trial = residual_fn(&trial)?;
        let mut backtracks = 0;
        while !(all_finite(&trial) && r_trial.norm() < r_norm)
            && backtracks < config.max_line_search_iters
        {
            alpha *= config.line_search_beta;
            trial = &x + &dx * alpha;
            r_trial = residual_fn(&trial)?;
            backtracks += 1;
        }

        let trial_norm = r_trial.norm();
        if !trial_norm.is_finite() || alpha < 1e-10 {
            return Err(SolverError::ConvergenceFailed {
                what: format!("line search stalled at iteration {iterations}"),
            }
            .into());
        }

        x = trial;
        r = r_trial;
        r_norm = trial_norm;
        iterations += 1;
    }

    Ok(NewtonResult {
        x,
        residual_norm: r_norm,
        iterations,
        converged: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SolverResult;

    #[test]
    fn simple_quadratic() {
        // Solve x^2 - 4 = 0 from x = 3
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0] - 4.0))
        };
        let jacobian = |x: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, 2.0 * x[0]))
        };

        let x0 = DVector::from_element(1, 3.0);
        let config = NewtonConfig::default();
        let result = newton_solve(x0, residual, jacobian, &config).unwrap();

        assert!(result.converged);
        assert!((result.x[0] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn coupled_linear_system_in_one_step() {
        // x + y = 3, x - y = 1
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_vec(vec![x[0] + x[1] - 3.0, x[0] - x[1] - 1.0]))
        };
        let jacobian = |_: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, -1.0]))
        };
        let config = NewtonConfig {
            rel_tol: 0.0,
            abs_tol: 1e-12,
            ..NewtonConfig::default()
        };
        let result = newton_solve(DVector::zeros(2), residual, jacobian, &config).unwrap();
        assert_eq!(result.iterations, 1);
        assert!((result.x[0] - 2.0).abs() < 1e-12);
        assert!((result.x[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn singular_jacobian_is_numeric_error() {
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0] + 1.0))
        };
        let jacobian =
            |_: &DVector<f64>| -> SolverResult<DMatrix<f64>> { Ok(DMatrix::zeros(1, 1)) };
        let err = newton_solve(
            DVector::from_element(1, 0.0),
            residual,
            jacobian,
            &NewtonConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SolverError::Numeric { .. }));
    }

    #[test]
    fn no_root_fails_to_converge() {
        // x^2 + 1 has no real root
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0] + 1.0))
        };
        let jacobian = |x: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, 2.0 * x[0]))
        };
        let err = newton_solve(
            DVector::from_element(1, 1.0),
            residual,
            jacobian,
            &NewtonConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SolverError::ConvergenceFailed { .. } | SolverError::Numeric { .. }
        ));
    }
}
