use crate::RvError;

/// Floating point type used throughout system
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, RvError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(RvError::NonFinite { what, value: v })
    }
}

/// Composite trapezoidal rule of `y` over the abscissae `x`.
///
/// Fewer than two samples integrate to exactly zero.
pub fn trapezoid(y: &[Real], x: &[Real]) -> Result<Real, RvError> {
    if y.len() != x.len() {
        return Err(RvError::LengthMismatch {
            what: "trapezoid samples",
            left: y.len(),
            right: x.len(),
        });
    }
    if x.len() < 2 {
        return Ok(0.0);
    }
    let total = x
        .windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| 0.5 * (xs[1] - xs[0]) * (ys[0] + ys[1]))
        .sum();
    Ok(total)
}

/// Evenly spaced points over `[start, end]`, endpoint exact.
pub fn linspace(start: Real, end: Real, num_points: usize) -> Vec<Real> {
    match num_points {
        0 => Vec::new(),
        1 => vec![start],
        n => {
            let delta = (end - start) / (n - 1) as Real;
            let mut points: Vec<Real> = (0..n).map(|i| start + i as Real * delta).collect();
            points[n - 1] = end;
            points
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn trapezoid_linear_is_exact() {
        let x = [0.0, 1.0, 3.0];
        let y = [0.0, 2.0, 6.0];
        assert!((trapezoid(&y, &x).unwrap() - 9.0).abs() < 1e-12);
    }

    #[test]
    fn trapezoid_degenerate_inputs() {
        assert_eq!(trapezoid(&[], &[]).unwrap(), 0.0);
        assert_eq!(trapezoid(&[5.0], &[1.0]).unwrap(), 0.0);
        assert_eq!(trapezoid(&[5.0, 7.0], &[2.0, 2.0]).unwrap(), 0.0);
        assert!(matches!(
            trapezoid(&[1.0, 2.0], &[0.0]),
            Err(RvError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn linspace_endpoints() {
        let pts = linspace(-10.0, 35.0, 25);
        assert_eq!(pts.len(), 25);
        assert_eq!(pts[0], -10.0);
        assert_eq!(pts[24], 35.0);
        assert!((pts[1] - pts[0] - 1.875).abs() < 1e-12);
        assert_eq!(linspace(1.0, 2.0, 1), vec![1.0]);
        assert!(linspace(1.0, 2.0, 0).is_empty());
    }
}
