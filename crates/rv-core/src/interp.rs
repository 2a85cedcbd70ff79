//! Cubic spline interpolation over tabulated samples.
//!
//! The spline is stored as knot values plus second derivatives. Boundary
//! conditions:
//!
//! - n >= 4: not-a-knot (third derivative continuous at the second and
//!   second-to-last knots)
//! - n == 3: the single parabola through the samples
//! - n == 2: the straight line through the samples
//!
//! Outside the sample range the first/last polynomial piece is extended.
//! Nothing is clamped: callers see whatever the end pieces produce.

use crate::error::{RvError, RvResult};

#[derive(Clone, Debug, PartialEq)]
pub struct CubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    /// Second derivative at each knot.
    m: Vec<f64>,
}

impl CubicSpline {
    /// Fit a spline through `(x[i], y[i])`.
    ///
    /// # Errors
    /// Fails when lengths differ, fewer than two samples are given, a
    /// sample is non-finite or `x` is not strictly increasing.
    pub fn new(x: &[f64], y: &[f64]) -> RvResult<Self> {
        if x.len() != y.len() {
            return Err(RvError::LengthMismatch {
                what: "spline samples",
                left: x.len(),
                right: y.len(),
            });
        }
        if x.len() < 2 {
            return Err(RvError::InvalidArg {
                what: "spline needs at least two samples",
            });
        }
        for (&xi, &yi) in x.iter().zip(y) {
            crate::ensure_finite(xi, "spline abscissa")?;
            crate::ensure_finite(yi, "spline ordinate")?;
        }
        if x.windows(2).any(|w| w[1] <= w[0]) {
            return Err(RvError::InvalidArg {
                what: "spline abscissae must be strictly increasing",
            });
        }

        let m = second_derivatives(x, y)?;
        Ok(Self {
            x: x.to_vec(),
            y: y.to_vec(),
            m,
        })
    }

    /// Sample abscissae.
    pub fn knots(&self) -> &[f64] {
        &self.x
    }

    /// Sample ordinates.
    pub fn values(&self) -> &[f64] {
        &self.y
    }

    /// Range covered by the samples.
    pub fn domain(&self) -> (f64, f64) {
        (self.x[0], self.x[self.x.len() - 1])
    }

    /// Evaluate the spline at `xq` (extrapolating outside the domain).
    pub fn eval(&self, xq: f64) -> f64 {
        let k = self.segment(xq);
        let (x0, x1) = (self.x[k], self.x[k + 1]);
        let (y0, y1) = (self.y[k], self.y[k + 1]);
        let (m0, m1) = (self.m[k], self.m[k + 1]);
        let h = x1 - x0;
        let a = x1 - xq;
        let b = xq - x0;

        m0 * a.powi(3) / (6.0 * h)
            + m1 * b.powi(3) / (6.0 * h)
            + (y0 / h - m0 * h / 6.0) * a
            + (y1 / h - m1 * h / 6.0) * b
    }

    /// Evaluate at every point of `xs`.
    pub fn eval_many(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&xq| self.eval(xq)).collect()
    }

    /// Evaluate on `num_points` evenly spaced abscissae across the sample
    /// range. Returns `(x, y)`.
    pub fn sample(&self, num_points: usize) -> (Vec<f64>, Vec<f64>) {
        let (lo, hi) = self.domain();
        let xs = crate::linspace(lo, hi, num_points);
        let ys = self.eval_many(&xs);
        (xs, ys)
    }

    fn segment(&self, xq: f64) -> usize {
        let last = self.x.len() - 2;
        self.x
            .partition_point(|&xi| xi <= xq)
            .saturating_sub(1)
            .min(last)
    }
}

fn second_derivatives(x: &[f64], y: &[f64]) -> RvResult<Vec<f64>> {
    let n = x.len();
    if n == 2 {
        return Ok(vec![0.0; 2]);
    }

    let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
    let rhs: Vec<f64> = (1..n - 1)
        .map(|i| 6.0 * ((y[i + 1] - y[i]) / h[i] - (y[i] - y[i - 1]) / h[i - 1]))
        .collect();

    if n == 3 {
        // Constant curvature: one parabola.
        let m = rhs[0] / (3.0 * (h[0] + h[1]));
        return Ok(vec![m; 3]);
    }

    // Interior unknowns m[1..n-1]; the not-a-knot rows are folded into the
    // first and last interior equations, leaving a tridiagonal system.
    let k = n - 2;
    let mut sub = vec![0.0; k];
    let mut diag = vec![0.0; k];
    let mut sup = vec![0.0; k];
    for j in 0..k {
        let i = j + 1;
        sub[j] = h[i - 1];
        diag[j] = 2.0 * (h[i - 1] + h[i]);
        sup[j] = h[i];
    }

    let (h0, h1) = (h[0], h[1]);
    diag[0] = (h0 + h1) * (h0 + 2.0 * h1) / h1;
    sup[0] = (h1 - h0) * (h1 + h0) / h1;

    let (p, q) = (h[n - 3], h[n - 2]);
    sub[k - 1] = (p - q) * (p + q) / p;
    diag[k - 1] = (p + q) * (2.0 * p + q) / p;

    let inner = solve_tridiagonal(&sub, &diag, &sup, &rhs)?;

    let mut m = Vec::with_capacity(n);
    m.push(((h0 + h1) * inner[0] - h0 * inner[1]) / h1);
    m.extend_from_slice(&inner);
    m.push(((p + q) * inner[k - 1] - q * inner[k - 2]) / p);
    Ok(m)
}

/// Thomas algorithm. `sub[0]` and `sup[last]` are ignored.
fn solve_tridiagonal(sub: &[f64], diag: &[f64], sup: &[f64], rhs: &[f64]) -> RvResult<Vec<f64>> {
    let n = diag.len();
    let mut c = vec![0.0; n];
    let mut d = vec![0.0; n];

    let mut pivot = diag[0];
    for i in 0..n {
        if i > 0 {
            pivot = diag[i] - sub[i] * c[i - 1];
        }
        if pivot == 0.0 || !pivot.is_finite() {
            return Err(RvError::Invariant {
                what: "spline system is singular",
            });
        }
        c[i] = sup[i] / pivot;
        d[i] = if i == 0 {
            rhs[0] / pivot
        } else {
            (rhs[i] - sub[i] * d[i - 1]) / pivot
        };
    }

    for i in (0..n - 1).rev() {
        d[i] -= c[i] * d[i + 1];
    }
    Ok(d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Tolerances, nearly_equal};

    fn tol() -> Tolerances {
        Tolerances {
            abs: 1e-9,
            rel: 1e-9,
        }
    }

    #[test]
    fn passes_through_samples() {
        let x = [0.0, 100.0, 200.0, 300.0, 400.0, 500.0];
        let y = [11.509, 2.032, 7.182, 2.478, 5.511, 10.981];
        let s = CubicSpline::new(&x, &y).unwrap();
        for (&xi, &yi) in x.iter().zip(&y) {
            assert!(nearly_equal(s.eval(xi), yi, tol()));
        }
    }

    #[test]
    fn reproduces_cubic_exactly() {
        // not-a-knot reproduces any cubic, including outside the domain
        let f = |t: f64| 0.5 * t.powi(3) - 2.0 * t * t + t - 3.0;
        let x = [-1.0, 0.0, 0.5, 2.0, 3.0];
        let y: Vec<f64> = x.iter().map(|&t| f(t)).collect();
        let s = CubicSpline::new(&x, &y).unwrap();
        for q in [-2.0, -0.3, 1.1, 2.7, 4.5] {
            assert!(nearly_equal(s.eval(q), f(q), tol()), "q={q}");
        }
    }

    #[test]
    fn long_table_solves_in_one_pass() {
        let x: Vec<f64> = (0..20_000).map(|i| i as f64 * 0.5 + (i % 7) as f64 * 0.01).collect();
        let y: Vec<f64> = x.iter().map(|t| (t * 0.01).sin() * 10.0).collect();
        let s = CubicSpline::new(&x, &y).unwrap();
        for i in (0..x.len()).step_by(997) {
            assert!(nearly_equal(s.eval(x[i]), y[i], tol()), "i={i}");
        }
        let mid = 0.5 * (x[5000] + x[5001]);
        assert!((s.eval(mid) - (mid * 0.01).sin() * 10.0).abs() < 1e-6);
    }

    #[test]
    fn four_points_reproduce_cubic() {
        let f = |t: f64| t.powi(3) - t;
        let x = [0.0, 0.3, 1.7, 2.0];
        let y: Vec<f64> = x.iter().map(|&t| f(t)).collect();
        let s = CubicSpline::new(&x, &y).unwrap();
        for q in [-0.5, 0.1, 1.0, 2.5] {
            assert!(nearly_equal(s.eval(q), f(q), tol()), "q={q}");
        }
    }

    #[test]
    fn three_points_give_parabola() {
        let x = [0.0, 1.0, 3.0];
        let y = [1.0, 2.0, 10.0];
        let s = CubicSpline::new(&x, &y).unwrap();
        // y = x^2 + 1
        assert!(nearly_equal(s.eval(2.0), 5.0, tol()));
        assert!(nearly_equal(s.eval(-1.0), 2.0, tol()));
    }

    #[test]
    fn two_points_give_line() {
        let s = CubicSpline::new(&[0.0, 2.0], &[1.0, 5.0]).unwrap();
        assert!(nearly_equal(s.eval(1.0), 3.0, tol()));
        assert!(nearly_equal(s.eval(3.0), 7.0, tol()));
    }

    #[test]
    fn extrapolation_is_not_clamped() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.0, 1.0, 2.0, 3.0];
        let s = CubicSpline::new(&x, &y).unwrap();
        assert!(nearly_equal(s.eval(10.0), 10.0, tol()));
        assert!(nearly_equal(s.eval(-4.0), -4.0, tol()));
    }

    #[test]
    fn rejects_bad_samples() {
        assert!(matches!(
            CubicSpline::new(&[0.0, 1.0], &[0.0]),
            Err(RvError::LengthMismatch { .. })
        ));
        assert!(CubicSpline::new(&[0.0], &[0.0]).is_err());
        assert!(CubicSpline::new(&[0.0, 0.0, 1.0], &[0.0, 1.0, 2.0]).is_err());
        assert!(CubicSpline::new(&[0.0, 1.0], &[f64::NAN, 1.0]).is_err());
    }

    #[test]
    fn sample_covers_domain() {
        let s = CubicSpline::new(&[0.0, 10.0, 20.0, 40.0], &[0.0, 0.55, 0.75, 0.71]).unwrap();
        let (xs, ys) = s.sample(5);
        assert_eq!(xs, vec![0.0, 10.0, 20.0, 30.0, 40.0]);
        assert!(nearly_equal(ys[1], 0.55, tol()));
        assert_eq!(s.domain(), (0.0, 40.0));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn reproduces_any_cubic(
                c in proptest::array::uniform4(-5.0f64..5.0),
                steps in proptest::collection::vec(0.1f64..2.0, 3..40),
            ) {
                let f = |t: f64| ((c[3] * t + c[2]) * t + c[1]) * t + c[0];
                let mut x = vec![0.0];
                for dx in &steps {
                    x.push(x[x.len() - 1] + dx);
                }
                let y: Vec<f64> = x.iter().map(|&t| f(t)).collect();
                let s = CubicSpline::new(&x, &y).unwrap();
                let (lo, hi) = s.domain();
                for q in crate::linspace(lo, hi, 17) {
                    let tol = Tolerances { abs: 1e-6, rel: 1e-8 };
                    prop_assert!(nearly_equal(s.eval(q), f(q), tol), "q={q}");
                }
            }
        }
    }
}
