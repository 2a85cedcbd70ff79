//! Finite difference Jacobian computation.

use nalgebra::{DMatrix, DVector};

/// Forward-difference Jacobian of `f` at `x`.
///
/// Column `j` is `(f(x + dx e_j) - f(x)) / dx` with `dx = epsilon * max(|x_j|, 1)`.
/// `f_x` is `f(x)` when the caller already has it.
pub fn finite_difference_jacobian<F, E>(
    x: &DVector<f64>,
    f_x: Option<&DVector<f64>>,
    f: F,
    epsilon: f64,
) -> Result<DMatrix<f64>, E>
where
    F: Fn(&DVector<f64>) -> Result<DVector<f64>, E>,
{
    let n = x.len();
    let owned;
    let f_x = match f_x {
        Some(v) => v,
        None => {
            owned = f(x)?;
            &owned
        }
    };
    let m = f_x.len();

    let mut jac = DMatrix::zeros(m, n);
    for j in 0..n {
        let mut x_perturbed = x.clone();
        let dx = epsilon * x[j].abs().max(1.0);
        x_perturbed[j] += dx;

        let df = (f(&x_perturbed)? - f_x) / dx;
        jac.set_column(j, &df);
    }

    Ok(jac)
}
