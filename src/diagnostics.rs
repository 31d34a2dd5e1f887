//! Sanity checks for user-supplied problem pieces

use ndarray::prelude::*;
use ndarray::NdFloat;

/// Compare an analytic gradient against central differences
///
/// Returns the largest absolute discrepancy over all coordinates,
/// relative to $`\max(1, \|\nabla f(z)\|_\infty)`$. NaN if either side
/// produced a non-finite value.
///
/// Parameters
/// ----------
/// - __f:__       scalar function
/// - __gradf:__   its claimed gradient
/// - __z:__       point to check at
pub fn check_gradient<S: NdFloat>(
    f: impl Fn(ArrayView1<S>) -> S,
    gradf: impl Fn(ArrayView1<S>) -> Array1<S>,
    z: ArrayView1<S>,
) -> S {
    let grad = gradf(z);
    let two = S::from(2.).unwrap();
    let base = S::epsilon().cbrt();
    let scale = grad.fold(S::one(), |acc, g| acc.max(g.abs()));

    let mut shifted = z.to_owned();
    let mut worst = S::zero();
    for (i, &zi) in z.iter().enumerate() {
        let h = base * zi.abs().max(S::one());
        shifted[i] = zi + h;
        let f_plus = f(shifted.view());
        shifted[i] = zi - h;
        let f_minus = f(shifted.view());
        shifted[i] = zi;

        let err = ((f_plus - f_minus) / (two * h) - grad[i]).abs();
        if err.is_nan() {
            return S::nan();
        }
        worst = worst.max(err);
    }
    worst / scale
}

/// Largest [`check_gradient`](fn.check_gradient.html) value accepted
/// as agreement: the cube root of machine epsilon.
pub fn gradient_tolerance<S: NdFloat>() -> S {
    S::epsilon().cbrt()
}
