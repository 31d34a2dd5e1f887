use ndarray::prelude::*;
use ndarray::{Data, NdFloat};
use ndarray_linalg::Scalar;

use super::{check_parameter, check_rows, L1Ball, L1Norm, LeastSquares, LinfNorm, NonNegative};
use crate::fasta::{minimize, nop, FastaError, FastaOptions, FastaSolution};
use crate::linop::Adjoint;

/// Sparse least squares
///
/// ```math
/// \min_x \; \mu\|x\|_1 + \frac12\|Ax - b\|_2^2
/// ```
///
/// Parameters
/// ----------
/// - __a:__       measurement matrix, `m x n`
/// - __b:__       measurements, length `m`
/// - __mu:__      sparsity weight, non-negative
/// - __x0:__      initial guess, length `n`
/// - __opts:__    solver options
pub fn sparse_least_squares<S, Sa>(
    a: &ArrayBase<Sa, Ix2>,
    b: ArrayView1<S>,
    mu: S,
    x0: ArrayView1<S>,
    opts: &FastaOptions,
) -> Result<FastaSolution<S>, FastaError>
where
    S: NdFloat + Scalar,
    Sa: Data<Elem = S>,
{
    check_parameter("mu", mu)?;
    check_rows(a.nrows(), b.len(), "b")?;
    minimize(
        a,
        &a.adj(),
        &LeastSquares::new(b),
        &L1Norm { mu },
        x0,
        opts,
        nop,
    )
}

/// Least squares over an L1 ball
///
/// ```math
/// \min_x \; \frac12\|Ax - b\|_2^2 \quad \text{s.t.} \quad \|x\|_1 \leq \lambda
/// ```
pub fn lasso<S, Sa>(
    a: &ArrayBase<Sa, Ix2>,
    b: ArrayView1<S>,
    radius: S,
    x0: ArrayView1<S>,
    opts: &FastaOptions,
) -> Result<FastaSolution<S>, FastaError>
where
    S: NdFloat + Scalar,
    Sa: Data<Elem = S>,
{
    check_parameter("radius", radius)?;
    check_rows(a.nrows(), b.len(), "b")?;
    minimize(
        a,
        &a.adj(),
        &LeastSquares::new(b),
        &L1Ball { radius },
        x0,
        opts,
        nop,
    )
}

/// Non-negative least squares
///
/// ```math
/// \min_{x \geq 0} \; \frac12\|Ax - b\|_2^2
/// ```
pub fn nonneg_least_squares<S, Sa>(
    a: &ArrayBase<Sa, Ix2>,
    b: ArrayView1<S>,
    x0: ArrayView1<S>,
    opts: &FastaOptions,
) -> Result<FastaSolution<S>, FastaError>
where
    S: NdFloat + Scalar,
    Sa: Data<Elem = S>,
{
    check_rows(a.nrows(), b.len(), "b")?;
    minimize(
        a,
        &a.adj(),
        &LeastSquares::new(b),
        &NonNegative,
        x0,
        opts,
        nop,
    )
}

/// Democratic representation
///
/// ```math
/// \min_x \; \mu\|x\|_\infty + \frac12\|Ax - b\|_2^2
/// ```
/// Spreads the energy of `b` evenly over the coefficients, the
/// opposite of the sparse representation.
pub fn democratic_representation<S, Sa>(
    a: &ArrayBase<Sa, Ix2>,
    b: ArrayView1<S>,
    mu: S,
    x0: ArrayView1<S>,
    opts: &FastaOptions,
) -> Result<FastaSolution<S>, FastaError>
where
    S: NdFloat + Scalar,
    Sa: Data<Elem = S>,
{
    check_parameter("mu", mu)?;
    check_rows(a.nrows(), b.len(), "b")?;
    minimize(
        a,
        &a.adj(),
        &LeastSquares::new(b),
        &LinfNorm { mu },
        x0,
        opts,
        nop,
    )
}

#[allow(non_snake_case)]
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray_rand::RandomExt;
    use rand::rngs::StdRng;
    use rand::distributions::Uniform;
    use rand::SeedableRng;
    use rand_distr::StandardNormal;

    fn gaussian_matrix(rng: &mut StdRng, m: usize, n: usize) -> Array2<f64> {
        Array2::<f64>::random_using((m, n), StandardNormal, rng) / (m as f64).sqrt()
    }

    #[test]
    fn sparse_recovery() {
        let mut rng = StdRng::seed_from_u64(42);
        let (m, n) = (100, 200);
        let A = gaussian_matrix(&mut rng, m, n);
        let mut x = Array1::<f64>::zeros(n);
        for &i in &[5, 40, 77, 150, 190] {
            x[i] = if i % 2 == 0 { 1. } else { -1. };
        }
        let b = A.dot(&x);
        let opts = FastaOptions {
            tol: 1e-6,
            ..Default::default()
        };
        let sol =
            sparse_least_squares(&A, b.view(), 0.01, Array1::zeros(n).view(), &opts).unwrap();
        let found: Vec<usize> = (0..n).filter(|&i| sol.x[i].abs() > 0.5).collect();
        assert_eq!(found, vec![5, 40, 77, 150, 190]);
        assert_abs_diff_eq!(sol.x, x, epsilon = 0.1);
    }

    #[test]
    fn lasso_stays_in_the_ball() {
        let mut rng = StdRng::seed_from_u64(7);
        let A = gaussian_matrix(&mut rng, 30, 60);
        let b = Array1::<f64>::random_using(30, StandardNormal, &mut rng);
        let sol = lasso(&A, b.view(), 2., Array1::zeros(60).view(), &Default::default()).unwrap();
        let l1 = sol.x.fold(0., |acc, v| acc + v.abs());
        assert!(l1 <= 2. + 1e-9, "|x|_1 = {}", l1);
        // b is not reachable within the ball, so the constraint is active
        assert_abs_diff_eq!(l1, 2., epsilon = 1e-6);
    }

    #[test]
    fn nonneg_recovers_nonneg_truth() {
        let mut rng = StdRng::seed_from_u64(1);
        let A = gaussian_matrix(&mut rng, 60, 30);
        let x = Array1::<f64>::random_using(30, Uniform::new(0., 1.), &mut rng);
        let b = A.dot(&x);
        let opts = FastaOptions {
            tol: 1e-8,
            max_iters: 5000,
            ..Default::default()
        };
        let sol = nonneg_least_squares(&A, b.view(), Array1::zeros(30).view(), &opts).unwrap();
        assert!(sol.x.iter().all(|&v| v >= 0.));
        assert_abs_diff_eq!(sol.x, x, epsilon = 1e-3);
    }

    #[test]
    fn democratic_flattens_coefficients() {
        let A = Array2::<f64>::eye(3);
        let b = array![3., -1., 0.5];
        let opts = FastaOptions {
            tol: 1e-8,
            ..Default::default()
        };
        let sol =
            democratic_representation(&A, b.view(), 3., Array1::zeros(3).view(), &opts).unwrap();
        assert_abs_diff_eq!(sol.x, array![0.5, -0.5, 0.5], epsilon = 1e-6);
    }

    #[test]
    fn bad_arguments() {
        let A = Array2::<f64>::eye(3);
        let b = array![1., 2.];
        let x0 = Array1::zeros(3);
        let opts = FastaOptions::default();
        assert!(matches!(
            sparse_least_squares(&A, b.view(), 0.1, x0.view(), &opts),
            Err(FastaError::InvalidConfiguration(_))
        ));
        let b = array![1., 2., 3.];
        assert!(matches!(
            sparse_least_squares(&A, b.view(), -0.1, x0.view(), &opts),
            Err(FastaError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            lasso(&A, b.view(), f64::NAN, x0.view(), &opts),
            Err(FastaError::InvalidConfiguration(_))
        ));
    }
}
