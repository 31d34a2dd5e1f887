use ndarray::prelude::*;
use ndarray::{Data, NdFloat};
use ndarray_linalg::Scalar;

use super::{check_parameter, check_rows, L1Norm, Logistic};
use crate::fasta::{minimize, nop, FastaError, FastaOptions, FastaSolution};
use crate::linop::Adjoint;

/// Sparse logistic regression
///
/// ```math
/// \min_x \; \mu\|x\|_1 + \sum_i \log\left(1 + e^{-y_i (Ax)_i}\right)
/// ```
/// Rows of `a` are samples, columns are features, and every label
/// must be exactly `-1` or `+1`.
pub fn logistic_regression<S, Sa>(
    a: &ArrayBase<Sa, Ix2>,
    labels: ArrayView1<S>,
    mu: S,
    x0: ArrayView1<S>,
    opts: &FastaOptions,
) -> Result<FastaSolution<S>, FastaError>
where
    S: NdFloat + Scalar,
    Sa: Data<Elem = S>,
{
    check_parameter("mu", mu)?;
    check_rows(a.nrows(), labels.len(), "labels")?;
    let one = S::one();
    if let Some(bad) = labels.iter().find(|&&y| y != one && y != -one) {
        return Err(FastaError::InvalidConfiguration(format!(
            "labels must be -1 or +1, got {}",
            bad
        )));
    }
    minimize(
        a,
        &a.adj(),
        &Logistic::new(labels),
        &L1Norm { mu },
        x0,
        opts,
        nop,
    )
}
