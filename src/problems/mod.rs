//! Common Composite Problems
//!
//! Smooth and non-smooth terms for the problems that come up most often
//! with forward-backward splitting, and one-call solvers that pair them
//! with a matrix $`A`$ (its transpose serving as the adjoint).
//!
//! | problem | objective |
//! |---------|-----------|
//! | [`sparse_least_squares`](fn.sparse_least_squares.html) | $`\mu\|x\|_1 + \frac12\|Ax-b\|_2^2`$ |
//! | [`lasso`](fn.lasso.html) | $`\frac12\|Ax-b\|_2^2`$ s.t. $`\|x\|_1 \leq \lambda`$ |
//! | [`nonneg_least_squares`](fn.nonneg_least_squares.html) | $`\frac12\|Ax-b\|_2^2`$ s.t. $`x \geq 0`$ |
//! | [`democratic_representation`](fn.democratic_representation.html) | $`\mu\|x\|_\infty + \frac12\|Ax-b\|_2^2`$ |
//! | [`logistic_regression`](fn.logistic_regression.html) | $`\mu\|x\|_1 + \sum_i \log(1 + e^{-y_i (Ax)_i})`$ |

mod terms;
pub use terms::*;

mod least_squares;
pub use least_squares::*;

mod logistic;
pub use logistic::*;

use ndarray::NdFloat;

use crate::fasta::FastaError;

fn check_parameter<S: NdFloat>(name: &str, v: S) -> Result<(), FastaError> {
    if v.is_finite() && v >= S::zero() {
        Ok(())
    } else {
        Err(FastaError::InvalidConfiguration(format!(
            "{} must be finite and non-negative, got {}",
            name, v
        )))
    }
}

fn check_rows(rows: usize, len: usize, what: &str) -> Result<(), FastaError> {
    if rows == len {
        Ok(())
    } else {
        Err(FastaError::InvalidConfiguration(format!(
            "A has {} rows but {} has length {}",
            rows, what, len
        )))
    }
}
