//! The `ndarray-fasta` crate solves composite problems of the form
//! ```math
//! \min_x \; f(Ax) + g(x)
//! ```
//! where $`f`$ is smooth, $`A`$ is a linear operator and $`g`$ is
//! non-smooth but has an easy proximal operator, using forward-backward
//! splitting with adaptive steps (FASTA).
//!
//! It includes:
//! - the [`fasta`](fasta/fn.fasta.html) solver, with spectral step sizes,
//!   non-monotone backtracking and FISTA acceleration with restart
//! - [proximal operators](prox/index.html) for common norms and sets
//! - [ready-made problems](problems/index.html) such as sparse least
//!   squares, the LASSO and logistic regression
//! - checks for [adjoints](linop/fn.check_adjoint.html) and
//!   [gradients](diagnostics/fn.check_gradient.html)
//!
//! Progress is reported through the `log` crate: a summary at `debug`,
//! per-iteration lines at `trace` (or `info` with `verbose` set).
//!
//! ```no_run
//! # extern crate intel_mkl_src;
//! use ndarray::prelude::*;
//! use ndarray_fasta::fasta::{fasta, FastaOptions};
//! use ndarray_fasta::linop::Adjoint;
//! use ndarray_fasta::prox::shrink;
//!
//! let a: Array2<f64> = array![[1., 0.5], [0., 2.], [1., 1.]];
//! let b: Array1<f64> = array![1., 2., 2.];
//! let mu = 0.1f64;
//! let sol = fasta(
//!     &a,
//!     &a.adj(),
//!     |z| 0.5 * (&z - &b).mapv(|v| v * v).sum(),
//!     |z| &z - &b,
//!     |x: ArrayView1<f64>| mu * x.fold(0., |acc, v| acc + v.abs()),
//!     |z, t| shrink(z, t * mu),
//!     Array1::zeros(2).view(),
//!     &FastaOptions::default(),
//! )
//! .unwrap();
//! println!("{} after {} iterations", sol.x, sol.iterations);
//! ```

#![cfg_attr(all(rustc_nightly, test), feature(test))]
#[cfg(all(rustc_nightly, test))]
extern crate test;

#[cfg(test)]
extern crate intel_mkl_src;

pub mod diagnostics;
pub mod fasta;
pub mod linop;
pub mod problems;
pub mod prox;
