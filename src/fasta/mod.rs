//! Forward-Backward Splitting for Composite Functions consisting of
//! a smooth _f_ composed with a linear operator and a non-smooth
//! prox-friendly _g_
//!
//! ```math
//! \min_x \; f(Ax) + g(x)
//! ```
//! This includes common objective functions such as the LASSO, as well
//! as constrained least squares, since a projection is the proximal
//! operator of a constraint set. Ready-made pairs of terms live in
//! [`problems`](../problems/index.html).
//!
//! Three configurations cover most uses:
//! - [`FastaOptions::plain()`](struct.FastaOptions.html#method.plain):
//!   fixed step with backtracking
//! - [`FastaOptions::adaptive()`](struct.FastaOptions.html#method.adaptive):
//!   spectral step sizes (the default)
//! - [`FastaOptions::accelerated()`](struct.FastaOptions.html#method.accelerated):
//!   FISTA momentum with adaptive restart

mod error;
pub use error::*;

mod options;
pub use options::*;

mod terms;
pub use terms::*;

mod history;
pub use history::*;

mod step;

mod solver;
pub use solver::*;

use ndarray::ArrayView;

/// Do nothing function for optional user callback (returns false)
#[allow(clippy::needless_pass_by_value)]
pub fn nop<T, D>(_x: ArrayView<T, D>, _itr: usize) -> bool {
    false
}
