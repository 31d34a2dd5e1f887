//! Proximal Operators for Non-smooth Terms
//!
//! The proximal operator of a function $`g`$ with step $`t`$ is
//! ```math
//! \mathrm{prox}_{tg}(z) = \mathrm{arg}\!\min_u \; g(u) + \frac{1}{2t} \| u - z \|_2^2
//! ```
//! For the indicator function of a convex set this is simply the
//! Euclidean projection onto that set, so constrained problems are
//! handled by the same machinery as penalized ones.

mod shrink;
pub use shrink::*;

mod project;
pub use project::*;
