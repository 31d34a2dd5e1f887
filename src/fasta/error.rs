use std::fmt;

/// The caller-supplied pieces of a composite problem, used to report
/// which one produced a bad value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Term {
    A,
    At,
    F,
    GradF,
    G,
    ProxG,
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Term::A => "A",
            Term::At => "At",
            Term::F => "f",
            Term::GradF => "gradf",
            Term::G => "g",
            Term::ProxG => "proxg",
        };
        f.write_str(name)
    }
}

/// Ways a call to the solver can fail.
///
/// Running out of iterations is not an error; it is reported through
/// [`Status::MaxIterationsReached`](enum.Status.html).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FastaError {
    /// Rejected before the first iteration.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Backtracking could not find a step with sufficient decrease.
    #[error(
        "no step with sufficient decrease at iteration {iteration} after {backtracks} backtracks (last step {step:e})"
    )]
    StepSizeFailure {
        iteration: usize,
        step: f64,
        backtracks: usize,
    },

    /// A term produced NaN or infinity. Iteration 0 covers the setup
    /// evaluations made before the first step.
    #[error("non-finite value produced by {term} at iteration {iteration}")]
    NumericalError { iteration: usize, term: Term },
}

impl FastaError {
    pub(crate) fn invalid(msg: impl Into<String>) -> FastaError {
        FastaError::InvalidConfiguration(msg.into())
    }
}
