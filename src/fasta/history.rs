use std::time::Duration;

use ndarray::prelude::*;

/// How a successful run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The stopping rule held for the required number of iterations.
    Converged,
    /// Ran out of iterations. The last and best iterates are still returned.
    MaxIterationsReached,
    /// Ran out of wall-clock time.
    TimeLimitReached,
    /// The user callback asked to stop.
    Stopped,
}

/// Diagnostics for one iteration
#[derive(Debug, Clone, PartialEq)]
pub struct IterationRecord<S> {
    /// 1-based.
    pub iteration: usize,
    /// $`f(Ax_k)`$
    pub f_value: S,
    /// $`f(Ax_k) + g(x_k)`$
    pub objective: S,
    pub residual: S,
    pub normalized_residual: S,
    /// Step used for this iteration, after any backtracking.
    pub step: S,
    pub backtracks: usize,
    /// Momentum was reset after this iteration.
    pub restarted: bool,
}

/// Output of [`fasta`](fn.fasta.html)
#[derive(Debug, Clone)]
pub struct FastaSolution<S> {
    /// Final iterate (the output of the last proximal step).
    pub x: Array1<S>,
    pub status: Status,
    pub iterations: usize,
    /// One record per iteration when `record_history` is set, else empty.
    pub history: Vec<IterationRecord<S>>,
    /// Iterate with the lowest objective seen, when history is recorded.
    pub best: Option<Array1<S>>,
    pub best_objective: Option<S>,
    /// Lipschitz constant used to pick the first step. `None` when no
    /// iteration was requested.
    pub lipschitz: Option<S>,
    pub initial_step: Option<S>,
    pub total_backtracks: usize,
    pub restarts: usize,
    pub elapsed: Duration,
}

impl<S> FastaSolution<S> {
    pub fn converged(&self) -> bool {
        self.status == Status::Converged
    }

    /// The best iterate if one was recorded, otherwise the final one.
    pub fn solution(&self) -> ArrayView1<S> {
        self.best.as_ref().unwrap_or(&self.x).view()
    }

    pub fn objectives(&self) -> impl Iterator<Item = &S> + '_ {
        self.history.iter().map(|rec| &rec.objective)
    }

    pub fn steps(&self) -> impl Iterator<Item = &S> + '_ {
        self.history.iter().map(|rec| &rec.step)
    }

    pub fn residuals(&self) -> impl Iterator<Item = &S> + '_ {
        self.history.iter().map(|rec| &rec.residual)
    }
}
