//! Private Module

use std::marker::PhantomData;
use std::time::Instant;

use log::{debug, log, trace, Level};
use ndarray::prelude::*;
use ndarray::NdFloat;
use ndarray_linalg::Scalar;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::step::{
    all_finite, as_f64, cast, gaussian, is_finite, lipschitz_estimate, max, next_momentum, norm,
    spectral_step, sufficient_decrease, Streak, Window,
};
use super::{
    nop, FastaError, FastaOptions, FastaSolution, IterationRecord, ProxTerm, Proximable, Smooth,
    SmoothTerm, Status, StopRule, Term,
};
use crate::diagnostics::{check_gradient, gradient_tolerance};
use crate::linop::{relative_gap, Dimensions, LinearOperator};

/// Fast Adaptive Shrinkage/Thresholding Algorithm
///
/// Minimizes $`f(Ax) + g(x)`$ where $`f`$ is smooth and $`g`$ has an
/// easy proximal operator, by forward-backward splitting with spectral
/// step sizes, non-monotone backtracking and optional FISTA momentum
/// with adaptive restart. See [\[GSB14\]](#references).
///
/// Algorithm
/// ---------
/// ```math
/// \begin{aligned}
/// \hat{x}_{k+1} &= y_k - \tau_k A^H \nabla f(Ay_k) \\
/// x_{k+1} &= \mathrm{prox}_{\tau_k g}(\hat{x}_{k+1})
/// \end{aligned}
/// ```
/// where $`\tau_k`$ is shrunk until
/// $`f(Ax_{k+1}) \leq \max_{j} f(Ay_{k-j}) + \langle x_{k+1} - y_k, \nabla \rangle + \frac{1}{2\tau_k}\|x_{k+1} - y_k\|^2`$.
/// Without momentum $`y_{k+1} = x_{k+1}`$. With momentum and restart, a
/// step that raises $`f + g`$ is retaken from $`x_k`$ with momentum reset,
/// so the recorded objective is non-increasing.
///
/// Parameters
/// ----------
/// - __a, at:__     linear operator $`A`$ and its adjoint
/// - __f:__         smooth function of $`z = Ax`$
/// - __gradf:__     gradient of `f` with respect to $`z`$
/// - __g:__         non-smooth function of $`x`$
/// - __proxg:__     `proxg(z, t)` is the proximal operator of $`tg`$
/// - __x0:__        initial guess
/// - __opts:__      see [`FastaOptions`](struct.FastaOptions.html)
///
/// Errors
/// ------
/// [`FastaError`](enum.FastaError.html) for inconsistent options or
/// operators (before iterating), a failed line search, or a non-finite
/// value from any of the supplied pieces.
///
/// References
/// ----------
/// \[GSB14\]: [ Goldstein T, Studer C, Baraniuk R
///             "A Field Guide to Forward-Backward Splitting with a FASTA
///             Implementation", arxiv 1411.3406, (2014) ](https://arxiv.org/abs/1411.3406)
#[allow(clippy::too_many_arguments)]
pub fn fasta<S, R, Q>(
    a: &R,
    at: &Q,
    f: impl Fn(ArrayView1<S>) -> S,
    gradf: impl Fn(ArrayView1<S>) -> Array1<S>,
    g: impl Fn(ArrayView1<S>) -> S,
    proxg: impl Fn(ArrayView1<S>, S) -> Array1<S>,
    x0: ArrayView1<S>,
    opts: &FastaOptions,
) -> Result<FastaSolution<S>, FastaError>
where
    S: NdFloat + Scalar,
    R: LinearOperator<Elem = S> + Dimensions,
    Q: LinearOperator<Elem = S> + Dimensions,
{
    fasta_with_callback(a, at, f, gradf, g, proxg, x0, opts, nop)
}

/// [`fasta`](fn.fasta.html) with a user callback
///
/// The callback is evaluated with two arguments `(x, iter)`, at `(x0, 0)`
/// and then after each iteration. If it returns `true` the solver stops
/// with [`Status::Stopped`](enum.Status.html).
#[allow(clippy::too_many_arguments)]
pub fn fasta_with_callback<S, R, Q>(
    a: &R,
    at: &Q,
    f: impl Fn(ArrayView1<S>) -> S,
    gradf: impl Fn(ArrayView1<S>) -> Array1<S>,
    g: impl Fn(ArrayView1<S>) -> S,
    proxg: impl Fn(ArrayView1<S>, S) -> Array1<S>,
    x0: ArrayView1<S>,
    opts: &FastaOptions,
    callback: impl FnMut(ArrayView1<S>, usize) -> bool,
) -> Result<FastaSolution<S>, FastaError>
where
    S: NdFloat + Scalar,
    R: LinearOperator<Elem = S> + Dimensions,
    Q: LinearOperator<Elem = S> + Dimensions,
{
    minimize(
        a,
        at,
        &Smooth { f, gradf },
        &Proximable { g, proxg },
        x0,
        opts,
        callback,
    )
}

/// [`fasta`](fn.fasta.html) over [`SmoothTerm`](trait.SmoothTerm.html)
/// and [`ProxTerm`](trait.ProxTerm.html) implementations
pub fn minimize<S, R, Q, F, G>(
    a: &R,
    at: &Q,
    f: &F,
    g: &G,
    x0: ArrayView1<S>,
    opts: &FastaOptions,
    mut callback: impl FnMut(ArrayView1<S>, usize) -> bool,
) -> Result<FastaSolution<S>, FastaError>
where
    S: NdFloat + Scalar,
    R: LinearOperator<Elem = S> + Dimensions,
    Q: LinearOperator<Elem = S> + Dimensions,
    F: SmoothTerm<S> + ?Sized,
    G: ProxTerm<S> + ?Sized,
{
    let start = Instant::now();
    opts.validate()?;
    if !all_finite(x0) {
        return Err(FastaError::invalid("x0 has non-finite entries"));
    }

    let eval = Evaluator {
        a,
        at,
        f,
        g,
        phantom: PhantomData,
    };
    let n = x0.len();
    let ax0 = eval.check_dimensions(x0)?;
    let m = ax0.len();

    let mut rng = StdRng::seed_from_u64(opts.seed);
    if opts.check_adjoint {
        let x: Array1<S> = gaussian(n, &mut rng);
        let y: Array1<S> = gaussian(m, &mut rng);
        let gap = eval.adjoint_gap(x.view(), y.view())?;
        if !(gap <= cast(1e-3)) {
            return Err(FastaError::invalid(format!(
                "At is not the adjoint of A (relative inner product error {:e})",
                as_f64(gap)
            )));
        }
    }
    if opts.check_gradient {
        eval.f_value(ax0.view(), 0)?;
        eval.smooth_gradient(ax0.view(), 0)?;
        // gradf was finite at Ax0, so a non-finite error comes from f
        let err = check_gradient(|z| f.value(z), |z| f.gradient(z), ax0.view());
        if !is_finite(err) {
            return Err(FastaError::NumericalError {
                iteration: 0,
                term: Term::F,
            });
        }
        if !(err <= gradient_tolerance()) {
            return Err(FastaError::invalid(format!(
                "gradf disagrees with finite differences of f (relative error {:e})",
                as_f64(err)
            )));
        }
    }

    if opts.max_iters == 0 {
        return Ok(FastaSolution {
            x: x0.to_owned(),
            status: Status::MaxIterationsReached,
            iterations: 0,
            history: Vec::new(),
            best: None,
            best_objective: None,
            lipschitz: None,
            initial_step: None,
            total_backtracks: 0,
            restarts: 0,
            elapsed: start.elapsed(),
        });
    }

    let (lipschitz, tau0) = match (opts.tau, opts.lipschitz) {
        (Some(tau), _) => (S::one() / cast(tau), cast(tau)),
        (None, Some(l)) => (cast(l), S::one() / cast(l)),
        (None, None) => {
            let l = eval.estimate_lipschitz(n, &mut rng)?;
            (l, cast::<S>(0.2) / l)
        }
    };
    debug!(
        "fasta: n = {}, m = {}, L = {:e}, initial step {:e}",
        n, m, lipschitz, tau0
    );

    let level = if opts.verbose {
        Level::Info
    } else {
        Level::Trace
    };
    let tol: S = cast(opts.tol);
    let eps_r: S = cast(opts.eps_r);
    let eps_n: S = cast(opts.eps_n);
    // accelerated runs with restart never accept an objective increase
    let monotone = opts.accelerate && opts.restart;

    // x is the last proximal output, y the point the next gradient step
    // starts from; they differ only under momentum. d and dy cache A x
    // and A y.
    let mut x = x0.to_owned();
    let mut d = ax0;
    let mut f_x = eval.f_value(d.view(), 0)?;
    let mut obj_x: Option<S> = None;
    let mut y = x.clone();
    let mut dy = d.clone();
    let mut grad = eval.gradient(dy.view(), 0)?;
    let mut tau = tau0;
    let mut alpha = S::one();
    let mut window = Window::new(opts.window);
    window.push(f_x);

    let mut history = Vec::new();
    let mut best: Option<(Array1<S>, S)> = None;
    let mut first_residual: Option<S> = None;
    let mut streak = Streak::new(opts.stop_count);
    let mut iterations = 0;
    let mut total_backtracks = 0;
    let mut restarts = 0;
    let mut status = Status::MaxIterationsReached;

    if callback(x.view(), 0) {
        status = Status::Stopped;
    } else {
        for iter in 1..=opts.max_iters {
            if let Some(limit) = opts.max_time {
                if start.elapsed() >= limit {
                    status = Status::TimeLimitReached;
                    break;
                }
            }
            iterations = iter;
            debug_assert!(tau > S::zero());

            let mut trial =
                eval.forward_backward(y.view(), grad.view(), tau, window.max(), opts, iter)?;
            let mut restarted = false;
            let objective = if opts.record_history || monotone {
                let mut obj = trial.f + eval.g_value(trial.x.view(), iter)?;
                if monotone {
                    let prev = match obj_x {
                        Some(prev) => prev,
                        None => f_x + eval.g_value(x.view(), iter)?,
                    };
                    if obj > prev {
                        // momentum raised the objective: drop it and step from x
                        alpha = S::one();
                        restarted = true;
                        restarts += 1;
                        y = x.clone();
                        dy = d.clone();
                        grad = eval.gradient(dy.view(), iter)?;
                        let spent = trial.backtracks;
                        trial =
                            eval.forward_backward(y.view(), grad.view(), trial.tau, f_x, opts, iter)?;
                        trial.backtracks += spent;
                        obj = trial.f + eval.g_value(trial.x.view(), iter)?;
                        trace!("iter {}: objective increased, momentum restart", iter);
                    }
                }
                Some(obj)
            } else {
                None
            };
            if trial.backtracks > 0 {
                trace!(
                    "iter {}: {} backtracks, step {:e}",
                    iter,
                    trial.backtracks,
                    trial.tau
                );
            }
            total_backtracks += trial.backtracks;
            let step = trial.tau;

            let residual = norm((&trial.x - &y).view()) / step;
            let prox_shift = norm((&trial.x - &trial.xhat).view()) / step;
            let normalized = residual / (max(norm(grad.view()), prox_shift) + eps_n);
            let r1 = *first_residual.get_or_insert(residual);
            let rule_holds = match opts.stop_rule {
                StopRule::Residual => residual / (r1 + eps_r) < tol,
                StopRule::Normalized => normalized < tol,
                StopRule::Hybrid => residual / (r1 + eps_r) < tol || normalized < tol,
                StopRule::Iterations => false,
            };
            let converged = streak.update(rule_holds);

            if let Some(obj) = objective {
                if opts.record_history && best.as_ref().map_or(true, |(_, b)| obj < *b) {
                    best = Some((trial.x.clone(), obj));
                }
            }
            log!(
                level,
                "iter {:>5}: step {:.3e}, residual {:.3e}, normalized {:.3e}, f {:.6e}",
                iter,
                step,
                residual,
                normalized,
                trial.f
            );

            // choose the next lookahead point and step
            if !converged {
                let (y_next, dy_next) = if opts.accelerate {
                    if opts.restart
                        && !restarted
                        && (&y - &trial.x).dot(&(&trial.x - &x)) > S::zero()
                    {
                        alpha = S::one();
                        restarted = true;
                        restarts += 1;
                        trace!("iter {}: momentum restart", iter);
                    }
                    let alpha_next = next_momentum(alpha);
                    let beta = (alpha - S::one()) / alpha_next;
                    alpha = alpha_next;
                    (
                        &trial.x + &((&trial.x - &x) * beta),
                        &trial.d + &((&trial.d - &d) * beta),
                    )
                } else {
                    (trial.x.clone(), trial.d.clone())
                };
                let grad_next = eval.gradient(dy_next.view(), iter)?;
                tau = if opts.adaptive_step {
                    spectral_step((&y_next - &y).view(), (&grad_next - &grad).view(), step)
                } else {
                    step
                };
                window.push(if opts.accelerate {
                    eval.f_value(dy_next.view(), iter)?
                } else {
                    trial.f
                });
                y = y_next;
                dy = dy_next;
                grad = grad_next;
            }
            x = trial.x;
            d = trial.d;
            f_x = trial.f;
            obj_x = objective;

            if opts.record_history {
                if let Some(objective) = objective {
                    history.push(IterationRecord {
                        iteration: iter,
                        f_value: f_x,
                        objective,
                        residual,
                        normalized_residual: normalized,
                        step,
                        backtracks: trial.backtracks,
                        restarted,
                    });
                }
            }

            let stop = callback(x.view(), iter);
            if converged {
                status = Status::Converged;
                break;
            }
            if stop {
                status = Status::Stopped;
                break;
            }
        }
    }

    debug!(
        "fasta: {:?} after {} iterations ({} backtracks, {} restarts) in {:?}",
        status,
        iterations,
        total_backtracks,
        restarts,
        start.elapsed()
    );
    let (best, best_objective) = match best {
        Some((xb, ob)) => (Some(xb), Some(ob)),
        None => (None, None),
    };
    Ok(FastaSolution {
        x,
        status,
        iterations,
        history,
        best,
        best_objective,
        lipschitz: Some(lipschitz),
        initial_step: Some(tau0),
        total_backtracks,
        restarts,
        elapsed: start.elapsed(),
    })
}

/// Outcome of one forward-backward step
struct Trial<S> {
    /// $`\mathrm{prox}_{\tau g}(\hat{x})`$
    x: Array1<S>,
    xhat: Array1<S>,
    /// $`Ax`$
    d: Array1<S>,
    /// $`f(Ax)`$
    f: S,
    tau: S,
    backtracks: usize,
}

/// Evaluates the problem pieces, rejecting non-finite output
struct Evaluator<'p, S, R, Q, F: ?Sized, G: ?Sized> {
    a: &'p R,
    at: &'p Q,
    f: &'p F,
    g: &'p G,
    phantom: PhantomData<S>,
}

impl<'p, S, R, Q, F, G> Evaluator<'p, S, R, Q, F, G>
where
    S: NdFloat + Scalar,
    R: LinearOperator<Elem = S> + Dimensions,
    Q: LinearOperator<Elem = S> + Dimensions,
    F: SmoothTerm<S> + ?Sized,
    G: ProxTerm<S> + ?Sized,
{
    fn vector(v: Array1<S>, iteration: usize, term: Term) -> Result<Array1<S>, FastaError> {
        if all_finite(v.view()) {
            Ok(v)
        } else {
            Err(FastaError::NumericalError { iteration, term })
        }
    }

    fn scalar(v: S, iteration: usize, term: Term) -> Result<S, FastaError> {
        if is_finite(v) {
            Ok(v)
        } else {
            Err(FastaError::NumericalError { iteration, term })
        }
    }

    fn forward(&self, x: ArrayView1<S>, iteration: usize) -> Result<Array1<S>, FastaError> {
        Self::vector(self.a.apply(&x), iteration, Term::A)
    }

    /// $`\nabla f(z)`$
    fn smooth_gradient(&self, z: ArrayView1<S>, iteration: usize) -> Result<Array1<S>, FastaError> {
        Self::vector(self.f.gradient(z), iteration, Term::GradF)
    }

    /// $`A^H \nabla f(z)`$
    fn gradient(&self, z: ArrayView1<S>, iteration: usize) -> Result<Array1<S>, FastaError> {
        let gz = self.smooth_gradient(z, iteration)?;
        Self::vector(self.at.apply(&gz), iteration, Term::At)
    }

    fn f_value(&self, z: ArrayView1<S>, iteration: usize) -> Result<S, FastaError> {
        Self::scalar(self.f.value(z), iteration, Term::F)
    }

    fn g_value(&self, x: ArrayView1<S>, iteration: usize) -> Result<S, FastaError> {
        Self::scalar(self.g.value(x), iteration, Term::G)
    }

    fn prox(&self, z: ArrayView1<S>, t: S, iteration: usize) -> Result<Array1<S>, FastaError> {
        Self::vector(self.g.prox(z, t), iteration, Term::ProxG)
    }

    /// Shape checks, returning $`Ax_0`$
    fn check_dimensions(&self, x0: ArrayView1<S>) -> Result<Array1<S>, FastaError> {
        let n = x0.len();
        if let Some((_, cols)) = self.a.dims() {
            if cols != n {
                return Err(FastaError::invalid(format!(
                    "A acts on vectors of length {} but x0 has length {}",
                    cols, n
                )));
            }
        }
        if let Some((rows, _)) = self.at.dims() {
            if rows != n {
                return Err(FastaError::invalid(format!(
                    "At produces vectors of length {} but x0 has length {}",
                    rows, n
                )));
            }
        }

        let ax0 = self.forward(x0, 0)?;
        if let Some((_, cols)) = self.at.dims() {
            if cols != ax0.len() {
                return Err(FastaError::invalid(format!(
                    "A produces vectors of length {} but At acts on length {}",
                    ax0.len(),
                    cols
                )));
            }
        }
        let back = Self::vector(self.at.apply(&ax0), 0, Term::At)?;
        if back.len() != n {
            return Err(FastaError::invalid(format!(
                "At(A x0) has length {} but x0 has length {}",
                back.len(),
                n
            )));
        }
        Ok(ax0)
    }

    /// Forward-backward step from `y`, shrinking the step until `f`
    /// decreases sufficiently relative to `f_max`
    fn forward_backward(
        &self,
        y: ArrayView1<S>,
        grad: ArrayView1<S>,
        tau: S,
        f_max: S,
        opts: &FastaOptions,
        iteration: usize,
    ) -> Result<Trial<S>, FastaError> {
        let shrink: S = cast(opts.shrink_factor());
        let mut tau = tau;
        let mut backtracks = 0;
        loop {
            let xhat = &y - &(&grad * tau);
            let x = self.prox(xhat.view(), tau, iteration)?;
            let d = self.forward(x.view(), iteration)?;
            let f = self.f_value(d.view(), iteration)?;
            let dx = &x - &y;
            if !opts.backtrack || sufficient_decrease(f, f_max, dx.view(), grad, tau) {
                return Ok(Trial {
                    x,
                    xhat,
                    d,
                    f,
                    tau,
                    backtracks,
                });
            }
            if backtracks == opts.backtrack_max {
                return Err(FastaError::StepSizeFailure {
                    iteration,
                    step: as_f64(tau),
                    backtracks,
                });
            }
            tau = tau * shrink;
            backtracks += 1;
        }
    }

    /// Relative gap between $`\langle Ax, y \rangle`$ and
    /// $`\langle x, A^H y \rangle`$, with both products checked
    fn adjoint_gap(&self, x: ArrayView1<S>, y: ArrayView1<S>) -> Result<S, FastaError> {
        let ax = self.forward(x, 0)?;
        let aty = Self::vector(self.at.apply(&y), 0, Term::At)?;
        Ok(relative_gap(ax.dot(&y), x.dot(&aty)))
    }

    /// Gradient Lipschitz constant from two random points
    fn estimate_lipschitz(&self, n: usize, rng: &mut StdRng) -> Result<S, FastaError> {
        let x1: Array1<S> = gaussian(n, rng);
        let x2: Array1<S> = gaussian(n, rng);
        let g1 = self.gradient(self.forward(x1.view(), 0)?.view(), 0)?;
        let g2 = self.gradient(self.forward(x2.view(), 0)?.view(), 0)?;
        Ok(lipschitz_estimate(x1.view(), x2.view(), g1.view(), g2.view()))
    }
}


#[cfg(all(rustc_nightly, test))]
mod benches {
    use super::*;
    use crate::linop::Adjoint;
    use crate::prox::shrink;
    use ndarray_rand::RandomExt;
    use rand_distr::StandardNormal;
    use test::Bencher;

    #[bench]
    #[allow(non_snake_case)]
    fn sparse_least_squares_200x1000(bench: &mut Bencher) {
        let mut rng = StdRng::seed_from_u64(0);
        let A = Array2::<f64>::random_using((200, 1000), StandardNormal, &mut rng) / 200f64.sqrt();
        let mut x = Array1::<f64>::zeros(1000);
        for i in (0..1000).step_by(100) {
            x[i] = 1.;
        }
        let b = A.dot(&x);
        let x0 = Array1::zeros(1000);
        bench.iter(|| {
            fasta(
                &A,
                &A.adj(),
                |z| 0.5 * (&z - &b).mapv(|v| v * v).sum(),
                |z| &z - &b,
                |x| 0.02 * x.fold(0., |acc, v| acc + v.abs()),
                |z, t| shrink(z, t * 0.02),
                x0.view(),
                &FastaOptions::default(),
            )
        });
    }
}
