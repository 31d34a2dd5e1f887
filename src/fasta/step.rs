//! Step size selection and small numeric helpers for the solver

use std::collections::VecDeque;

use ndarray::prelude::*;
use ndarray::NdFloat;
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::StandardNormal;

pub(crate) fn cast<S: NdFloat>(v: f64) -> S {
    S::from(v).unwrap()
}

pub(crate) fn as_f64<S: NdFloat>(v: S) -> f64 {
    v.to_f64().unwrap_or(f64::NAN)
}

pub(crate) fn norm<S: NdFloat>(x: ArrayView1<S>) -> S {
    x.dot(&x).sqrt()
}

pub(crate) fn max<S: NdFloat>(a: S, b: S) -> S {
    a.max(b)
}

pub(crate) fn is_finite<S: NdFloat>(v: S) -> bool {
    v.is_finite()
}

pub(crate) fn all_finite<S: NdFloat>(x: ArrayView1<S>) -> bool {
    x.iter().all(|v| v.is_finite())
}

/// Standard normal vector, drawn in `f64` so that the stream does not
/// depend on the element type.
pub(crate) fn gaussian<S: NdFloat, R: Rng>(n: usize, rng: &mut R) -> Array1<S> {
    Array1::<f64>::random_using(n, StandardNormal, rng).mapv(cast)
}

/// Lipschitz estimate from gradients at two points, floored at `1e-6`
pub(crate) fn lipschitz_estimate<S: NdFloat>(
    x1: ArrayView1<S>,
    x2: ArrayView1<S>,
    grad1: ArrayView1<S>,
    grad2: ArrayView1<S>,
) -> S {
    let l = norm((&grad1 - &grad2).view()) / norm((&x1 - &x2).view());
    l.max(cast(1e-6))
}

/// Adaptive spectral step
///
/// With $`\Delta x = x_k - y_k`$ and
/// $`\Delta g = \nabla f(x_k) - \nabla f(y_k)`$, the steepest descent
/// and minimum residual Barzilai-Borwein steps are
/// ```math
/// \tau_s = \frac{\langle \Delta x, \Delta x \rangle}{\langle \Delta x, \Delta g \rangle},
/// \qquad
/// \tau_m = \frac{\langle \Delta x, \Delta g \rangle}{\langle \Delta g, \Delta g \rangle}
/// ```
/// and the next step is $`\tau_m`$ if $`2\tau_m > \tau_s`$, else
/// $`\tau_s - \tau_m / 2`$. A result that is not positive and finite
/// (e.g. negative curvature along $`\Delta x`$) falls back to
/// $`1.5\,\tau_{k}`$, so the step never reaches zero.
pub(crate) fn spectral_step<S: NdFloat>(dx: ArrayView1<S>, dg: ArrayView1<S>, current: S) -> S {
    let two = S::from(2.).unwrap();
    let dot = dx.dot(&dg);
    let steepest = dx.dot(&dx) / dot;
    let min_residual = (dot / dg.dot(&dg)).max(S::zero());

    let next = if two * min_residual > steepest {
        min_residual
    } else {
        steepest - min_residual / two
    };
    if next > S::zero() && next.is_finite() {
        next
    } else {
        current * cast(1.5)
    }
}

/// Sufficient decrease relative to the worst recent value of `f`
///
/// ```math
/// f(Ax_k) - 10^{-12} \leq M + \langle \Delta x, \nabla f(y_k) \rangle + \frac{\|\Delta x\|^2}{2\tau}
/// ```
pub(crate) fn sufficient_decrease<S: NdFloat>(
    f_new: S,
    f_max: S,
    dx: ArrayView1<S>,
    grad: ArrayView1<S>,
    step: S,
) -> bool {
    f_new - cast(1e-12) <= f_max + dx.dot(&grad) + dx.dot(&dx) / (step + step)
}

/// FISTA momentum update, $`\alpha_{k+1} = (1 + \sqrt{1 + 4\alpha_k^2}) / 2`$
pub(crate) fn next_momentum<S: NdFloat>(alpha: S) -> S {
    let four = S::from(4.).unwrap();
    (S::one() + (S::one() + four * alpha * alpha).sqrt()) / S::from(2.).unwrap()
}

/// The last few values of `f`, for the non-monotone line search
pub(crate) struct Window<S> {
    values: VecDeque<S>,
    len: usize,
}

impl<S: NdFloat> Window<S> {
    pub(crate) fn new(len: usize) -> Window<S> {
        Window {
            values: VecDeque::with_capacity(len),
            len,
        }
    }

    pub(crate) fn push(&mut self, v: S) {
        if self.values.len() == self.len {
            self.values.pop_front();
        }
        self.values.push_back(v);
    }

    pub(crate) fn max(&self) -> S {
        self.values
            .iter()
            .fold(S::neg_infinity(), |acc, &v| acc.max(v))
    }
}

/// Consecutive iterations on which the stopping rule held
pub(crate) struct Streak {
    need: usize,
    hits: usize,
}

impl Streak {
    pub(crate) fn new(need: usize) -> Streak {
        Streak { need, hits: 0 }
    }

    /// Record one iteration; true once `need` hits in a row are seen.
    pub(crate) fn update(&mut self, hit: bool) -> bool {
        self.hits = if hit { self.hits + 1 } else { 0 };
        self.hits >= self.need
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn spectral_step_on_quadratic() {
        // f = c/2 |x|^2 has gradient difference c dx, so both BB steps are 1/c
        let dx = array![0.5, -1., 2.];
        let dg = &dx * 4.;
        assert_abs_diff_eq!(spectral_step(dx.view(), dg.view(), 1.), 0.25);
    }

    #[test]
    fn spectral_step_falls_back_on_negative_curvature() {
        let dx = array![1., 0.];
        let dg = array![-1., 0.];
        assert_abs_diff_eq!(spectral_step(dx.view(), dg.view(), 0.1), 0.15);

        let zero = array![0., 0.];
        assert_abs_diff_eq!(spectral_step(zero.view(), zero.view(), 0.1), 0.15);
    }

    #[test]
    fn momentum_sequence() {
        assert_abs_diff_eq!(next_momentum(1.), (1. + 5f64.sqrt()) / 2.);
        let mut alpha = 1.;
        for _ in 0..100 {
            let next = next_momentum(alpha);
            assert!(next > alpha);
            alpha = next;
        }
    }

    #[test]
    fn window_keeps_recent_values() {
        let mut w = Window::new(3);
        w.push(5.);
        w.push(1.);
        assert_eq!(w.max(), 5.);
        w.push(2.);
        w.push(3.);
        assert_eq!(w.max(), 3.);
    }

    #[test]
    fn streak_needs_consecutive_hits() {
        let mut streak = Streak::new(3);
        let seen: Vec<bool> = [true, true, false, true, true, true]
            .iter()
            .map(|&hit| streak.update(hit))
            .collect();
        assert_eq!(seen, vec![false, false, false, false, false, true]);

        let mut once = Streak::new(1);
        assert!(!once.update(false));
        assert!(once.update(true));
    }

    #[test]
    fn decrease_condition() {
        // f = 1/2 x^2 at y = 1 with gradient 1
        let grad = array![1.];
        let good = array![-0.5];
        let bad = array![-1.9];
        assert!(sufficient_decrease(0.125, 0.5, good.view(), grad.view(), 0.5));
        assert!(!sufficient_decrease(0.405, 0.5, bad.view(), grad.view(), 1.9));
    }

    #[test]
    fn lipschitz_of_linear_gradient() {
        let mut rng = StdRng::seed_from_u64(3);
        let x1: Array1<f64> = gaussian(5, &mut rng);
        let x2: Array1<f64> = gaussian(5, &mut rng);
        let l = lipschitz_estimate(x1.view(), x2.view(), (&x1 * 3.).view(), (&x2 * 3.).view());
        assert_abs_diff_eq!(l, 3., epsilon = 1e-12);
    }
}
