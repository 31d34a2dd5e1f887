use ndarray::prelude::*;
use ndarray::NdFloat;

use crate::fasta::{ProxTerm, SmoothTerm};
use crate::prox::{project_l1_ball, project_nonneg, prox_linf, shrink};

/// $`f(z) = \frac12 \|z - b\|_2^2`$
#[derive(Debug, Clone)]
pub struct LeastSquares<S> {
    pub b: Array1<S>,
}

impl<S: NdFloat> LeastSquares<S> {
    pub fn new(b: ArrayView1<S>) -> LeastSquares<S> {
        LeastSquares { b: b.to_owned() }
    }
}

impl<S: NdFloat> SmoothTerm<S> for LeastSquares<S> {
    fn value(&self, z: ArrayView1<S>) -> S {
        let r = &z - &self.b;
        r.dot(&r) / S::from(2.).unwrap()
    }

    fn gradient(&self, z: ArrayView1<S>) -> Array1<S> {
        &z - &self.b
    }
}

/// Logistic loss for labels $`y_i \in \{-1, +1\}`$,
/// $`f(z) = \sum_i \log(1 + e^{-y_i z_i})`$
#[derive(Debug, Clone)]
pub struct Logistic<S> {
    pub labels: Array1<S>,
}

impl<S: NdFloat> Logistic<S> {
    pub fn new(labels: ArrayView1<S>) -> Logistic<S> {
        Logistic {
            labels: labels.to_owned(),
        }
    }
}

/// $`\log(1 + e^t)`$ without overflow
fn softplus<S: NdFloat>(t: S) -> S {
    if t > S::zero() {
        t + (-t).exp().ln_1p()
    } else {
        t.exp().ln_1p()
    }
}

/// $`1 / (1 + e^{-t})`$ without overflow
fn sigmoid<S: NdFloat>(t: S) -> S {
    if t >= S::zero() {
        S::one() / (S::one() + (-t).exp())
    } else {
        let e = t.exp();
        e / (S::one() + e)
    }
}

impl<S: NdFloat> SmoothTerm<S> for Logistic<S> {
    fn value(&self, z: ArrayView1<S>) -> S {
        z.iter()
            .zip(self.labels.iter())
            .fold(S::zero(), |acc, (&zi, &yi)| acc + softplus(-yi * zi))
    }

    fn gradient(&self, z: ArrayView1<S>) -> Array1<S> {
        let mut grad = z.to_owned();
        for (gi, &yi) in grad.iter_mut().zip(self.labels.iter()) {
            *gi = -yi * sigmoid(-yi * *gi);
        }
        grad
    }
}

/// $`g(x) = \mu \|x\|_1`$
#[derive(Debug, Clone, Copy)]
pub struct L1Norm<S> {
    pub mu: S,
}

impl<S: NdFloat> ProxTerm<S> for L1Norm<S> {
    fn value(&self, x: ArrayView1<S>) -> S {
        self.mu * x.fold(S::zero(), |acc, v| acc + v.abs())
    }

    fn prox(&self, z: ArrayView1<S>, t: S) -> Array1<S> {
        shrink(z, t * self.mu)
    }
}

/// $`g(x) = \mu \|x\|_\infty`$
#[derive(Debug, Clone, Copy)]
pub struct LinfNorm<S> {
    pub mu: S,
}

impl<S: NdFloat> ProxTerm<S> for LinfNorm<S> {
    fn value(&self, x: ArrayView1<S>) -> S {
        self.mu * x.fold(S::zero(), |acc, v| acc.max(v.abs()))
    }

    fn prox(&self, z: ArrayView1<S>, t: S) -> Array1<S> {
        prox_linf(z, t * self.mu)
    }
}

/// Indicator of the L1 ball $`\{x : \|x\|_1 \leq r\}`$
///
/// The value is taken as zero everywhere: the solver only evaluates
/// `g` at outputs of `prox`, which lie in the ball.
#[derive(Debug, Clone, Copy)]
pub struct L1Ball<S> {
    pub radius: S,
}

impl<S: NdFloat> ProxTerm<S> for L1Ball<S> {
    fn value(&self, _x: ArrayView1<S>) -> S {
        S::zero()
    }

    fn prox(&self, z: ArrayView1<S>, _t: S) -> Array1<S> {
        project_l1_ball(z, self.radius)
    }
}

/// Indicator of the non-negative orthant, zero on prox outputs as
/// for [`L1Ball`](struct.L1Ball.html)
#[derive(Debug, Clone, Copy, Default)]
pub struct NonNegative;

impl<S: NdFloat> ProxTerm<S> for NonNegative {
    fn value(&self, _x: ArrayView1<S>) -> S {
        S::zero()
    }

    fn prox(&self, z: ArrayView1<S>, _t: S) -> Array1<S> {
        project_nonneg(z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{check_gradient, gradient_tolerance};
    use approx::assert_abs_diff_eq;

    #[test]
    fn least_squares_value_and_gradient() {
        let f = LeastSquares::new(array![1., 2.].view());
        let z = array![2., 0.];
        assert_abs_diff_eq!(f.value(z.view()), 2.5);
        assert_abs_diff_eq!(f.gradient(z.view()), array![1., -2.]);
    }

    #[test]
    fn logistic_gradient_matches_finite_differences() {
        let f = Logistic::new(array![1., -1., 1., -1.].view());
        let z = array![0.3, -2., 5., 1.5];
        let err = check_gradient(|z| f.value(z), |z| f.gradient(z), z.view());
        assert!(err < gradient_tolerance::<f64>());
    }

    #[test]
    fn logistic_is_stable_for_large_margins() {
        let f = Logistic::new(array![1., -1.].view());
        let z = array![800., 800.];
        // the correctly classified point contributes nothing, the other ~800
        assert_abs_diff_eq!(f.value(z.view()), 800., epsilon = 1e-9);
        assert_abs_diff_eq!(f.gradient(z.view()), array![0., 1.], epsilon = 1e-12);
    }

    #[test]
    fn norm_terms() {
        let x = array![3., -1., 0.5];
        assert_abs_diff_eq!(L1Norm { mu: 2. }.value(x.view()), 9.);
        assert_abs_diff_eq!(LinfNorm { mu: 2. }.value(x.view()), 6.);
        assert_abs_diff_eq!(
            L1Norm { mu: 2. }.prox(x.view(), 0.5),
            array![2., 0., 0.]
        );
        assert_abs_diff_eq!(
            LinfNorm { mu: 1. }.prox(x.view(), 3.),
            array![0.5, -0.5, 0.5],
            epsilon = 1e-12
        );
    }

    #[test]
    fn indicator_terms_project() {
        let x = array![3., -1., 0.5];
        assert_abs_diff_eq!(
            L1Ball { radius: 1. }.prox(x.view(), 10.),
            array![1., 0., 0.],
            epsilon = 1e-12
        );
        assert_eq!(NonNegative.prox(x.view(), 1.), array![3., 0., 0.5]);
        assert_eq!(ProxTerm::<f64>::value(&NonNegative, x.view()), 0.);
    }
}
