use ndarray::prelude::*;

/// The smooth part $`f`$ of $`f(Ax) + g(x)`$, evaluated on $`z = Ax`$
///
/// `gradient` must be the true gradient of `value`; the solver relies on
/// it for descent. Both are expected to be pure.
pub trait SmoothTerm<S> {
    fn value(&self, z: ArrayView1<S>) -> S;
    fn gradient(&self, z: ArrayView1<S>) -> Array1<S>;
}

/// The non-smooth part $`g`$ of $`f(Ax) + g(x)`$
///
/// `prox(z, t)` must return
/// $`\mathrm{arg}\!\min_u g(u) + \frac{1}{2t}\|u - z\|_2^2`$.
pub trait ProxTerm<S> {
    fn value(&self, x: ArrayView1<S>) -> S;
    fn prox(&self, z: ArrayView1<S>, t: S) -> Array1<S>;
}

impl<'a, S, T: SmoothTerm<S> + ?Sized> SmoothTerm<S> for &'a T {
    fn value(&self, z: ArrayView1<S>) -> S {
        (**self).value(z)
    }
    fn gradient(&self, z: ArrayView1<S>) -> Array1<S> {
        (**self).gradient(z)
    }
}

impl<'a, S, T: ProxTerm<S> + ?Sized> ProxTerm<S> for &'a T {
    fn value(&self, x: ArrayView1<S>) -> S {
        (**self).value(x)
    }
    fn prox(&self, z: ArrayView1<S>, t: S) -> Array1<S> {
        (**self).prox(z, t)
    }
}

/// A [`SmoothTerm`](trait.SmoothTerm.html) made of a value closure
/// and a gradient closure
pub struct Smooth<F, G> {
    pub f: F,
    pub gradf: G,
}

impl<S, F, G> SmoothTerm<S> for Smooth<F, G>
where
    F: Fn(ArrayView1<S>) -> S,
    G: Fn(ArrayView1<S>) -> Array1<S>,
{
    fn value(&self, z: ArrayView1<S>) -> S {
        (self.f)(z)
    }
    fn gradient(&self, z: ArrayView1<S>) -> Array1<S> {
        (self.gradf)(z)
    }
}

/// A [`ProxTerm`](trait.ProxTerm.html) made of a value closure and a
/// proximal operator closure
pub struct Proximable<G, P> {
    pub g: G,
    pub proxg: P,
}

impl<S, G, P> ProxTerm<S> for Proximable<G, P>
where
    G: Fn(ArrayView1<S>) -> S,
    P: Fn(ArrayView1<S>, S) -> Array1<S>,
{
    fn value(&self, x: ArrayView1<S>) -> S {
        (self.g)(x)
    }
    fn prox(&self, z: ArrayView1<S>, t: S) -> Array1<S> {
        (self.proxg)(z, t)
    }
}
