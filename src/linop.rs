//! Abstract Linear Operators and Adjoints
//! building upon ndarray_linalg::operator
//!
//! The solvers in this crate only ever need to apply an operator and
//! its adjoint to vectors, so anything implementing
//! [`LinearOperator`](trait.LinearOperator.html) can be used as the `A`
//! of a composite objective $`f(Ax) + g(x)`$. Operators that know their
//! shape report it through [`Dimensions`](trait.Dimensions.html) so that
//! mismatched pairs are caught before any iteration runs.

use std::marker::PhantomData;

use ndarray::prelude::*;
use ndarray::{Data, DataMut, DataOwned, NdFloat};
pub use ndarray_linalg::operator::LinearOperator;
use ndarray_linalg::Scalar;
use num_traits::Float;

pub trait Adjoint<'a> {
    type Output;
    fn adj(&'a self) -> Self::Output;
}

impl<'a, A, S> Adjoint<'a> for ArrayBase<S, Ix2>
where
    A: 'a + Float,
    S: Data<Elem = A>,
{
    type Output = ArrayView<'a, A, Ix2>;

    fn adj(&'a self) -> Self::Output {
        self.t()
    }
}

/// Shape of a linear operator
pub trait Dimensions {
    /// `(rows, cols)`, i.e. the length of the output and of the input.
    ///
    /// Operators that act on vectors of any length, such as
    /// [`Identity`](struct.Identity.html), return `None`.
    fn dims(&self) -> Option<(usize, usize)>;
}

impl<S: Data> Dimensions for ArrayBase<S, Ix2> {
    fn dims(&self) -> Option<(usize, usize)> {
        Some(self.dim())
    }
}

impl<'a, T: Dimensions> Dimensions for &'a T {
    fn dims(&self) -> Option<(usize, usize)> {
        (**self).dims()
    }
}

#[derive(Default)]
pub struct Identity<A> {
    phantom: PhantomData<*const A>,
}

impl<A> Identity<A> {
    #[must_use]
    pub fn new() -> Identity<A> {
        Identity {
            phantom: PhantomData,
        }
    }
}

impl<A> LinearOperator for Identity<A>
where
    A: NdFloat + Scalar,
{
    type Elem = A;

    /// Apply operator out-place
    #[inline]
    fn apply<S>(&self, a: &ArrayBase<S, Ix1>) -> Array1<S::Elem>
    where
        S: Data<Elem = Self::Elem>,
    {
        a.to_owned()
    }

    /// Apply operator in-place
    #[inline]
    fn apply_mut<S>(&self, _a: &mut ArrayBase<S, Ix1>)
    where
        S: DataMut<Elem = Self::Elem>,
    {
    }

    /// Apply operator with move
    #[inline]
    fn apply_into<S>(&self, a: ArrayBase<S, Ix1>) -> ArrayBase<S, Ix1>
    where
        S: DataOwned<Elem = Self::Elem> + DataMut,
    {
        a
    }
}

impl<A> Dimensions for Identity<A> {
    fn dims(&self) -> Option<(usize, usize)> {
        None
    }
}

impl<'a, A: 'a> Adjoint<'a> for Identity<A> {
    type Output = &'a Identity<A>;

    fn adj(&'a self) -> Self::Output {
        self
    }
}

/// A linear operator given by a closure, e.g. a fast transform
/// that is never formed as a matrix.
///
/// The closure is trusted to be linear and to map vectors of length
/// `cols` to vectors of length `rows`; the adjoint is a second
/// `FnOperator` with the dimensions swapped.
pub struct FnOperator<A, F> {
    rows: usize,
    cols: usize,
    op: F,
    phantom: PhantomData<*const A>,
}

impl<A, F> FnOperator<A, F>
where
    F: Fn(ArrayView1<A>) -> Array1<A>,
{
    pub fn new(rows: usize, cols: usize, op: F) -> FnOperator<A, F> {
        FnOperator {
            rows,
            cols,
            op,
            phantom: PhantomData,
        }
    }
}

impl<A, F> LinearOperator for FnOperator<A, F>
where
    A: NdFloat + Scalar,
    F: Fn(ArrayView1<A>) -> Array1<A>,
{
    type Elem = A;

    #[inline]
    fn apply<S>(&self, a: &ArrayBase<S, Ix1>) -> Array1<S::Elem>
    where
        S: Data<Elem = Self::Elem>,
    {
        (self.op)(a.view())
    }
}

impl<A, F> Dimensions for FnOperator<A, F> {
    fn dims(&self) -> Option<(usize, usize)> {
        Some((self.rows, self.cols))
    }
}

/// Relative disagreement between $`\langle Ax, y \rangle`$ and
/// $`\langle x, A^H y \rangle`$.
///
/// For a true adjoint pair this is at the level of rounding error.
/// Returns zero when both inner products vanish.
pub fn check_adjoint<T, R, Q>(a: &R, at: &Q, x: ArrayView1<T>, y: ArrayView1<T>) -> T
where
    T: NdFloat + Scalar,
    R: LinearOperator<Elem = T>,
    Q: LinearOperator<Elem = T>,
{
    let lhs = a.apply(&x).dot(&y);
    let rhs = x.dot(&at.apply(&y));
    relative_gap(lhs, rhs)
}

pub(crate) fn relative_gap<T: NdFloat>(lhs: T, rhs: T) -> T {
    let scale = lhs.abs().max(rhs.abs());
    if scale == T::zero() {
        T::zero()
    } else {
        (lhs - rhs).abs() / scale
    }
}
