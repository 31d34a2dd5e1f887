//! Euclidean projections onto simple convex sets

use std::cmp::Ordering;

use ndarray::prelude::*;
use ndarray::NdFloat;

/// Projection onto the non-negative orthant, $`\{x : x \geq 0\}`$
pub fn project_nonneg<S: NdFloat>(z: ArrayView1<S>) -> Array1<S> {
    z.mapv(|v| v.max(S::zero()))
}

/// Projection onto the L2 ball $`\{x : \|x\|_2 \leq r\}`$
pub fn project_l2_ball<S: NdFloat>(z: ArrayView1<S>, radius: S) -> Array1<S> {
    let norm = z.dot(&z).sqrt();
    if norm <= radius {
        z.to_owned()
    } else {
        &z * (radius / norm)
    }
}

/// Projection onto the L1 ball $`\{x : \|x\|_1 \leq r\}`$
///
/// Sorts the magnitudes to find the threshold $`\theta`$ such that
/// $`\sum_i \max(|z_i| - \theta, 0) = r`$, then shrinks by it.
/// See [\[DSSC08\]](#references).
///
/// References
/// ----------
/// \[DSSC08\]: Duchi J, Shalev-Shwartz S, Singer Y, Chandra T
///             "Efficient Projections onto the l1-Ball for Learning in
///             High Dimensions", ICML (2008)
pub fn project_l1_ball<S: NdFloat>(z: ArrayView1<S>, radius: S) -> Array1<S> {
    if radius <= S::zero() {
        return Array1::zeros(z.len());
    }
    let l1 = z.fold(S::zero(), |acc, v| acc + v.abs());
    if l1 <= radius {
        return z.to_owned();
    }

    let mut mags: Vec<S> = z.iter().map(|v| v.abs()).collect();
    mags.sort_unstable_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));

    let mut cumsum = S::zero();
    let mut theta = S::zero();
    for (i, &u) in mags.iter().enumerate() {
        cumsum += u;
        let candidate = (cumsum - radius) / S::from(i + 1).unwrap();
        if u > candidate {
            theta = candidate;
        } else {
            break;
        }
    }
    super::shrink(z, theta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn nonneg_clips_negatives() {
        let z = array![1., -2., 0., 3.5];
        assert_eq!(project_nonneg(z.view()), array![1., 0., 0., 3.5]);
    }

    #[test]
    fn l2_ball_rescales_outside_points() {
        let z = array![3., 4.];
        assert_abs_diff_eq!(project_l2_ball(z.view(), 1.), array![0.6, 0.8], epsilon = 1e-12);
        assert_abs_diff_eq!(project_l2_ball(z.view(), 10.), z);
    }

    #[test]
    fn l1_ball_projection() {
        let z: Array1<f64> = array![3., -1., 0.5];
        let p = project_l1_ball(z.view(), 1.);
        assert_abs_diff_eq!(p, array![1., 0., 0.], epsilon = 1e-12);

        let p = project_l1_ball(z.view(), 3.);
        assert_abs_diff_eq!(p, array![2.5, -0.5, 0.], epsilon = 1e-12);
        assert_abs_diff_eq!(p.fold(0f64, |acc, v| acc + v.abs()), 3., epsilon = 1e-12);

        // points already inside are untouched
        assert_abs_diff_eq!(project_l1_ball(z.view(), 5.), z);
        assert_abs_diff_eq!(project_l1_ball(z.view(), 0.), Array1::<f64>::zeros(3));
    }
}
