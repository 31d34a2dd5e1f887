//! Soft-thresholding

use ndarray::prelude::*;
use ndarray::NdFloat;

/// Shrink (soft-threshold) each entry of `z` towards zero by `t`
///
/// This is the proximal operator of $`t \|x\|_1`$:
/// ```math
/// \mathrm{shrink}(z, t)_i = \mathrm{sign}(z_i) \max(|z_i| - t, 0)
/// ```
pub fn shrink<S: NdFloat>(z: ArrayView1<S>, t: S) -> Array1<S> {
    z.mapv(|v| {
        let mag = v.abs() - t;
        if mag > S::zero() {
            v.signum() * mag
        } else {
            S::zero()
        }
    })
}

/// Proximal operator of the L-infinity norm, $`t \|x\|_\infty`$
///
/// By the Moreau decomposition this is the residual of projecting
/// onto the L1 ball of radius `t`, the unit ball of the dual norm.
pub fn prox_linf<S: NdFloat>(z: ArrayView1<S>, t: S) -> Array1<S> {
    &z - &super::project_l1_ball(z, t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn shrink_thresholds() {
        let z = array![3., -0.5, 0.2, -2.0, 0.0];
        assert_abs_diff_eq!(shrink(z.view(), 1.0), array![2., 0., 0., -1., 0.]);
        assert_abs_diff_eq!(shrink(z.view(), 0.0), z);
    }

    #[test]
    fn linf_prox_clips_largest_entries() {
        // prox of t|x|_inf pulls the peak entries down to a common level
        let z = array![3., -1., 0.5];
        let p = prox_linf(z.view(), 1.0);
        assert_abs_diff_eq!(p, array![2., -1., 0.5], epsilon = 1e-12);

        let p = prox_linf(z.view(), 3.0);
        assert_abs_diff_eq!(p, array![0.5, -0.5, 0.5], epsilon = 1e-12);
    }

    #[test]
    fn linf_prox_of_small_vector_is_zero() {
        let z = array![0.2, -0.3];
        assert_abs_diff_eq!(prox_linf(z.view(), 1.0), array![0., 0.]);
    }
}
