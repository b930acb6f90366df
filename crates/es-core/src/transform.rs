//! Distribution transform engine.
//!
//! Five change-of-variable operators propagate densities through the fixed
//! algebra of the xp decomposition:
//!
//! | operator | output density |
//! |---|---|
//! | sum `Z = A + B` | `∫ f_A(a) f_B(z - a) da` |
//! | product `Z = A·B` | `∫ f_A(a) f_B(z / a) / |a| da` |
//! | inverse `Z = 1/A` | `f_A(1/z) / z²` |
//! | affine `Z = s·A + t` | `f_A((z - t)/s) / |s|` |
//! | sqrt-complement `Z = sqrt(1 - A²)` | `[f_A(h) + f_A(-h)] · z/h`, `h = sqrt(1 - z²)` |
//!
//! Integrals run over a caller-supplied auxiliary grid with the trapezoid
//! rule. Every node and every pointwise value passes through
//! [`finite_or_zero`], so NaN or infinite contributions never propagate.
//!
//! All operators take an output grid `z` and return one density value per
//! point. The `*_interp` variants wrap that result in a bounded
//! [`LinearInterpolant`] (zero outside the grid) so it can be fed straight
//! into the next operator.

use es_math::{
    drop_near_zero, finite_or_zero, make_grid, trapezoid_finite, Density, LinearInterpolant,
};

use crate::error::{Error, Result};

/// Default magnitude below which product integration nodes are dropped.
pub const DEFAULT_ZERO_TOLERANCE: f64 = 1e-12;

/// Density of `Z = A + B` at each `z`, integrating over `aux`.
pub fn sum_distribution<A, B>(z: &[f64], aux: &[f64], pdf_a: &A, pdf_b: &B) -> Vec<f64>
where
    A: Density + ?Sized,
    B: Density + ?Sized,
{
    let fa: Vec<f64> = aux.iter().map(|&a| pdf_a.density(a)).collect();
    let mut integrand = vec![0.0; aux.len()];
    z.iter()
        .map(|&zi| {
            for ((slot, &a), &fa_a) in integrand.iter_mut().zip(aux).zip(&fa) {
                *slot = fa_a * pdf_b.density(zi - a);
            }
            trapezoid_finite(&integrand, aux)
        })
        .collect()
}

/// Density of `Z = A · B` at each `z`, integrating over `aux`.
///
/// Nodes with `|a| <= zero_tolerance` are removed before integrating; the
/// trapezoid rule then bridges the gap they leave.
pub fn product_distribution<A, B>(
    z: &[f64],
    aux: &[f64],
    pdf_a: &A,
    pdf_b: &B,
    zero_tolerance: f64,
) -> Vec<f64>
where
    A: Density + ?Sized,
    B: Density + ?Sized,
{
    let nodes = drop_near_zero(aux, zero_tolerance);
    let weighted: Vec<f64> = nodes
        .iter()
        .map(|&a| finite_or_zero(pdf_a.density(a) / a.abs()))
        .collect();
    let mut integrand = vec![0.0; nodes.len()];
    z.iter()
        .map(|&zi| {
            for ((slot, &a), &w) in integrand.iter_mut().zip(&nodes).zip(&weighted) {
                *slot = w * pdf_b.density(zi / a);
            }
            trapezoid_finite(&integrand, &nodes)
        })
        .collect()
}

/// Density of `Z = 1 / A` at each `z`. Zero at `z = 0`.
pub fn inverse_distribution<A>(z: &[f64], pdf_a: &A) -> Vec<f64>
where
    A: Density + ?Sized,
{
    z.iter()
        .map(|&zi| {
            if zi == 0.0 {
                0.0
            } else {
                finite_or_zero(pdf_a.density(1.0 / zi) / (zi * zi))
            }
        })
        .collect()
}

/// Density of `Z = scale · A + translate` at each `z`.
///
/// A zero or non-finite `scale` collapses the distribution onto a point and
/// is rejected.
pub fn affine_distribution<A>(z: &[f64], pdf_a: &A, scale: f64, translate: f64) -> Result<Vec<f64>>
where
    A: Density + ?Sized,
{
    if scale == 0.0 || !scale.is_finite() || !translate.is_finite() {
        return Err(Error::DegenerateScale);
    }
    let jacobian = 1.0 / scale.abs();
    Ok(z.iter()
        .map(|&zi| finite_or_zero(pdf_a.density((zi - translate) / scale) * jacobian))
        .collect())
}

/// Density of `Z = -A`.
pub fn negate_distribution<A>(z: &[f64], pdf_a: &A) -> Vec<f64>
where
    A: Density + ?Sized,
{
    z.iter()
        .map(|&zi| finite_or_zero(pdf_a.density(-zi)))
        .collect()
}

/// Output grid for [`sqrt_complement_distribution`] on `[0, 1]`.
///
/// The knots are `z = sqrt(1 - h²)` for `points` uniform `h` on `[0, 1]`,
/// returned in increasing `z`. They crowd toward `z = 1`, where the Jacobian
/// diverges, so each trapezoid cell carries about as much mass as the
/// matching `h` cell.
pub fn sqrt_complement_grid(points: usize) -> Vec<f64> {
    let mut z: Vec<f64> = make_grid(0.0, 1.0, points)
        .into_iter()
        .rev()
        .map(|h| (1.0 - h * h).sqrt())
        .collect();
    if let Some(first) = z.first_mut() {
        *first = 0.0;
    }
    if let Some(last) = z.last_mut() {
        *last = 1.0;
    }
    z
}

/// Density of `Z = sqrt(1 - A²)` at each `z`, restricted to `z ∈ [0, 1]`.
///
/// Both preimages `±h` contribute; the Jacobian diverges at `z = 1`, where
/// the value is suppressed to 0. Sample on [`sqrt_complement_grid`] to keep
/// the mass next to that endpoint.
pub fn sqrt_complement_distribution<A>(z: &[f64], pdf_a: &A) -> Vec<f64>
where
    A: Density + ?Sized,
{
    z.iter()
        .map(|&zi| {
            if !(0.0..=1.0).contains(&zi) {
                return 0.0;
            }
            let h = (1.0 - zi * zi).sqrt();
            let folded = if h == 0.0 {
                finite_or_zero(pdf_a.density(0.0))
            } else {
                finite_or_zero(pdf_a.density(h)) + finite_or_zero(pdf_a.density(-h))
            };
            finite_or_zero(folded * zi / h)
        })
        .collect()
}

/// Wrap values sampled on `z` as a bounded interpolant.
pub fn interpolated(z: &[f64], values: Vec<f64>) -> Result<LinearInterpolant> {
    Ok(LinearInterpolant::bounded(z.to_vec(), values)?)
}

/// [`sum_distribution`] as a bounded interpolant over `z`.
pub fn sum_interp<A, B>(z: &[f64], aux: &[f64], pdf_a: &A, pdf_b: &B) -> Result<LinearInterpolant>
where
    A: Density + ?Sized,
    B: Density + ?Sized,
{
    interpolated(z, sum_distribution(z, aux, pdf_a, pdf_b))
}

/// [`product_distribution`] as a bounded interpolant over `z`.
pub fn product_interp<A, B>(
    z: &[f64],
    aux: &[f64],
    pdf_a: &A,
    pdf_b: &B,
    zero_tolerance: f64,
) -> Result<LinearInterpolant>
where
    A: Density + ?Sized,
    B: Density + ?Sized,
{
    interpolated(z, product_distribution(z, aux, pdf_a, pdf_b, zero_tolerance))
}

/// [`inverse_distribution`] as a bounded interpolant over `z`.
pub fn inverse_interp<A>(z: &[f64], pdf_a: &A) -> Result<LinearInterpolant>
where
    A: Density + ?Sized,
{
    interpolated(z, inverse_distribution(z, pdf_a))
}

/// [`affine_distribution`] as a bounded interpolant over `z`.
pub fn affine_interp<A>(z: &[f64], pdf_a: &A, scale: f64, translate: f64) -> Result<LinearInterpolant>
where
    A: Density + ?Sized,
{
    interpolated(z, affine_distribution(z, pdf_a, scale, translate)?)
}

/// [`negate_distribution`] as a bounded interpolant over `z`.
pub fn negate_interp<A>(z: &[f64], pdf_a: &A) -> Result<LinearInterpolant>
where
    A: Density + ?Sized,
{
    interpolated(z, negate_distribution(z, pdf_a))
}

/// [`sqrt_complement_distribution`] as a bounded interpolant over `z`.
pub fn sqrt_complement_interp<A>(z: &[f64], pdf_a: &A) -> Result<LinearInterpolant>
where
    A: Density + ?Sized,
{
    interpolated(z, sqrt_complement_distribution(z, pdf_a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use es_math::{is_strictly_increasing, FnDensity};

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    fn uniform(lo: f64, hi: f64) -> FnDensity<impl Fn(f64) -> f64> {
        FnDensity(move |x: f64| if x >= lo && x <= hi { 1.0 / (hi - lo) } else { 0.0 })
    }

    #[test]
    fn test_nan_input_is_suppressed() {
        let nan_outside = FnDensity(|x: f64| if (0.0..=1.0).contains(&x) { 1.0 } else { f64::NAN });
        let z = make_grid(-1.0, 2.0, 31);
        let aux = make_grid(-2.0, 3.0, 501);
        let fz = sum_distribution(&z, &aux, &nan_outside, &nan_outside);
        assert!(fz.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_product_tolerates_zero_node() {
        let z = make_grid(-1.0, 1.0, 21);
        // odd node count puts a node at (or within rounding of) zero
        let aux = make_grid(-1.0, 1.0, 201);
        let fz = product_distribution(&z, &aux, &uniform(-1.0, 1.0), &uniform(-1.0, 1.0), 1e-12);
        assert!(fz.iter().all(|v| v.is_finite() && *v >= 0.0));
    }

    #[test]
    fn test_inverse_at_zero_is_zero() {
        let fz = inverse_distribution(&[0.0, 0.5, 2.0], &uniform(0.0, 1.0));
        assert_eq!(fz[0], 0.0);
        assert_eq!(fz[1], 0.0);
        assert!(approx_eq(fz[2], 0.25, 1e-15));
    }

    #[test]
    fn test_affine_rejects_zero_scale() {
        let err = affine_distribution(&[0.0], &uniform(0.0, 1.0), 0.0, 1.0).unwrap_err();
        assert!(matches!(err, Error::DegenerateScale));
    }

    #[test]
    fn test_affine_shift_and_scale() {
        let fz = affine_distribution(&[-0.5, 0.5, 1.5, 2.5], &uniform(0.0, 1.0), 2.0, 0.0).unwrap();
        assert_eq!(fz, vec![0.0, 0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_negate_mirrors() {
        let fz = negate_distribution(&[-0.5, 0.5], &uniform(0.0, 1.0));
        assert_eq!(fz, vec![1.0, 0.0]);
    }

    #[test]
    fn test_sqrt_complement_outside_unit_interval() {
        let fz = sqrt_complement_distribution(&[-0.1, 1.0, 1.1], &uniform(-1.0, 1.0));
        assert_eq!(fz, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_sqrt_complement_folds_both_branches() {
        let z = [0.6];
        // h = 0.8; only the negative preimage carries mass.
        let negative_only = sqrt_complement_distribution(&z, &uniform(-1.0, 0.0));
        assert!(approx_eq(negative_only[0], 0.6 / 0.8, 1e-12));
    }

    #[test]
    fn test_sqrt_complement_grid_spans_unit_interval() {
        let z = sqrt_complement_grid(101);
        assert_eq!(z.len(), 101);
        assert_eq!((z[0], z[100]), (0.0, 1.0));
        assert!(is_strictly_increasing(&z));
        // the last cell is much narrower than the first
        assert!(z[100] - z[99] < 1e-3 * (z[1] - z[0]));
    }

    #[test]
    fn test_sqrt_complement_keeps_mass() {
        let z = sqrt_complement_grid(1001);
        let uniform_c = sqrt_complement_interp(&z, &uniform(-1.0, 1.0)).unwrap();
        assert!(approx_eq(uniform_c.integral(), 1.0, 1e-3), "{}", uniform_c.integral());

        let triangle = FnDensity(|x: f64| (1.0 - x.abs()).max(0.0));
        let triangular_c = sqrt_complement_interp(&z, &triangle).unwrap();
        assert!(approx_eq(triangular_c.integral(), 1.0, 2e-3), "{}", triangular_c.integral());
    }

    #[test]
    fn test_interp_variants_are_bounded() {
        let z = make_grid(0.0, 1.0, 11);
        let f = inverse_interp(&z, &uniform(1.0, 2.0)).unwrap();
        assert_eq!(f.density(5.0), 0.0);
        assert_eq!(f.density(-5.0), 0.0);
    }
}
