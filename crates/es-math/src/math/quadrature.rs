//! Trapezoid quadrature and non-finite suppression.
//!
//! Every integration node in the transform engine passes through
//! [`finite_or_zero`]: a NaN or infinite contribution (a zero-width uniform,
//! a division by a near-zero node, a prior evaluated off its support) is
//! replaced with 0 before it reaches a sum.

/// `value` if finite, otherwise 0.
#[inline]
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Replace every non-finite entry with 0 in place.
pub fn suppress_non_finite(values: &mut [f64]) {
    for v in values.iter_mut() {
        *v = finite_or_zero(*v);
    }
}

/// Trapezoid rule for samples `ys` at abscissae `xs` (numpy `trapz(y, x)`).
///
/// Returns 0 for fewer than two points. Lengths must match; extra trailing
/// entries of the longer slice are ignored.
pub fn trapezoid(ys: &[f64], xs: &[f64]) -> f64 {
    let n = ys.len().min(xs.len());
    if n < 2 {
        return 0.0;
    }
    let mut total = 0.0;
    for i in 0..n - 1 {
        total += 0.5 * (xs[i + 1] - xs[i]) * (ys[i] + ys[i + 1]);
    }
    total
}

/// Trapezoid rule with each node passed through [`finite_or_zero`].
pub fn trapezoid_finite(ys: &[f64], xs: &[f64]) -> f64 {
    let n = ys.len().min(xs.len());
    if n < 2 {
        return 0.0;
    }
    let mut total = 0.0;
    let mut prev = finite_or_zero(ys[0]);
    for i in 0..n - 1 {
        let next = finite_or_zero(ys[i + 1]);
        total += 0.5 * (xs[i + 1] - xs[i]) * (prev + next);
        prev = next;
    }
    total
}

/// Trapezoid rule over an integrand evaluated lazily at each node, for
/// callers that would otherwise collect it first. Each node value is
/// suppressed to 0 if non-finite.
pub fn trapezoid_fn<F>(xs: &[f64], mut integrand: F) -> f64
where
    F: FnMut(f64) -> f64,
{
    if xs.len() < 2 {
        return 0.0;
    }
    let mut total = 0.0;
    let mut prev = finite_or_zero(integrand(xs[0]));
    for w in xs.windows(2) {
        let next = finite_or_zero(integrand(w[1]));
        total += 0.5 * (w[1] - w[0]) * (prev + next);
        prev = next;
    }
    total
}

/// Mean of the finite entries counted against the full length.
///
/// Non-finite entries contribute 0 but still count toward the divisor, which
/// is the Monte-Carlo convention for draws that land in a zero-density region.
pub fn mean_finite(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum: f64 = values.iter().map(|v| finite_or_zero(*v)).sum();
    sum / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn trapezoid_exact_for_linear() {
        let xs = [0.0, 0.5, 1.0, 2.0];
        let ys: Vec<f64> = xs.iter().map(|x| 3.0 * x + 1.0).collect();
        assert!(approx_eq(trapezoid(&ys, &xs), 8.0, 1e-12));
    }

    #[test]
    fn trapezoid_short_input_is_zero() {
        assert_eq!(trapezoid(&[1.0], &[0.0]), 0.0);
        assert_eq!(trapezoid(&[], &[]), 0.0);
    }

    #[test]
    fn finite_variant_drops_nan_nodes() {
        let xs = [0.0, 1.0, 2.0];
        let ys = [1.0, f64::NAN, 1.0];
        assert!(trapezoid(&ys, &xs).is_nan());
        assert!(approx_eq(trapezoid_finite(&ys, &xs), 1.0, 1e-12));
    }

    #[test]
    fn lazy_trapezoid_matches_eager() {
        let xs: Vec<f64> = (0..=100).map(|i| i as f64 / 100.0).collect();
        let ys: Vec<f64> = xs.iter().map(|x| x * x).collect();
        let eager = trapezoid(&ys, &xs);
        let lazy = trapezoid_fn(&xs, |x| x * x);
        assert!(approx_eq(eager, lazy, 1e-14));
        assert!(approx_eq(lazy, 1.0 / 3.0, 1e-4));
    }

    #[test]
    fn lazy_trapezoid_suppresses_infinities() {
        let xs = [0.0, 1.0, 2.0];
        let out = trapezoid_fn(&xs, |x| if x == 0.0 { f64::INFINITY } else { 1.0 });
        assert!(approx_eq(out, 1.5, 1e-12));
    }

    #[test]
    fn mean_counts_suppressed_entries() {
        let out = mean_finite(&[2.0, f64::NAN, 4.0, f64::INFINITY]);
        assert!(approx_eq(out, 1.5, 1e-12));
        assert_eq!(mean_finite(&[]), 0.0);
    }

    #[test]
    fn suppress_in_place() {
        let mut v = [1.0, f64::NEG_INFINITY, f64::NAN];
        suppress_non_finite(&mut v);
        assert_eq!(v, [1.0, 0.0, 0.0]);
    }
}
