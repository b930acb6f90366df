//! Property-based tests for es-math numerical functions.
//!
//! Uses proptest to verify grid, interpolation, quadrature and dilogarithm
//! properties across many random inputs.

use es_math::{
    dilog, finite_or_zero, make_grid, trapezoid, trapezoid_finite, LinearInterpolant, OutOfRange,
};
use proptest::prelude::*;

/// Tolerance for floating point comparisons.
const TOL: f64 = 1e-10;

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return false;
    }
    (a - b).abs() <= tol.max(tol * a.abs().max(b.abs()))
}

// ============================================================================
// Grid properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Grids are increasing, have the requested length and hit both ends.
    #[test]
    fn grid_endpoints_and_order(low in -10.0..10.0f64, width in 0.01..10.0f64, n in 2usize..500) {
        let high = low + width;
        let g = make_grid(low, high, n);
        prop_assert_eq!(g.len(), n);
        prop_assert_eq!(g[0], low);
        prop_assert_eq!(g[n - 1], high);
        prop_assert!(g.windows(2).all(|w| w[0] < w[1]));
    }
}

// ============================================================================
// Interpolation properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Linear data is reproduced exactly anywhere inside the grid.
    #[test]
    fn interpolation_exact_for_linear(slope in -5.0..5.0f64, icpt in -5.0..5.0f64, t in 0.0..=1.0f64) {
        let xs = make_grid(-1.0, 2.0, 37);
        let ys: Vec<f64> = xs.iter().map(|x| slope * x + icpt).collect();
        let f = LinearInterpolant::new(xs, ys, OutOfRange::Nan).unwrap();
        let x = -1.0 + 3.0 * t;
        prop_assert!(approx_eq(f.eval(x), slope * x + icpt, 1e-9));
    }

    /// Interpolated values stay within the range of the bracketing knots.
    #[test]
    fn interpolation_within_knot_range(vals in prop::collection::vec(0.0..10.0f64, 2..50), t in 0.0..=1.0f64) {
        let xs = make_grid(0.0, 1.0, vals.len());
        let lo = vals.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = vals.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let f = LinearInterpolant::bounded(xs, vals).unwrap();
        let y = f.eval(t);
        prop_assert!(y >= lo - TOL && y <= hi + TOL, "{} outside [{}, {}]", y, lo, hi);
    }

    /// Bounded interpolants are zero strictly outside their support.
    #[test]
    fn bounded_zero_outside(offset in 1e-6..100.0f64) {
        let f = LinearInterpolant::bounded(vec![0.0, 1.0], vec![3.0, 3.0]).unwrap();
        prop_assert_eq!(f.eval(-offset), 0.0);
        prop_assert_eq!(f.eval(1.0 + offset), 0.0);
    }

    /// Unbounded interpolants report NaN outside their support.
    #[test]
    fn unbounded_nan_outside(offset in 1e-6..100.0f64) {
        let f = LinearInterpolant::new(vec![0.0, 1.0], vec![3.0, 3.0], OutOfRange::Nan).unwrap();
        prop_assert!(f.eval(-offset).is_nan());
        prop_assert!(f.eval(1.0 + offset).is_nan());
    }
}

// ============================================================================
// Quadrature properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// The trapezoid rule is linear in the integrand.
    #[test]
    fn trapezoid_linearity(a in -3.0..3.0f64, b in -3.0..3.0f64) {
        let xs = make_grid(0.0, 2.0, 51);
        let f: Vec<f64> = xs.iter().map(|x| x.sin()).collect();
        let g: Vec<f64> = xs.iter().map(|x| x * x).collect();
        let combo: Vec<f64> = f.iter().zip(&g).map(|(u, v)| a * u + b * v).collect();
        let lhs = trapezoid(&combo, &xs);
        let rhs = a * trapezoid(&f, &xs) + b * trapezoid(&g, &xs);
        prop_assert!(approx_eq(lhs, rhs, 1e-9));
    }

    /// Suppression never changes finite integrands.
    #[test]
    fn finite_trapezoid_agrees_on_finite_input(vals in prop::collection::vec(-10.0..10.0f64, 2..100)) {
        let xs = make_grid(0.0, 1.0, vals.len());
        prop_assert!(approx_eq(trapezoid(&vals, &xs), trapezoid_finite(&vals, &xs), 1e-12));
    }

    /// finite_or_zero is the identity on finite values.
    #[test]
    fn finite_or_zero_identity(v in -1e300..1e300f64) {
        prop_assert_eq!(finite_or_zero(v), v);
    }
}

// ============================================================================
// Dilogarithm properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Inversion: Re Li2(x) + Li2(1/x) = pi^2/3 - ln^2(x)/2 for x > 1.
    #[test]
    fn dilog_inversion(x in 1.01..500.0f64) {
        let l = x.ln();
        let lhs = dilog(x) + dilog(1.0 / x);
        let rhs = std::f64::consts::PI.powi(2) / 3.0 - 0.5 * l * l;
        prop_assert!(approx_eq(lhs, rhs, 1e-11), "x={} lhs={} rhs={}", x, lhs, rhs);
    }

    /// Li2 is increasing on (-inf, 1].
    #[test]
    fn dilog_monotone_below_one(x in -50.0..0.99f64, dx in 1e-3..0.01f64) {
        prop_assert!(dilog(x + dx) > dilog(x));
    }

    /// Duplication: Li2(x) + Li2(-x) = Li2(x^2) / 2 on (-1, 1).
    #[test]
    fn dilog_duplication(x in -0.99..0.99f64) {
        let lhs = dilog(x) + dilog(-x);
        let rhs = 0.5 * dilog(x * x);
        prop_assert!(approx_eq(lhs, rhs, 1e-12));
    }
}
