//! Special functions: log-gamma, log-beta, the Beta density and the real
//! dilogarithm.
//!
//! The dilogarithm `Li2(x) = -∫₀ˣ ln(1-t)/t dt` is evaluated for every real
//! `x`. For `x > 1` the function is complex; [`dilog`] returns its real part,
//! which is what the closed-form χ_eff prior consumes (its imaginary parts
//! cancel between paired terms).

use std::f64::consts::PI;

const LOG_SQRT_2PI: f64 = 0.918_938_533_204_672_8; // 0.5 * ln(2*pi)
const LANCZOS_G: f64 = 7.0;
#[allow(clippy::excessive_precision)] // published Lanczos coefficients (g = 7, n = 9)
const LANCZOS_COEFFS: [f64; 9] = [
    0.999_999_999_999_809_93,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_59,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_571_6e-6,
    1.505_632_735_149_311_6e-7,
];

const PI2_6: f64 = PI * PI / 6.0;

/// `B_{2k} / (2k+1)!` for k = 1..=10, the coefficients of the Bernoulli
/// series `Li2(x) = u - u²/4 + Σ c_k u^{2k+1}` with `u = -ln(1-x)`.
#[allow(clippy::excessive_precision)]
const DILOG_BERNOULLI: [f64; 10] = [
    2.777_777_777_777_777_6e-2,
    -2.777_777_777_777_777_8e-4,
    4.724_111_866_969_01e-6,
    -9.185_773_074_661_964e-8,
    1.897_886_998_897_1e-9,
    -4.064_761_645_144_225_6e-11,
    8.921_691_020_456_452e-13,
    -1.993_929_586_072_107_4e-14,
    4.518_980_029_619_918e-16,
    -1.035_651_761_218_124_7e-17,
];

/// Natural log of the Gamma function (log |Gamma(z)|).
///
/// Lanczos approximation, with the reflection formula below 0.5.
pub fn log_gamma(z: f64) -> f64 {
    if z.is_nan() || z == f64::NEG_INFINITY {
        return f64::NAN;
    }
    if z == f64::INFINITY {
        return f64::INFINITY;
    }
    if z <= 0.0 && (z - z.round()).abs() < 1e-15 {
        return f64::NAN;
    }
    if z < 0.5 {
        let sin_pi = (PI * z).sin();
        return PI.ln() - sin_pi.abs().ln() - log_gamma(1.0 - z);
    }
    let z_minus = z - 1.0;
    let mut x = LANCZOS_COEFFS[0];
    for (i, coeff) in LANCZOS_COEFFS.iter().enumerate().skip(1) {
        x += coeff / (z_minus + i as f64);
    }
    let t = z_minus + LANCZOS_G + 0.5;
    LOG_SQRT_2PI + (z_minus + 0.5) * t.ln() - t + x.ln()
}

/// log Beta(a, b) = log Gamma(a) + log Gamma(b) - log Gamma(a+b).
pub fn log_beta(a: f64, b: f64) -> f64 {
    log_gamma(a) + log_gamma(b) - log_gamma(a + b)
}

/// Beta(alpha, beta) density at `x` on `[0, 1]`.
///
/// Returns 0 outside the unit interval, +inf at an endpoint where a shape
/// parameter is below one, and NaN for non-positive shapes.
pub fn beta_pdf(x: f64, alpha: f64, beta: f64) -> f64 {
    if x.is_nan() || !(alpha > 0.0) || !(beta > 0.0) {
        return f64::NAN;
    }
    if !(0.0..=1.0).contains(&x) {
        return 0.0;
    }
    let log_norm = log_beta(alpha, beta);
    let edge = |shape: f64| -> f64 {
        if shape < 1.0 {
            f64::INFINITY
        } else if shape > 1.0 {
            0.0
        } else {
            (-log_norm).exp()
        }
    };
    if x == 0.0 {
        return edge(alpha);
    }
    if x == 1.0 {
        return edge(beta);
    }
    ((alpha - 1.0) * x.ln() + (beta - 1.0) * (-x).ln_1p() - log_norm).exp()
}

/// Real part of the dilogarithm `Li2(x)` (Mathematica `PolyLog[2, x]`).
///
/// Equivalent to scipy's `spence(1 - x)` for real arguments. The argument is
/// mapped into `[-1, 1/2]` with the reflection and inversion identities and
/// the Bernoulli series is summed there.
pub fn dilog(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x.is_infinite() {
        return f64::NEG_INFINITY;
    }
    if x == 1.0 {
        return PI2_6;
    }
    if x > 2.0 {
        let l = x.ln();
        return 2.0 * PI2_6 - 0.5 * l * l - dilog_series(1.0 / x);
    }
    if x > 1.0 {
        return PI2_6 - x.ln() * (x - 1.0).ln() - dilog_series(1.0 - x);
    }
    if x > 0.5 {
        return PI2_6 - x.ln() * (-x).ln_1p() - dilog_series(1.0 - x);
    }
    if x >= -1.0 {
        return dilog_series(x);
    }
    let l = (-x).ln();
    -PI2_6 - 0.5 * l * l - dilog_series(1.0 / x)
}

/// Bernoulli series, accurate to double precision on `[-1, 1/2]`.
fn dilog_series(x: f64) -> f64 {
    let u = -(-x).ln_1p();
    let u2 = u * u;
    let mut power = u;
    let mut tail = 0.0;
    for c in DILOG_BERNOULLI {
        power *= u2;
        tail += c * power;
    }
    u - 0.25 * u2 + tail
}
