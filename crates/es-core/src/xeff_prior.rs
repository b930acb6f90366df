//! Closed-form χeff prior for isotropic, uniform-magnitude spins.
//!
//! For a fixed mass ratio `q` and maximum magnitude `aMax`, with `a1, a2 ~
//! U(0, aMax)` and `cos1, cos2 ~ U(-1, 1)`, the density of
//! `χeff = (a1 cos1 + q a2 cos2) / (1 + q)` is symmetric and piecewise
//! analytic in `|χeff|`. The pieces are separated by three thresholds
//!
//! ```text
//! lo  = aMax (1 - q) / (1 + q)
//! mid = aMax q / (1 + q)
//! hi  = aMax / (1 + q)
//! ```
//!
//! and [`XeffRegion::classify`] picks the piece. A point lying exactly on a
//! threshold has no formula of its own; [`smooth_boundary`] averages the
//! density just either side of it.
//!
//! [`marginal_chi_eff`] averages the per-q density over a uniform q grid to
//! give p(χeff) for the standard prior.

use es_math::{dilog, finite_or_zero, make_grid, mean_finite, Density};

use crate::params::A_MAX;

/// Geometric case selecting the closed form for `|χeff|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XeffRegion {
    /// `χeff = 0`.
    Origin,
    /// Below `lo` and `mid`.
    A,
    /// Below `lo`, above `mid`.
    B,
    /// Above `lo`, below `mid`.
    C,
    /// Above `lo` and `mid`, below `hi`.
    D,
    /// Above `lo` and `hi`, below `aMax`.
    E,
    /// `|χeff| >= aMax`: no support.
    Unsupported,
    /// Exactly on a threshold (or a non-finite query).
    Boundary,
}

impl XeffRegion {
    /// Select the case for `x = |χeff|` at mass ratio `q > 0`.
    pub fn classify(q: f64, a_max: f64, x: f64) -> Self {
        let x = x.abs();
        if x.is_nan() {
            return XeffRegion::Boundary;
        }
        if x == 0.0 {
            return XeffRegion::Origin;
        }
        if x >= a_max {
            return XeffRegion::Unsupported;
        }
        let r = 1.0 + q;
        let lo = a_max * (1.0 - q) / r;
        let mid = a_max * q / r;
        let hi = a_max / r;

        if x < lo && x < mid {
            XeffRegion::A
        } else if x < lo && x > mid {
            XeffRegion::B
        } else if x > lo && x < mid {
            XeffRegion::C
        } else if x > lo && x > mid && x < hi {
            XeffRegion::D
        } else if x > lo && x > hi {
            XeffRegion::E
        } else {
            XeffRegion::Boundary
        }
    }

    /// Closed-form density of this case at `x = |χeff|`.
    ///
    /// `Boundary` has no closed form and yields NaN; callers route it through
    /// [`smooth_boundary`].
    pub fn density(self, q: f64, a: f64, x: f64) -> f64 {
        let x = x.abs();
        let r = 1.0 + q;
        let rx = r * x;
        let qa = q * a;
        let pre = r / (4.0 * q * a * a);
        let la = a.ln();

        match self {
            XeffRegion::Origin => r / (2.0 * a) * (2.0 - q.ln()),
            XeffRegion::Unsupported => 0.0,
            XeffRegion::Boundary => f64::NAN,
            XeffRegion::A => {
                pre * (qa * (4.0 + 2.0 * la - (qa * qa - rx * rx).ln())
                    - 2.0 * rx * (rx / qa).atanh()
                    + rx * (dilog(-qa / rx) - dilog(qa / rx)))
            }
            XeffRegion::B => {
                pre * (4.0 * qa + 2.0 * qa * la
                    - 2.0 * rx * (qa / rx).atanh()
                    - qa * (rx * rx - qa * qa).ln()
                    + rx * (dilog(-qa / rx) - dilog(qa / rx)))
            }
            XeffRegion::C => {
                pre * (2.0 * r * (a - x) - rx * la * la
                    + (a + rx * rx.ln()) * (qa / (a - rx)).ln()
                    - rx * la * (2.0 + q.ln() - (a - rx).ln())
                    + qa * (a / (qa - rx)).ln()
                    + rx * ((a - rx) * (qa - rx) / q).ln()
                    + rx * (dilog(1.0 - a / rx) - dilog(qa / rx)))
            }
            XeffRegion::D => {
                pre * (-x * la * la + 2.0 * r * (a - x)
                    + qa * (a / (rx - qa)).ln()
                    + a * (qa / (a - rx)).ln()
                    - x * la * (2.0 * r - rx.ln() - q * (rx / a).ln())
                    + rx * ((rx - qa) * (a - rx) / q).ln()
                    + rx * (a / rx).ln() * ((a - rx) / q).ln()
                    + rx * (dilog(1.0 - a / rx) - dilog(qa / rx)))
            }
            XeffRegion::E => {
                pre * (2.0 * r * (a - x) - rx * la * la
                    + la * (a - 2.0 * rx - rx * (q / (rx - a)).ln())
                    - a * ((rx - a) / q).ln()
                    + rx * ((rx - a) * (rx - qa) / q).ln()
                    + rx * rx.ln() * (qa / (rx - a)).ln()
                    - qa * ((rx - qa) / a).ln()
                    + rx * (dilog(1.0 - a / rx) - dilog(qa / rx)))
            }
        }
    }
}

/// Half-width and recursion limit for averaging across case boundaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundarySmoothing {
    pub epsilon: f64,
    pub max_depth: u32,
}

impl Default for BoundarySmoothing {
    fn default() -> Self {
        Self {
            epsilon: 1e-6,
            max_depth: 8,
        }
    }
}

/// `0.5 · (f(x + ε) + f(|x - ε|))`.
///
/// The reflected lower point keeps the average on the symmetric density's
/// domain when `x < ε`.
pub fn smooth_boundary<F>(f: F, x: f64, epsilon: f64) -> f64
where
    F: Fn(f64) -> f64,
{
    0.5 * (f(x + epsilon) + f((x - epsilon).abs()))
}

/// p(χeff | q, aMax) with default boundary smoothing.
pub fn chi_effective_prior_from_isotropic_spins(q: f64, a_max: f64, xeff: f64) -> f64 {
    chi_effective_prior_with(q, a_max, xeff, BoundarySmoothing::default())
}

/// p(χeff | q, aMax) with explicit boundary smoothing.
///
/// Returns exactly 0 for `|χeff| >= aMax` and for invalid `q` or `aMax`.
pub fn chi_effective_prior_with(q: f64, a_max: f64, xeff: f64, smoothing: BoundarySmoothing) -> f64 {
    if !(a_max > 0.0) || !a_max.is_finite() || !(0.0..=1.0).contains(&q) {
        return 0.0;
    }
    let x = xeff.abs();
    if x >= a_max {
        return 0.0;
    }
    if q == 0.0 {
        return zero_mass_ratio_limit(a_max, x);
    }
    evaluate(q, a_max, x, smoothing, 0)
}

/// The q → 0 limit: χeff = a1 cos1, a product of two uniforms.
fn zero_mass_ratio_limit(a_max: f64, x: f64) -> f64 {
    if x == 0.0 {
        f64::INFINITY
    } else {
        (a_max / x).ln() / (2.0 * a_max)
    }
}

fn evaluate(q: f64, a_max: f64, x: f64, smoothing: BoundarySmoothing, depth: u32) -> f64 {
    match XeffRegion::classify(q, a_max, x) {
        XeffRegion::Boundary => {
            if depth >= smoothing.max_depth || x.is_nan() {
                return 0.0;
            }
            smooth_boundary(
                |y| evaluate(q, a_max, y, smoothing, depth + 1),
                x,
                smoothing.epsilon,
            )
        }
        region => region.density(q, a_max, x),
    }
}

/// p(χeff | q, aMax) at each of `xs`.
pub fn chi_effective_prior_many(q: f64, a_max: f64, xs: &[f64]) -> Vec<f64> {
    xs.iter()
        .map(|&x| chi_effective_prior_from_isotropic_spins(q, a_max, x))
        .collect()
}

/// Marginal p(χeff) of the standard prior, averaged over a uniform q grid.
#[derive(Debug, Clone)]
pub struct MarginalChiEff {
    mass_ratios: Vec<f64>,
    a_max: f64,
    smoothing: BoundarySmoothing,
}

impl MarginalChiEff {
    /// `mass_ratio_points` q nodes on [0, 1], unit maximum spin.
    pub fn new(mass_ratio_points: usize) -> Self {
        Self {
            mass_ratios: make_grid(0.0, 1.0, mass_ratio_points),
            a_max: A_MAX,
            smoothing: BoundarySmoothing::default(),
        }
    }

    pub fn with_a_max(mut self, a_max: f64) -> Self {
        self.a_max = a_max;
        self
    }

    pub fn with_smoothing(mut self, smoothing: BoundarySmoothing) -> Self {
        self.smoothing = smoothing;
        self
    }

    pub fn mass_ratios(&self) -> &[f64] {
        &self.mass_ratios
    }
}

impl Density for MarginalChiEff {
    fn density(&self, x: f64) -> f64 {
        let per_q: Vec<f64> = self
            .mass_ratios
            .iter()
            .map(|&q| finite_or_zero(chi_effective_prior_with(q, self.a_max, x, self.smoothing)))
            .collect();
        mean_finite(&per_q)
    }
}

/// p(χeff) at each of `xs`, averaging over `mass_ratio_points` q nodes.
pub fn marginal_chi_eff(xs: &[f64], mass_ratio_points: usize) -> Vec<f64> {
    MarginalChiEff::new(mass_ratio_points).density_many(xs)
}
