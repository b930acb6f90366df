//! Effective-spin conversions.

use crate::params::SpinParameter;
use crate::prior::SampleTable;

/// Mass-ratio weighting of the secondary's in-plane spin.
pub fn q_factor(q: f64) -> f64 {
    ((3.0 + 4.0 * q) / (4.0 + 3.0 * q)) * q
}

/// Effective aligned spin `(a1 cos1 + q a2 cos2) / (1 + q)`.
pub fn chi_eff(a1: f64, a2: f64, cos1: f64, cos2: f64, q: f64) -> f64 {
    (a1 * cos1 + q * a2 * cos2) / (1.0 + q)
}

/// Effective precessing spin `max(a1 sin1, a2 sin2 q_factor(q))`.
pub fn chi_p(a1: f64, a2: f64, q: f64, sin1: f64, sin2: f64) -> f64 {
    (a1 * sin1).max(a2 * sin2 * q_factor(q))
}

/// χp recovered from a known χeff.
///
/// Each branch reconstructs one component's aligned projection from `xeff`
/// and the other component, then projects it in-plane with the tilt tangent.
/// Agrees with [`chi_p`] whenever `xeff` is consistent with the inputs.
#[allow(clippy::too_many_arguments)]
pub fn chi_p_given_chi_eff(
    xeff: f64,
    a1: f64,
    a2: f64,
    q: f64,
    cos1: f64,
    cos2: f64,
    tan1: f64,
    tan2: f64,
) -> f64 {
    let scaled = xeff * (1.0 + q);
    let primary = (scaled - a2 * q * cos2) * tan1;
    let secondary = (scaled - a1 * cos1) / q * tan2 * q_factor(q);
    primary.max(secondary)
}

/// Range of xeff reachable from `(a1, a2, q, cos2)` as cos1 spans [-1, 1].
pub fn xeff_limits(a1: f64, a2: f64, q: f64, cos2: f64) -> (f64, f64) {
    let aligned = a2 * q * cos2;
    ((-a1 + aligned) / (1.0 + q), (a1 + aligned) / (1.0 + q))
}

/// χeff of every row of a sample table.
pub fn chi_eff_column(table: &SampleTable) -> Vec<f64> {
    let a1 = table.column(SpinParameter::A1);
    let a2 = table.column(SpinParameter::A2);
    let q = table.column(SpinParameter::Q);
    let cos1 = table.column(SpinParameter::Cos1);
    let cos2 = table.column(SpinParameter::Cos2);
    (0..table.len())
        .map(|i| chi_eff(a1[i], a2[i], cos1[i], cos2[i], q[i]))
        .collect()
}

/// χp of every row of a sample table.
pub fn chi_p_column(table: &SampleTable) -> Vec<f64> {
    let a1 = table.column(SpinParameter::A1);
    let a2 = table.column(SpinParameter::A2);
    let q = table.column(SpinParameter::Q);
    let cos1 = table.column(SpinParameter::Cos1);
    let cos2 = table.column(SpinParameter::Cos2);
    (0..table.len())
        .map(|i| chi_p(a1[i], a2[i], q[i], sin_from_cos(cos1[i]), sin_from_cos(cos2[i])))
        .collect()
}

/// `sqrt(1 - c²)`, clamped so rounding just past |c| = 1 gives 0.
pub fn sin_from_cos(cos: f64) -> f64 {
    (1.0 - cos * cos).max(0.0).sqrt()
}
