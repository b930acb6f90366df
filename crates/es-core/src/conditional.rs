//! Conditional priors p(param | χeff) by Monte-Carlo marginalisation.
//!
//! Given `(a1, a2, q, cos2)` and `cos1 ~ U(-1, 1)`, χeff is uniform on
//! [`xeff_limits`]. Fixing one parameter at a candidate value and averaging
//! that uniform density over prior draws of the other three gives the joint
//! p(param = x, χeff = y) up to the parameter's own prior density:
//!
//! ```text
//! p(x, y) ≈ p(x) · (1/N) Σ_i U(y; lo_i, hi_i)
//! ```
//!
//! Dividing by the evidence p(y) yields the conditional. The evidence is
//! either the trapezoid over a1 of the Monte-Carlo joint, or the analytic
//! marginal of [`crate::xeff_prior`].
//!
//! Randomness is always drawn from a caller-supplied RNG; a seeded RNG makes
//! every estimate reproducible.

use rand::Rng;
use tracing::{debug, warn};

use es_config::{EvidenceMethod, Numerics};
use es_math::{finite_or_zero, make_grid, trapezoid_finite, Density};

use crate::conversions::xeff_limits;
use crate::error::{Error, Result};
use crate::logging::{event_names, Stage};
use crate::params::SpinParameter;
use crate::prior::{SampleTable, SpinPrior};
use crate::xeff_prior::{BoundarySmoothing, MarginalChiEff};

/// Uniform density on `[lo, hi]` at `y`; 0 for an empty or inverted window.
pub fn uniform_pdf(y: f64, lo: f64, hi: f64) -> f64 {
    if hi > lo && y >= lo && y <= hi {
        1.0 / (hi - lo)
    } else {
        0.0
    }
}

/// p(χeff = y | a1, a2, q, cos2) for every row of `samples`.
pub fn xeff_given_nuisance(samples: &SampleTable, xeff: f64) -> Vec<f64> {
    let a1 = samples.column(SpinParameter::A1);
    let a2 = samples.column(SpinParameter::A2);
    let q = samples.column(SpinParameter::Q);
    let cos2 = samples.column(SpinParameter::Cos2);
    (0..samples.len())
        .map(|i| {
            let (lo, hi) = xeff_limits(a1[i], a2[i], q[i], cos2[i]);
            uniform_pdf(xeff, lo, hi)
        })
        .collect()
}

/// Divide joint densities by their evidence, element by element.
///
/// Zero or non-finite evidence means `y` is outside the support of χeff;
/// the conditional there is 0.
pub fn conditional_from_joint(joint: &[f64], evidence: &[f64]) -> Result<Vec<f64>> {
    if joint.len() != evidence.len() {
        return Err(Error::InvalidGrid(format!(
            "joint has {} values but evidence has {}",
            joint.len(),
            evidence.len()
        )));
    }
    Ok(joint
        .iter()
        .zip(evidence)
        .map(|(&j, &e)| {
            if e > 0.0 && e.is_finite() {
                finite_or_zero(j / e)
            } else {
                0.0
            }
        })
        .collect())
}

/// Estimator of p(param, χeff) and p(param | χeff) under a fixed prior.
#[derive(Debug, Clone)]
pub struct ConditionalPriorEstimator<'p, P> {
    prior: &'p P,
    mc_samples: usize,
    evidence_points: usize,
    evidence_method: EvidenceMethod,
    marginal: MarginalChiEff,
}

impl<'p, P: SpinPrior> ConditionalPriorEstimator<'p, P> {
    pub fn new(prior: &'p P, numerics: &Numerics) -> Self {
        Self {
            prior,
            mc_samples: numerics.mc_samples,
            evidence_points: numerics.evidence_points,
            evidence_method: numerics.evidence,
            marginal: MarginalChiEff::new(numerics.mass_ratio_points).with_smoothing(
                BoundarySmoothing {
                    epsilon: numerics.boundary_epsilon,
                    max_depth: numerics.boundary_max_depth,
                },
            ),
        }
    }

    pub fn prior(&self) -> &P {
        self.prior
    }

    pub fn mc_samples(&self) -> usize {
        self.mc_samples
    }

    /// Same estimator with a different Monte-Carlo sample count.
    pub fn with_mc_samples(mut self, mc_samples: usize) -> Self {
        self.mc_samples = mc_samples;
        self
    }

    pub fn with_evidence_method(mut self, method: EvidenceMethod) -> Self {
        self.evidence_method = method;
        self
    }

    /// Draw the Monte-Carlo ensemble used by one estimate.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> SampleTable {
        self.prior.sample(self.mc_samples, rng)
    }

    /// p(param = value, χeff = xeff) over a given ensemble.
    ///
    /// The `param` column is read as `value` for every row; the ensemble
    /// itself is not modified.
    pub fn joint_density_from_samples(
        &self,
        samples: &SampleTable,
        param: SpinParameter,
        value: f64,
        xeff: f64,
    ) -> Result<f64> {
        param.ensure_conditionable()?;
        let n = samples.len();
        if n == 0 {
            return Ok(0.0);
        }
        let p_param = finite_or_zero(self.prior.probability_at(param, value));
        if p_param == 0.0 {
            return Ok(0.0);
        }
        Ok(p_param * window_mean(samples, param, value, xeff))
    }

    /// p(param = value, χeff = xeff) from a fresh ensemble.
    pub fn joint_density<R: Rng + ?Sized>(
        &self,
        param: SpinParameter,
        value: f64,
        xeff: f64,
        rng: &mut R,
    ) -> Result<f64> {
        param.ensure_conditionable()?;
        let samples = self.draw(rng);
        debug!(
            event = event_names::SAMPLE_BATCH,
            stage = %Stage::Sample,
            param = %param,
            value,
            xeff,
            samples = samples.len(),
            "joint density batch"
        );
        self.joint_density_from_samples(&samples, param, value, xeff)
    }

    /// p(param = v, χeff = xeff) for every `v` in `values`.
    ///
    /// One ensemble is drawn and shared by every grid value, so the
    /// Monte-Carlo error is correlated along the grid rather than independent
    /// per point.
    pub fn joint_density_on_grid<R: Rng + ?Sized>(
        &self,
        param: SpinParameter,
        values: &[f64],
        xeff: f64,
        rng: &mut R,
    ) -> Result<Vec<f64>> {
        param.ensure_conditionable()?;
        let samples = self.draw(rng);
        debug!(
            event = event_names::SAMPLE_BATCH,
            stage = %Stage::Sample,
            param = %param,
            xeff,
            points = values.len(),
            samples = samples.len(),
            "joint density grid batch"
        );
        values
            .iter()
            .map(|&v| self.joint_density_from_samples(&samples, param, v, xeff))
            .collect()
    }

    /// Evidence p(χeff = xeff) by the configured method.
    pub fn xeff_evidence<R: Rng + ?Sized>(&self, xeff: f64, rng: &mut R) -> f64 {
        let evidence = match self.evidence_method {
            EvidenceMethod::Analytic => finite_or_zero(self.marginal.density(xeff)),
            EvidenceMethod::MonteCarlo => {
                let samples = self.draw(rng);
                self.xeff_evidence_from_samples(&samples, xeff)
            }
        };
        debug!(
            event = event_names::EVIDENCE_COMPUTED,
            stage = %Stage::Evidence,
            method = %self.evidence_method,
            xeff,
            evidence,
            "evidence computed"
        );
        evidence
    }

    /// Monte-Carlo evidence: trapezoid over an a1 grid on [0, 1] of the
    /// joint p(a1, χeff) estimated from `samples`.
    pub fn xeff_evidence_from_samples(&self, samples: &SampleTable, xeff: f64) -> f64 {
        let (lo, hi) = SpinParameter::A1.domain();
        let a1_grid = make_grid(lo, hi, self.evidence_points);
        let joint: Vec<f64> = a1_grid
            .iter()
            .map(|&a1| {
                let p_a1 = finite_or_zero(self.prior.probability_at(SpinParameter::A1, a1));
                if p_a1 == 0.0 {
                    0.0
                } else {
                    p_a1 * window_mean(samples, SpinParameter::A1, a1, xeff)
                }
            })
            .collect();
        trapezoid_finite(&joint, &a1_grid)
    }

    /// p(param = value | χeff = xeff).
    pub fn conditional_density<R: Rng + ?Sized>(
        &self,
        param: SpinParameter,
        value: f64,
        xeff: f64,
        rng: &mut R,
    ) -> Result<f64> {
        let values = self.conditional_density_on_grid(param, &[value], xeff, rng)?;
        Ok(values.first().copied().unwrap_or(0.0))
    }

    /// p(param = v | χeff = xeff) for every `v` in `values`.
    ///
    /// The evidence is computed once and shared across the grid.
    pub fn conditional_density_on_grid<R: Rng + ?Sized>(
        &self,
        param: SpinParameter,
        values: &[f64],
        xeff: f64,
        rng: &mut R,
    ) -> Result<Vec<f64>> {
        param.ensure_conditionable()?;
        let evidence = self.xeff_evidence(xeff, rng);
        if !(evidence > 0.0) || !evidence.is_finite() {
            warn!(
                event = event_names::EVIDENCE_ZERO,
                stage = %Stage::Evidence,
                param = %param,
                xeff,
                evidence,
                "xeff outside prior support; conditional set to zero"
            );
            return Ok(vec![0.0; values.len()]);
        }
        let joint = self.joint_density_on_grid(param, values, xeff, rng)?;
        conditional_from_joint(&joint, &vec![evidence; joint.len()])
    }
}

/// Mean over rows of U(xeff; limits) with `param` read as `value`.
fn window_mean(samples: &SampleTable, param: SpinParameter, value: f64, xeff: f64) -> f64 {
    let n = samples.len();
    if n == 0 {
        return 0.0;
    }
    let a1 = unless_fixed(samples, param, SpinParameter::A1);
    let a2 = unless_fixed(samples, param, SpinParameter::A2);
    let q = unless_fixed(samples, param, SpinParameter::Q);
    let cos2 = unless_fixed(samples, param, SpinParameter::Cos2);
    let at = |col: Option<&[f64]>, i: usize| col.map_or(value, |c| c[i]);

    let mut total = 0.0;
    for i in 0..n {
        let (lo, hi) = xeff_limits(at(a1, i), at(a2, i), at(q, i), at(cos2, i));
        total += finite_or_zero(uniform_pdf(xeff, lo, hi));
    }
    total / n as f64
}

/// Column `p` of `samples`, or `None` when `p` is the fixed parameter.
fn unless_fixed(samples: &SampleTable, fixed: SpinParameter, p: SpinParameter) -> Option<&[f64]> {
    if p == fixed {
        None
    } else {
        Some(samples.column(p))
    }
}
