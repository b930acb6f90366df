//! p(χp | χeff) by chaining the transform engine.
//!
//! With χeff fixed, χp is rebuilt from the conditioned parameters through
//!
//! ```text
//! a = χeff (q + 1) / a1
//! b = a2 q cos2 / a1
//! c = a - b            (= cos1)
//! d = sqrt(1 - c²)     (= sin1)
//! χp = a1 d
//! ```
//!
//! Every intermediate is sampled on its own grid and kept as a bounded
//! interpolant, so the next stage consumes it as an ordinary density.
//! Intermediates are not renormalised; the mass each retains is logged.

use rand::Rng;
use tracing::{debug, info, warn};

use es_config::Numerics;
use es_math::{make_grid, make_grid_between, Density, LinearInterpolant};

use crate::cache::{
    tabulate_conditional, CacheKey, ProbabilityCache, ProbabilityTable, XEFF_KEY_RESOLUTION,
};
use crate::conditional::ConditionalPriorEstimator;
use crate::error::{Error, Result};
use crate::logging::{event_names, Stage};
use crate::params::SpinParameter;
use crate::prior::SpinPrior;
use crate::transform::{
    affine_interp, inverse_interp, negate_interp, product_interp, sqrt_complement_grid,
    sqrt_complement_interp, sum_interp,
};

/// Retained mass below which a stage is reported as lossy.
pub const MASS_LOSS_WARN: f64 = 0.5;

/// Resolution and truncation of the pipeline grids.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineGrids {
    /// Points per stage grid.
    pub points: usize,
    /// Upper end `k` of the 1/a1 grid `[1, k]`.
    pub inverse_cutoff: f64,
    /// Product integration nodes with `|a|` at or below this are dropped.
    pub zero_tolerance: f64,
}

impl PipelineGrids {
    pub fn from_numerics(numerics: &Numerics) -> Self {
        Self {
            points: numerics.pipeline_grid_points,
            inverse_cutoff: numerics.inverse_cutoff,
            zero_tolerance: numerics.zero_tolerance,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.points < 2 {
            return Err(Error::InvalidGrid(format!(
                "pipeline grids need at least 2 points, got {}",
                self.points
            )));
        }
        if !(self.inverse_cutoff > 1.0) || !self.inverse_cutoff.is_finite() {
            return Err(Error::InvalidGrid(format!(
                "inverse cutoff must be finite and > 1, got {}",
                self.inverse_cutoff
            )));
        }
        Ok(())
    }

    fn over(&self, (lo, hi): (f64, f64)) -> Vec<f64> {
        make_grid(lo, hi, self.points)
    }
}

impl Default for PipelineGrids {
    fn default() -> Self {
        Self::from_numerics(&Numerics::default())
    }
}

/// Bounded p(param | χeff) for the four conditioned parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalDensities {
    pub xeff: f64,
    pub a1: LinearInterpolant,
    pub a2: LinearInterpolant,
    pub q: LinearInterpolant,
    pub cos2: LinearInterpolant,
}

impl ConditionalDensities {
    pub fn get(&self, param: SpinParameter) -> Result<&LinearInterpolant> {
        match param {
            SpinParameter::A1 => Ok(&self.a1),
            SpinParameter::A2 => Ok(&self.a2),
            SpinParameter::Q => Ok(&self.q),
            SpinParameter::Cos2 => Ok(&self.cos2),
            SpinParameter::Cos1 => Err(Error::UnsupportedConditioning(param.to_string())),
        }
    }

    /// Rebuild the interpolants from cached tables at `xeff`.
    pub fn from_cache<C: ProbabilityCache + ?Sized>(cache: &C, xeff: f64) -> Result<Self> {
        let load = |param: SpinParameter| -> Result<LinearInterpolant> {
            let key = CacheKey::new(param, xeff)?;
            cache
                .load(&key)?
                .interpolant_at(key.xeff, XEFF_KEY_RESOLUTION / 2.0)
        };
        Ok(Self {
            xeff,
            a1: load(SpinParameter::A1)?,
            a2: load(SpinParameter::A2)?,
            q: load(SpinParameter::Q)?,
            cos2: load(SpinParameter::Cos2)?,
        })
    }

    /// Estimate each conditional on `points` values spanning its domain.
    pub fn from_estimator<P, R>(
        estimator: &ConditionalPriorEstimator<'_, P>,
        points: usize,
        xeff: f64,
        rng: &mut R,
    ) -> Result<Self>
    where
        P: SpinPrior,
        R: Rng + ?Sized,
    {
        let mut estimate = |param: SpinParameter| -> Result<LinearInterpolant> {
            let (lo, hi) = param.domain();
            let values = make_grid(lo, hi, points);
            tabulate_conditional(estimator, param, &values, xeff, &mut *rng)?
                .interpolant_at(xeff, 0.0)
        };
        Ok(Self {
            xeff,
            a1: estimate(SpinParameter::A1)?,
            a2: estimate(SpinParameter::A2)?,
            q: estimate(SpinParameter::Q)?,
            cos2: estimate(SpinParameter::Cos2)?,
        })
    }

    /// Tabulate all four conditionals at `xeff` into `cache`.
    pub fn store<C: ProbabilityCache + ?Sized>(&self, cache: &mut C) -> Result<()> {
        for param in SpinParameter::CONDITIONED {
            let interp = self.get(param)?;
            let table = ProbabilityTable::at_xeff(
                param,
                interp.grid().to_vec(),
                self.xeff,
                interp.values().to_vec(),
            )?;
            cache.store(&CacheKey::new(param, self.xeff)?, &table)?;
        }
        Ok(())
    }
}

/// Every stage of the p(χp | χeff) decomposition at one χeff.
///
/// For `|χeff| <= zero_tolerance`, `a` vanishes: `scaled_q_plus_one` and `a`
/// are `None` and `c` is the negation of `b`.
#[derive(Debug, Clone)]
pub struct XpGivenXeff {
    pub xeff: f64,
    /// q + 1 on [1, 2].
    pub q_plus_one: LinearInterpolant,
    /// χeff (q + 1) between χeff and 2 χeff.
    pub scaled_q_plus_one: Option<LinearInterpolant>,
    /// 1 / a1 on [1, k].
    pub inverse_a1: LinearInterpolant,
    /// a between χeff and 2k χeff.
    pub a: Option<LinearInterpolant>,
    /// a2 q on [0, 1].
    pub a2_q: LinearInterpolant,
    /// a2 q cos2 on [-1, 1].
    pub a2_q_cos2: LinearInterpolant,
    /// b on [-k, k].
    pub b: LinearInterpolant,
    /// c on [-1, 1].
    pub c: LinearInterpolant,
    /// d on [0, 1], with knots crowded toward 1.
    pub d: LinearInterpolant,
    /// χp on [0, 1].
    pub xp: LinearInterpolant,
}

impl XpGivenXeff {
    /// Run the ten stages over `densities`.
    pub fn compute(densities: &ConditionalDensities, grids: &PipelineGrids) -> Result<Self> {
        grids.validate()?;
        let xeff = densities.xeff;
        let k = grids.inverse_cutoff;
        let tol = grids.zero_tolerance;
        let unit = grids.over((0.0, 1.0));
        let signed_unit = grids.over((-1.0, 1.0));

        let q_plus_one = affine_interp(&grids.over((1.0, 2.0)), &densities.q, 1.0, 1.0)?;
        stage_mass(1, "q_plus_one", &q_plus_one);

        let inverse_a1 = inverse_interp(&grids.over((1.0, k)), &densities.a1)?;
        stage_mass(3, "inverse_a1", &inverse_a1);

        let (scaled_q_plus_one, a) = if xeff.abs() > tol {
            let scaled_grid = make_grid_between(xeff, 2.0 * xeff, grids.points);
            let scaled = affine_interp(&scaled_grid, &q_plus_one, xeff, 0.0)?;
            stage_mass(2, "scaled_q_plus_one", &scaled);

            let a_grid = make_grid_between(xeff, 2.0 * k * xeff, grids.points);
            let a = product_interp(&a_grid, scaled.grid(), &scaled, &inverse_a1, tol)?;
            stage_mass(4, "a", &a);
            (Some(scaled), Some(a))
        } else {
            debug!(
                event = event_names::PIPELINE_STAGE,
                stage = %Stage::Pipeline,
                xeff,
                "xeff at zero; a vanishes and c = -b"
            );
            (None, None)
        };

        let a2_q = product_interp(&unit, densities.a2.grid(), &densities.a2, &densities.q, tol)?;
        stage_mass(5, "a2_q", &a2_q);

        let a2_q_cos2 = product_interp(&signed_unit, a2_q.grid(), &a2_q, &densities.cos2, tol)?;
        stage_mass(6, "a2_q_cos2", &a2_q_cos2);

        let b = product_interp(
            &grids.over((-k, k)),
            a2_q_cos2.grid(),
            &a2_q_cos2,
            &inverse_a1,
            tol,
        )?;
        stage_mass(7, "b", &b);

        let c = match &a {
            Some(a) => {
                let neg_b = negate_interp(b.grid(), &b)?;
                sum_interp(&signed_unit, a.grid(), a, &neg_b)?
            }
            None => negate_interp(&signed_unit, &b)?,
        };
        stage_mass(8, "c", &c);

        let d = sqrt_complement_interp(&sqrt_complement_grid(grids.points), &c)?;
        stage_mass(9, "d", &d);

        let xp = product_interp(&unit, densities.a1.grid(), &densities.a1, &d, tol)?;
        let mass = stage_mass(10, "xp", &xp);

        info!(
            event = event_names::PIPELINE_FINISHED,
            stage = %Stage::Pipeline,
            xeff,
            points = grids.points,
            inverse_cutoff = k,
            mass,
            "xp|xeff pipeline finished"
        );

        Ok(Self {
            xeff,
            q_plus_one,
            scaled_q_plus_one,
            inverse_a1,
            a,
            a2_q,
            a2_q_cos2,
            b,
            c,
            d,
            xp,
        })
    }

    /// p(χp | χeff) at each query point; 0 outside [0, 1].
    ///
    /// Not renormalised: the values integrate to the mass the stages kept,
    /// `self.xp.integral()`. See [`Self::normalised_density`].
    pub fn density(&self, xp: &[f64]) -> Vec<f64> {
        self.xp.density_many(xp)
    }

    /// [`Self::density`] divided by the retained mass. All zeros if no mass
    /// survived.
    pub fn normalised_density(&self, xp: &[f64]) -> Vec<f64> {
        let mass = self.xp.integral();
        if !(mass > 0.0) {
            return vec![0.0; xp.len()];
        }
        self.density(xp).into_iter().map(|p| p / mass).collect()
    }
}

/// p(χp | χeff) end to end: estimate the conditionals, then run the stages.
pub fn xp_given_xeff<P, R>(
    estimator: &ConditionalPriorEstimator<'_, P>,
    numerics: &Numerics,
    xeff: f64,
    rng: &mut R,
) -> Result<XpGivenXeff>
where
    P: SpinPrior,
    R: Rng + ?Sized,
{
    let densities =
        ConditionalDensities::from_estimator(estimator, numerics.conditional_grid_points, xeff, rng)?;
    XpGivenXeff::compute(&densities, &PipelineGrids::from_numerics(numerics))
}

fn stage_mass(index: usize, name: &str, density: &LinearInterpolant) -> f64 {
    let mass = density.integral();
    debug!(
        event = event_names::PIPELINE_STAGE,
        stage = %Stage::Pipeline,
        index,
        name,
        points = density.grid().len(),
        mass,
        "pipeline stage"
    );
    if !(mass >= MASS_LOSS_WARN) {
        warn!(
            event = event_names::PIPELINE_MASS_LOST,
            stage = %Stage::Pipeline,
            index,
            name,
            mass,
            "stage retains little probability mass"
        );
    }
    mass
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;

    fn uniform_interp(lo: f64, hi: f64) -> LinearInterpolant {
        let xs = make_grid(lo, hi, 201);
        let ys = vec![1.0 / (hi - lo); xs.len()];
        LinearInterpolant::bounded(xs, ys).unwrap()
    }

    fn isotropic_densities(xeff: f64) -> ConditionalDensities {
        ConditionalDensities {
            xeff,
            a1: uniform_interp(0.0, 1.0),
            a2: uniform_interp(0.0, 1.0),
            q: uniform_interp(0.0, 1.0),
            cos2: uniform_interp(-1.0, 1.0),
        }
    }

    fn small_grids() -> PipelineGrids {
        PipelineGrids {
            points: 201,
            inverse_cutoff: 10.0,
            zero_tolerance: 1e-12,
        }
    }

    #[test]
    fn test_rejects_tiny_grids() {
        let grids = PipelineGrids {
            points: 1,
            ..small_grids()
        };
        let err = XpGivenXeff::compute(&isotropic_densities(0.1), &grids).unwrap_err();
        assert!(matches!(err, Error::InvalidGrid(_)));
    }

    #[test]
    fn test_stage_supports() {
        let result = XpGivenXeff::compute(&isotropic_densities(0.1), &small_grids()).unwrap();
        assert_eq!(result.q_plus_one.support(), (1.0, 2.0));
        assert_eq!(result.inverse_a1.support(), (1.0, 10.0));
        let a = result.a.as_ref().unwrap();
        let (lo, hi) = a.support();
        assert!((lo - 0.1).abs() < 1e-12 && (hi - 2.0).abs() < 1e-12);
        assert_eq!(result.b.support(), (-10.0, 10.0));
        assert_eq!(result.c.support(), (-1.0, 1.0));
        assert_eq!(result.xp.support(), (0.0, 1.0));
    }

    #[test]
    fn test_q_plus_one_is_shifted_uniform() {
        let result = XpGivenXeff::compute(&isotropic_densities(0.1), &small_grids()).unwrap();
        let mid = result.q_plus_one.density(1.5);
        assert!((mid - 1.0).abs() < 1e-9);
        assert!((result.q_plus_one.integral() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_xeff_grids_increase() {
        let result = XpGivenXeff::compute(&isotropic_densities(-0.2), &small_grids()).unwrap();
        let scaled = result.scaled_q_plus_one.as_ref().unwrap();
        let (lo, hi) = scaled.support();
        assert!((lo + 0.4).abs() < 1e-12 && (hi + 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_zero_xeff_collapses_a() {
        let result = XpGivenXeff::compute(&isotropic_densities(0.0), &small_grids()).unwrap();
        assert!(result.a.is_none());
        assert!(result.scaled_q_plus_one.is_none());
        for z in [-0.5, 0.0, 0.3] {
            assert!((result.c.density(z) - result.b.density(-z)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_xp_density_finite_and_bounded() {
        let result = XpGivenXeff::compute(&isotropic_densities(0.1), &small_grids()).unwrap();
        let values = result.density(&[-0.5, 0.0, 0.25, 0.5, 0.75, 1.0, 1.5]);
        assert!(values.iter().all(|v| v.is_finite() && *v >= 0.0));
        assert_eq!(values[0], 0.0);
        assert_eq!(values[6], 0.0);
        assert!(result.xp.integral() > 0.0);
    }

    #[test]
    fn test_sqrt_complement_stage_keeps_mass() {
        for xeff in [0.0, 0.1, 0.3] {
            let result = XpGivenXeff::compute(&isotropic_densities(xeff), &small_grids()).unwrap();
            let (c, d) = (result.c.integral(), result.d.integral());
            assert!((c - d).abs() < 0.01, "xeff {}: c {} d {}", xeff, c, d);
            assert_eq!(result.d.support(), (0.0, 1.0));
        }
    }

    #[test]
    fn test_normalised_density_integrates_to_one() {
        let result = XpGivenXeff::compute(&isotropic_densities(0.3), &small_grids()).unwrap();
        let grid = result.xp.grid().to_vec();
        let raw = es_math::trapezoid(&result.density(&grid), &grid);
        let normalised = es_math::trapezoid(&result.normalised_density(&grid), &grid);
        assert!(raw < 0.9, "raw mass {}", raw);
        assert!((normalised - 1.0).abs() < 1e-9, "normalised mass {}", normalised);
        assert_eq!(result.normalised_density(&[1.5]), vec![0.0]);
    }

    #[test]
    fn test_cos1_not_available() {
        let densities = isotropic_densities(0.1);
        assert!(densities.get(SpinParameter::Cos1).is_err());
        assert!(densities.get(SpinParameter::Cos2).is_ok());
    }

    #[test]
    fn test_densities_round_trip_through_cache() {
        let densities = isotropic_densities(0.1);
        let mut cache = MemoryCache::new();
        densities.store(&mut cache).unwrap();
        assert_eq!(cache.len(), 4);
        let back = ConditionalDensities::from_cache(&cache, 0.1).unwrap();
        assert_eq!(back, densities);
    }

    #[test]
    fn test_from_cache_reports_miss() {
        let cache = MemoryCache::new();
        let err = ConditionalDensities::from_cache(&cache, 0.1).unwrap_err();
        assert!(matches!(err, Error::CacheMiss(_)));
    }
}
