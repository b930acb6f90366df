//! Prior collaborator: joint sampling and per-parameter marginal densities.
//!
//! The estimators only need two capabilities from a prior, captured by
//! [`SpinPrior`]: draw a column-oriented [`SampleTable`], and evaluate one
//! parameter's marginal density on a batch of values. [`PriorDict`] is the
//! concrete implementation built from configuration.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Distribution;

use es_config::{ParameterPrior, SpinPriors};
use es_math::{beta_pdf, Density};

use crate::error::{Error, Result};
use crate::params::SpinParameter;

/// Deterministic RNG when `seed` is given, OS entropy otherwise.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// `n` joint draws, one column per [`SpinParameter`].
#[derive(Debug, Clone, PartialEq)]
pub struct SampleTable {
    columns: [Vec<f64>; 5],
}

impl SampleTable {
    /// Build from columns in [`SpinParameter::ALL`] order.
    pub fn from_columns(columns: [Vec<f64>; 5]) -> Result<Self> {
        let expected = columns[0].len();
        for (param, column) in SpinParameter::ALL.iter().zip(&columns) {
            if column.len() != expected {
                return Err(Error::RaggedTable {
                    column: param.key().to_string(),
                    len: column.len(),
                    expected,
                });
            }
        }
        Ok(Self { columns })
    }

    pub fn len(&self) -> usize {
        self.columns[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column(&self, param: SpinParameter) -> &[f64] {
        &self.columns[param.index()]
    }

    pub fn column_mut(&mut self, param: SpinParameter) -> &mut [f64] {
        &mut self.columns[param.index()]
    }

    /// Overwrite every draw of `param` with `value`.
    pub fn fill(&mut self, param: SpinParameter, value: f64) {
        self.column_mut(param).fill(value);
    }

    /// Copy with `param` fixed at `value`; the other columns are untouched.
    pub fn with_fixed(&self, param: SpinParameter, value: f64) -> Self {
        let mut table = self.clone();
        table.fill(param, value);
        table
    }
}

/// Joint prior over the five spin parameters.
pub trait SpinPrior {
    /// Draw `n` joint samples.
    fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> SampleTable;

    /// Marginal density of `param` at each of `values`.
    fn probability(&self, param: SpinParameter, values: &[f64]) -> Vec<f64>;

    /// Marginal density of `param` at a single value.
    fn probability_at(&self, param: SpinParameter, value: f64) -> f64 {
        self.probability(param, &[value])
            .first()
            .copied()
            .unwrap_or(0.0)
    }
}

/// One parameter's marginal prior, ready to sample and evaluate.
#[derive(Debug, Clone)]
pub enum ParameterDistribution {
    Uniform {
        minimum: f64,
        maximum: f64,
    },
    /// Beta(alpha, beta) stretched onto `[minimum, maximum]`.
    Beta {
        alpha: f64,
        beta: f64,
        minimum: f64,
        maximum: f64,
        sampler: rand_distr::Beta<f64>,
    },
}

impl ParameterDistribution {
    pub fn uniform(minimum: f64, maximum: f64) -> Result<Self> {
        if !(minimum < maximum) || !minimum.is_finite() || !maximum.is_finite() {
            return Err(Error::Config(format!(
                "uniform bounds must be finite and ordered, got [{}, {}]",
                minimum, maximum
            )));
        }
        Ok(ParameterDistribution::Uniform { minimum, maximum })
    }

    pub fn scaled_beta(alpha: f64, beta: f64, minimum: f64, maximum: f64) -> Result<Self> {
        if !(minimum < maximum) || !minimum.is_finite() || !maximum.is_finite() {
            return Err(Error::Config(format!(
                "beta bounds must be finite and ordered, got [{}, {}]",
                minimum, maximum
            )));
        }
        let sampler = rand_distr::Beta::new(alpha, beta).map_err(|e| {
            Error::Config(format!("invalid beta shape ({}, {}): {}", alpha, beta, e))
        })?;
        Ok(ParameterDistribution::Beta {
            alpha,
            beta,
            minimum,
            maximum,
            sampler,
        })
    }

    pub fn from_config(prior: &ParameterPrior) -> Result<Self> {
        match *prior {
            ParameterPrior::Uniform { minimum, maximum } => Self::uniform(minimum, maximum),
            ParameterPrior::Beta {
                alpha,
                beta,
                minimum,
                maximum,
            } => Self::scaled_beta(alpha, beta, minimum, maximum),
        }
    }

    pub fn bounds(&self) -> (f64, f64) {
        match *self {
            ParameterDistribution::Uniform { minimum, maximum }
            | ParameterDistribution::Beta {
                minimum, maximum, ..
            } => (minimum, maximum),
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            ParameterDistribution::Uniform { minimum, maximum } => {
                rng.random_range(*minimum..=*maximum)
            }
            ParameterDistribution::Beta {
                minimum,
                maximum,
                sampler,
                ..
            } => minimum + (maximum - minimum) * sampler.sample(rng),
        }
    }
}

impl Density for ParameterDistribution {
    fn density(&self, x: f64) -> f64 {
        match *self {
            ParameterDistribution::Uniform { minimum, maximum } => {
                if x >= minimum && x <= maximum {
                    1.0 / (maximum - minimum)
                } else {
                    0.0
                }
            }
            ParameterDistribution::Beta {
                alpha,
                beta,
                minimum,
                maximum,
                ..
            } => {
                let width = maximum - minimum;
                beta_pdf((x - minimum) / width, alpha, beta) / width
            }
        }
    }
}

/// Independent product of five [`ParameterDistribution`]s.
#[derive(Debug, Clone)]
pub struct PriorDict {
    marginals: [ParameterDistribution; 5],
}

impl PriorDict {
    /// Build from validated configuration.
    pub fn from_priors(priors: &SpinPriors) -> Result<Self> {
        Ok(Self {
            marginals: [
                ParameterDistribution::from_config(&priors.a1)?,
                ParameterDistribution::from_config(&priors.a2)?,
                ParameterDistribution::from_config(&priors.q)?,
                ParameterDistribution::from_config(&priors.cos1)?,
                ParameterDistribution::from_config(&priors.cos2)?,
            ],
        })
    }

    /// Uniform magnitudes and mass ratio, isotropic tilts.
    pub fn isotropic() -> Self {
        let unit = ParameterDistribution::Uniform {
            minimum: 0.0,
            maximum: 1.0,
        };
        let tilt = ParameterDistribution::Uniform {
            minimum: -1.0,
            maximum: 1.0,
        };
        Self {
            marginals: [unit.clone(), unit.clone(), unit, tilt.clone(), tilt],
        }
    }

    pub fn marginal(&self, param: SpinParameter) -> &ParameterDistribution {
        &self.marginals[param.index()]
    }

    /// Replace one marginal.
    pub fn with_marginal(mut self, param: SpinParameter, dist: ParameterDistribution) -> Self {
        self.marginals[param.index()] = dist;
        self
    }
}

impl Default for PriorDict {
    fn default() -> Self {
        Self::isotropic()
    }
}

impl SpinPrior for PriorDict {
    fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> SampleTable {
        // Row-major draw order keeps a seeded table independent of how the
        // columns are later consumed.
        let mut columns: [Vec<f64>; 5] = Default::default();
        for column in columns.iter_mut() {
            column.reserve_exact(n);
        }
        for _ in 0..n {
            for (column, marginal) in columns.iter_mut().zip(&self.marginals) {
                column.push(marginal.sample(rng));
            }
        }
        SampleTable { columns }
    }

    fn probability(&self, param: SpinParameter, values: &[f64]) -> Vec<f64> {
        self.marginal(param).density_many(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_isotropic_densities() {
        let prior = PriorDict::isotropic();
        assert_eq!(
            prior.probability(SpinParameter::A1, &[-0.1, 0.0, 0.5, 1.0, 1.1]),
            vec![0.0, 1.0, 1.0, 1.0, 0.0]
        );
        assert_eq!(prior.probability_at(SpinParameter::Cos2, 0.3), 0.5);
    }

    #[test]
    fn test_samples_stay_in_domain() {
        let prior = PriorDict::isotropic();
        let mut rng = rng_from_seed(Some(11));
        let table = prior.sample(2_000, &mut rng);
        assert_eq!(table.len(), 2_000);
        for param in SpinParameter::ALL {
            let (lo, hi) = param.domain();
            assert!(table.column(param).iter().all(|&v| v >= lo && v <= hi));
        }
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() {
        let prior = PriorDict::isotropic();
        let a = prior.sample(100, &mut rng_from_seed(Some(5)));
        let b = prior.sample(100, &mut rng_from_seed(Some(5)));
        let c = prior.sample(100, &mut rng_from_seed(Some(6)));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_with_fixed_only_touches_one_column() {
        let prior = PriorDict::isotropic();
        let table = prior.sample(50, &mut rng_from_seed(Some(1)));
        let fixed = table.with_fixed(SpinParameter::Q, 0.25);
        assert!(fixed.column(SpinParameter::Q).iter().all(|&v| v == 0.25));
        assert_eq!(fixed.column(SpinParameter::A1), table.column(SpinParameter::A1));
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let err = SampleTable::from_columns([
            vec![0.1, 0.2],
            vec![0.1, 0.2],
            vec![0.1],
            vec![0.1, 0.2],
            vec![0.1, 0.2],
        ])
        .unwrap_err();
        assert!(matches!(err, Error::RaggedTable { ref column, .. } if column == "q"));
    }

    #[test]
    fn test_scaled_beta_density_and_mean() {
        let dist = ParameterDistribution::scaled_beta(2.0, 2.0, -1.0, 1.0).unwrap();
        // Beta(2,2) on [-1,1]: 6 t (1-t) / 2 with t = (x+1)/2; peak 0.75 at 0.
        assert!(approx_eq(dist.density(0.0), 0.75, 1e-10));
        assert_eq!(dist.density(1.5), 0.0);

        let mut rng = rng_from_seed(Some(3));
        let n = 20_000;
        let mean: f64 = (0..n).map(|_| dist.sample(&mut rng)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.02, "mean = {}", mean);
    }

    #[test]
    fn test_invalid_beta_shape() {
        assert!(ParameterDistribution::scaled_beta(0.0, 1.0, 0.0, 1.0).is_err());
        assert!(ParameterDistribution::uniform(1.0, 0.0).is_err());
    }

    #[test]
    fn test_from_default_config_matches_isotropic() {
        let prior = PriorDict::from_priors(&SpinPriors::default()).unwrap();
        let iso = PriorDict::isotropic();
        for param in SpinParameter::ALL {
            assert_eq!(prior.marginal(param).bounds(), iso.marginal(param).bounds());
        }
    }

    #[test]
    fn test_with_marginal_replaces_one_parameter() {
        let narrow = ParameterDistribution::uniform(0.2, 0.4).unwrap();
        let prior = PriorDict::isotropic().with_marginal(SpinParameter::Q, narrow);
        assert_eq!(prior.marginal(SpinParameter::Q).bounds(), (0.2, 0.4));
        assert_eq!(prior.marginal(SpinParameter::A1).bounds(), (0.0, 1.0));

        let table = prior.sample(500, &mut rng_from_seed(Some(9)));
        assert!(table.column(SpinParameter::Q).iter().all(|&q| (0.2..=0.4).contains(&q)));
    }
}
