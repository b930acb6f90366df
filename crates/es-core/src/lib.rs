//! Effective-spins core library.
//!
//! This library provides:
//! - The five spin parameters and the χeff/χp conversions
//! - A prior collaborator that samples and evaluates spin priors
//! - A distribution transform engine (sum, product, inverse, affine,
//!   square-root complement) over sampled densities
//! - Monte-Carlo conditional priors p(param | χeff)
//! - The closed-form χeff prior for isotropic spins and its mass-ratio marginal
//! - The p(χp | χeff) pipeline built from those pieces
//! - Conditional probability tables and explicit caches
//! - Configuration loading, the error taxonomy and structured logging

pub mod cache;
pub mod conditional;
pub mod config;
pub mod conversions;
pub mod error;
pub mod logging;
pub mod params;
pub mod prior;
pub mod transform;
pub mod xeff_prior;
pub mod xp_given_xeff;

pub use cache::{
    tabulate_conditional, CacheKey, JsonDirCache, MemoryCache, ProbabilityCache, ProbabilityTable,
};
pub use conditional::ConditionalPriorEstimator;
pub use config::{load_config, Settings};
pub use error::{Error, ErrorCategory, Result};
pub use params::{SpinParameter, A_MAX};
pub use prior::{rng_from_seed, ParameterDistribution, PriorDict, SampleTable, SpinPrior};
pub use xeff_prior::{chi_effective_prior_from_isotropic_spins, marginal_chi_eff, MarginalChiEff};
pub use xp_given_xeff::{xp_given_xeff, ConditionalDensities, PipelineGrids, XpGivenXeff};
