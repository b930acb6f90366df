//! Numerical resolution settings.
//!
//! Sample counts and grid sizes trade accuracy for time. Defaults follow the
//! reference production settings; tests and quick looks shrink them.

use serde::{Deserialize, Serialize};

use crate::validate::ValidationError;

/// How the evidence p(xeff) used to normalise conditional priors is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceMethod {
    /// Closed-form p(xeff|q) averaged over q. Exact only for the isotropic
    /// prior with unit maximum spin.
    Analytic,
    /// Trapezoid over a1 of the Monte-Carlo joint p(a1, xeff).
    #[default]
    MonteCarlo,
}

impl std::fmt::Display for EvidenceMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvidenceMethod::Analytic => write!(f, "analytic"),
            EvidenceMethod::MonteCarlo => write!(f, "monte_carlo"),
        }
    }
}

/// Complete numerics configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Numerics {
    pub schema_version: String,

    /// Monte-Carlo draws per joint-density estimate.
    pub mc_samples: usize,

    /// a1 nodes for the Monte-Carlo evidence integral.
    pub evidence_points: usize,

    /// Mass-ratio nodes for the analytic marginal p(xeff).
    pub mass_ratio_points: usize,

    /// Parameter nodes when tabulating p(param | xeff).
    pub conditional_grid_points: usize,

    /// Nodes per stage of the xp pipeline.
    pub pipeline_grid_points: usize,

    /// Largest 1/a1 represented by the pipeline.
    pub inverse_cutoff: f64,

    /// Integration nodes with |a| at or below this are dropped from products.
    pub zero_tolerance: f64,

    /// Half-width of the averaging window at xeff case boundaries.
    pub boundary_epsilon: f64,

    /// Recursion limit for boundary averaging.
    pub boundary_max_depth: u32,

    pub evidence: EvidenceMethod,

    /// Fixed RNG seed; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for Numerics {
    fn default() -> Self {
        Self {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            mc_samples: 100_000,
            evidence_points: 10_000,
            mass_ratio_points: 300,
            conditional_grid_points: 200,
            pipeline_grid_points: 1_000,
            inverse_cutoff: 10.0,
            zero_tolerance: 1e-12,
            boundary_epsilon: 1e-6,
            boundary_max_depth: 8,
            evidence: EvidenceMethod::MonteCarlo,
            seed: None,
        }
    }
}

impl Numerics {
    /// Load numerics from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::from_json(&content)
    }

    /// Parse numerics from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    /// Same settings with a fixed seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// A cheap profile for tests and interactive exploration.
    pub fn coarse() -> Self {
        Self {
            mc_samples: 2_000,
            evidence_points: 100,
            mass_ratio_points: 100,
            conditional_grid_points: 41,
            pipeline_grid_points: 201,
            ..Self::default()
        }
    }
}
