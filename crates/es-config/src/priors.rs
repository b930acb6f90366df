//! Prior configuration for the five spin parameters.
//!
//! Each parameter carries its own one-dimensional prior. The joint prior is
//! the product of the five marginals.

use serde::{Deserialize, Serialize};

use crate::validate::ValidationError;

/// One-dimensional prior on a single parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParameterPrior {
    /// Flat density on `[minimum, maximum]`.
    Uniform { minimum: f64, maximum: f64 },
    /// Beta(alpha, beta) stretched onto `[minimum, maximum]`.
    Beta {
        alpha: f64,
        beta: f64,
        minimum: f64,
        maximum: f64,
    },
}

impl ParameterPrior {
    pub fn uniform(minimum: f64, maximum: f64) -> Self {
        ParameterPrior::Uniform { minimum, maximum }
    }

    /// Support bounds `(minimum, maximum)`.
    pub fn bounds(&self) -> (f64, f64) {
        match *self {
            ParameterPrior::Uniform { minimum, maximum } => (minimum, maximum),
            ParameterPrior::Beta {
                minimum, maximum, ..
            } => (minimum, maximum),
        }
    }
}

/// Complete priors configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinPriors {
    pub schema_version: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Primary spin magnitude.
    pub a1: ParameterPrior,
    /// Secondary spin magnitude.
    pub a2: ParameterPrior,
    /// Mass ratio (secondary / primary).
    pub q: ParameterPrior,
    /// Cosine of the primary tilt.
    pub cos1: ParameterPrior,
    /// Cosine of the secondary tilt.
    pub cos2: ParameterPrior,
}

impl Default for SpinPriors {
    /// Uniform magnitudes and mass ratio, isotropic tilts.
    fn default() -> Self {
        Self {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            description: Some("uniform magnitudes, isotropic tilts".to_string()),
            a1: ParameterPrior::uniform(0.0, 1.0),
            a2: ParameterPrior::uniform(0.0, 1.0),
            q: ParameterPrior::uniform(0.0, 1.0),
            cos1: ParameterPrior::uniform(-1.0, 1.0),
            cos2: ParameterPrior::uniform(-1.0, 1.0),
        }
    }
}

impl SpinPriors {
    /// Load priors from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::from_json(&content)
    }

    /// Parse priors from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    /// Look up a parameter prior by its short name.
    pub fn get(&self, name: &str) -> Option<&ParameterPrior> {
        match name {
            "a1" => Some(&self.a1),
            "a2" => Some(&self.a2),
            "q" => Some(&self.q),
            "cos1" => Some(&self.cos1),
            "cos2" => Some(&self.cos2),
            _ => None,
        }
    }

    /// `(name, prior, physical domain)` for every parameter.
    pub fn entries(&self) -> [(&'static str, &ParameterPrior, (f64, f64)); 5] {
        [
            ("a1", &self.a1, (0.0, 1.0)),
            ("a2", &self.a2, (0.0, 1.0)),
            ("q", &self.q, (0.0, 1.0)),
            ("cos1", &self.cos1, (-1.0, 1.0)),
            ("cos2", &self.cos2, (-1.0, 1.0)),
        ]
    }
}
