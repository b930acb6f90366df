//! Configuration validation errors and semantic validation.

use thiserror::Error;

use crate::numerics::Numerics;
use crate::priors::{ParameterPrior, SpinPriors};

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::SemanticError(_) => 63,
            ValidationError::MissingField(_) => 64,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

fn check_version(actual: &str) -> ValidationResult<()> {
    if actual != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: actual.to_string(),
        });
    }
    Ok(())
}

/// Validate priors configuration semantically.
pub fn validate_priors(priors: &SpinPriors) -> ValidationResult<()> {
    check_version(&priors.schema_version)?;

    for (name, prior, domain) in priors.entries() {
        validate_parameter_prior(name, prior, domain)?;
    }

    Ok(())
}

/// Validate one parameter's prior against its physical domain.
fn validate_parameter_prior(
    name: &str,
    prior: &ParameterPrior,
    (lo, hi): (f64, f64),
) -> ValidationResult<()> {
    let (minimum, maximum) = prior.bounds();
    if !minimum.is_finite() || !maximum.is_finite() {
        return Err(ValidationError::InvalidValue {
            field: name.to_string(),
            message: format!("Bounds must be finite, got [{}, {}]", minimum, maximum),
        });
    }
    if minimum >= maximum {
        return Err(ValidationError::InvalidValue {
            field: name.to_string(),
            message: format!("minimum must be below maximum, got [{}, {}]", minimum, maximum),
        });
    }
    if minimum < lo || maximum > hi {
        return Err(ValidationError::InvalidValue {
            field: name.to_string(),
            message: format!(
                "Support [{}, {}] leaves the physical domain [{}, {}]",
                minimum, maximum, lo, hi
            ),
        });
    }

    if let ParameterPrior::Beta { alpha, beta, .. } = *prior {
        if !(alpha > 0.0) {
            return Err(ValidationError::InvalidValue {
                field: format!("{}.alpha", name),
                message: format!("Must be positive, got {}", alpha),
            });
        }
        if !(beta > 0.0) {
            return Err(ValidationError::InvalidValue {
                field: format!("{}.beta", name),
                message: format!("Must be positive, got {}", beta),
            });
        }
    }

    Ok(())
}

/// Validate numerics configuration semantically.
pub fn validate_numerics(numerics: &Numerics) -> ValidationResult<()> {
    check_version(&numerics.schema_version)?;

    for (field, value) in [
        ("mc_samples", numerics.mc_samples),
        ("evidence_points", numerics.evidence_points),
        ("mass_ratio_points", numerics.mass_ratio_points),
        ("conditional_grid_points", numerics.conditional_grid_points),
        ("pipeline_grid_points", numerics.pipeline_grid_points),
    ] {
        if value < 2 {
            return Err(ValidationError::InvalidValue {
                field: field.to_string(),
                message: format!("Must be at least 2, got {}", value),
            });
        }
    }

    if !(numerics.inverse_cutoff > 1.0) || !numerics.inverse_cutoff.is_finite() {
        return Err(ValidationError::InvalidValue {
            field: "inverse_cutoff".to_string(),
            message: format!("Must be finite and > 1, got {}", numerics.inverse_cutoff),
        });
    }

    for (field, value) in [
        ("zero_tolerance", numerics.zero_tolerance),
        ("boundary_epsilon", numerics.boundary_epsilon),
    ] {
        if !(value > 0.0) || !value.is_finite() {
            return Err(ValidationError::InvalidValue {
                field: field.to_string(),
                message: format!("Must be finite and positive, got {}", value),
            });
        }
    }

    if numerics.boundary_epsilon >= 0.01 {
        return Err(ValidationError::SemanticError(format!(
            "boundary_epsilon {} is too wide to smooth a single boundary",
            numerics.boundary_epsilon
        )));
    }

    Ok(())
}
