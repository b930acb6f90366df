//! Error types for the effective-spins core.
//!
//! Only precondition violations surface as [`Error`]. Numerical edge cases
//! (a query outside a parameter's support, a division by a near-zero
//! integration node, a prior evaluated off its support) are clamped to zero
//! density where they arise and never reach this type.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use es_config::ValidationError;
use es_math::InterpolationError;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Configuration and precondition errors.
    Config,
    /// Grid and interpolant construction errors.
    Numerical,
    /// Probability table and cache errors.
    Cache,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Numerical => write!(f, "numerical"),
            ErrorCategory::Cache => write!(f, "cache"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for the core.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("cannot condition on {0}: it is marginalised analytically")]
    UnsupportedConditioning(String),

    #[error("affine scale must be non-zero")]
    DegenerateScale,

    // Numerical construction errors (30-39)
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    #[error("interpolation failed: {0}")]
    Interpolation(#[from] InterpolationError),

    // Cache errors (50-59)
    #[error("malformed cache key: {0}")]
    MalformedKey(String),

    #[error("missing column: {0}")]
    MissingColumn(String),

    #[error("ragged table: column {column} has {len} rows, expected {expected}")]
    RaggedTable {
        column: String,
        len: usize,
        expected: usize,
    },

    #[error("table holds {actual}, expected {expected}")]
    ParameterMismatch { expected: String, actual: String },

    #[error("no cached table for {0}")]
    CacheMiss(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 30-39: Numerical construction errors
    /// - 50-59: Cache errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::Validation(_) => 11,
            Error::UnknownParameter(_) => 12,
            Error::UnsupportedConditioning(_) => 13,
            Error::DegenerateScale => 14,
            Error::InvalidGrid(_) => 30,
            Error::Interpolation(_) => 31,
            Error::MalformedKey(_) => 50,
            Error::MissingColumn(_) => 51,
            Error::RaggedTable { .. } => 52,
            Error::ParameterMismatch { .. } => 53,
            Error::CacheMiss(_) => 54,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_)
            | Error::Validation(_)
            | Error::UnknownParameter(_)
            | Error::UnsupportedConditioning(_)
            | Error::DegenerateScale => ErrorCategory::Config,

            Error::InvalidGrid(_) | Error::Interpolation(_) => ErrorCategory::Numerical,

            Error::MalformedKey(_)
            | Error::MissingColumn(_)
            | Error::RaggedTable { .. }
            | Error::ParameterMismatch { .. }
            | Error::CacheMiss(_) => ErrorCategory::Cache,

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }
}
