//! Effective-spins configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for priors.json and numerics.json
//! - Config resolution (explicit path → env → config dir → XDG → /etc → defaults)
//! - Semantic validation of parameter domains and resolution settings

pub mod numerics;
pub mod priors;
pub mod resolve;
pub mod validate;

pub use numerics::{EvidenceMethod, Numerics};
pub use priors::{ParameterPrior, SpinPriors};
pub use resolve::{resolve_config, ConfigPaths, ConfigSource};
pub use validate::{ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
