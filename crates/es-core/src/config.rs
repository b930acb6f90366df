//! Configuration loading for the core.
//!
//! Resolves priors.json and numerics.json, parses whichever were found,
//! falls back to built-in defaults for the rest, and validates both.

use std::path::Path;

use tracing::info;

pub use es_config::resolve::SearchRoots;
pub use es_config::{ConfigPaths, ConfigSource, EvidenceMethod, Numerics, SpinPriors};

use es_config::resolve::resolve_config_in;
use es_config::validate::{validate_numerics, validate_priors};

use crate::error::Result;
use crate::logging::{event_names, Stage};
use crate::prior::PriorDict;

/// Validated configuration with provenance.
#[derive(Debug, Clone)]
pub struct Settings {
    pub priors: SpinPriors,
    pub numerics: Numerics,
    pub paths: ConfigPaths,
}

impl Settings {
    /// Built-in isotropic priors and default numerics.
    pub fn builtin() -> Self {
        Self {
            priors: SpinPriors::default(),
            numerics: Numerics::default(),
            paths: ConfigPaths::default(),
        }
    }

    /// Prior collaborator for the configured priors.
    pub fn prior(&self) -> Result<PriorDict> {
        PriorDict::from_priors(&self.priors)
    }
}

/// Load configuration using the process environment for discovery.
pub fn load_config(
    explicit_priors: Option<&Path>,
    explicit_numerics: Option<&Path>,
) -> Result<Settings> {
    load_config_in(&SearchRoots::from_env(), explicit_priors, explicit_numerics)
}

/// Load configuration against explicit search roots.
pub fn load_config_in(
    roots: &SearchRoots,
    explicit_priors: Option<&Path>,
    explicit_numerics: Option<&Path>,
) -> Result<Settings> {
    let paths = resolve_config_in(roots, explicit_priors, explicit_numerics);

    let priors = match &paths.priors {
        Some(path) => SpinPriors::from_file(path)?,
        None => SpinPriors::default(),
    };
    let numerics = match &paths.numerics {
        Some(path) => Numerics::from_file(path)?,
        None => Numerics::default(),
    };

    validate_priors(&priors)?;
    validate_numerics(&numerics)?;

    for (file, path, source) in [
        ("priors", paths.priors.as_deref(), paths.priors_source),
        ("numerics", paths.numerics.as_deref(), paths.numerics_source),
    ] {
        let event = match source {
            ConfigSource::BuiltinDefault => event_names::CONFIG_DEFAULT_USED,
            _ => event_names::CONFIG_LOADED,
        };
        info!(
            event = event,
            stage = %Stage::Init,
            file,
            path = ?path,
            source = %source,
            "configuration resolved"
        );
    }

    Ok(Settings {
        priors,
        numerics,
        paths,
    })
}
