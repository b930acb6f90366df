//! Configuration resolution and path discovery.
//!
//! Resolution order: explicit path → environment variables → XDG paths → defaults.

use std::path::{Path, PathBuf};

/// Discovered configuration file paths.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Path to priors.json (or None if not found).
    pub priors: Option<PathBuf>,

    /// Path to numerics.json (or None if not found).
    pub numerics: Option<PathBuf>,

    pub priors_source: ConfigSource,
    pub numerics_source: ConfigSource,
}

/// Where a configuration file was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Passed explicitly by the caller.
    Explicit,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Found in /etc/effective-spins/.
    SystemConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Explicit => write!(f, "explicit path"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::SystemConfig => write!(f, "system config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Environment variable names.
pub const ENV_PRIORS_PATH: &str = "EFFECTIVE_SPINS_PRIORS";
pub const ENV_NUMERICS_PATH: &str = "EFFECTIVE_SPINS_NUMERICS";
pub const ENV_CONFIG_DIR: &str = "EFFECTIVE_SPINS_CONFIG_DIR";

/// Standard config file names.
pub const PRIORS_FILENAME: &str = "priors.json";
pub const NUMERICS_FILENAME: &str = "numerics.json";

/// Application name for XDG directories.
const APP_NAME: &str = "effective-spins";

/// Directories and variables consulted during resolution.
///
/// Separated from the process environment so resolution can be exercised
/// against temporary directories.
#[derive(Debug, Clone, Default)]
pub struct SearchRoots {
    pub priors_env: Option<PathBuf>,
    pub numerics_env: Option<PathBuf>,
    pub config_dir_env: Option<PathBuf>,
    pub xdg_dir: Option<PathBuf>,
    pub system_dir: Option<PathBuf>,
}

impl SearchRoots {
    /// Roots taken from the current process environment.
    pub fn from_env() -> Self {
        Self {
            priors_env: std::env::var_os(ENV_PRIORS_PATH).map(PathBuf::from),
            numerics_env: std::env::var_os(ENV_NUMERICS_PATH).map(PathBuf::from),
            config_dir_env: std::env::var_os(ENV_CONFIG_DIR).map(PathBuf::from),
            xdg_dir: xdg_config_dir(),
            system_dir: Some(system_config_dir()),
        }
    }
}

/// Resolve configuration paths using the standard resolution order.
///
/// Resolution order for each config file:
/// 1. Explicit path (if provided and present)
/// 2. Environment variable (EFFECTIVE_SPINS_PRIORS, EFFECTIVE_SPINS_NUMERICS)
/// 3. EFFECTIVE_SPINS_CONFIG_DIR environment variable + filename
/// 4. XDG config directory (~/.config/effective-spins/)
/// 5. System config (/etc/effective-spins/)
/// 6. Built-in defaults (None)
pub fn resolve_config(explicit_priors: Option<&Path>, explicit_numerics: Option<&Path>) -> ConfigPaths {
    resolve_config_in(&SearchRoots::from_env(), explicit_priors, explicit_numerics)
}

/// [`resolve_config`] against explicit search roots.
pub fn resolve_config_in(
    roots: &SearchRoots,
    explicit_priors: Option<&Path>,
    explicit_numerics: Option<&Path>,
) -> ConfigPaths {
    let (priors, priors_source) = resolve_single_config(
        roots,
        explicit_priors,
        roots.priors_env.as_deref(),
        PRIORS_FILENAME,
    );
    let (numerics, numerics_source) = resolve_single_config(
        roots,
        explicit_numerics,
        roots.numerics_env.as_deref(),
        NUMERICS_FILENAME,
    );

    ConfigPaths {
        priors,
        numerics,
        priors_source,
        numerics_source,
    }
}

fn resolve_single_config(
    roots: &SearchRoots,
    explicit: Option<&Path>,
    env_path: Option<&Path>,
    filename: &str,
) -> (Option<PathBuf>, ConfigSource) {
    if let Some(path) = explicit.filter(|p| p.exists()) {
        return (Some(path.to_path_buf()), ConfigSource::Explicit);
    }

    if let Some(path) = env_path.filter(|p| p.exists()) {
        return (Some(path.to_path_buf()), ConfigSource::Environment);
    }

    let candidates = [
        (roots.config_dir_env.as_deref(), ConfigSource::Environment),
        (roots.xdg_dir.as_deref(), ConfigSource::XdgConfig),
        (roots.system_dir.as_deref(), ConfigSource::SystemConfig),
    ];
    for (dir, source) in candidates {
        if let Some(dir) = dir {
            let path = dir.join(filename);
            if path.exists() {
                return (Some(path), source);
            }
        }
    }

    (None, ConfigSource::BuiltinDefault)
}

/// Get the XDG config directory for effective-spins.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Get the system config directory.
pub fn system_config_dir() -> PathBuf {
    PathBuf::from("/etc").join(APP_NAME)
}
