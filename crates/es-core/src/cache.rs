//! Conditional probability tables and their storage.
//!
//! A [`ProbabilityTable`] holds p(param | χeff) sampled on a parameter grid
//! at one χeff value, in three columns: the parameter's own name, `xeff`,
//! and `probability`. Tables are addressed by a [`CacheKey`].
//!
//! Caches are explicit values passed to whoever needs them. A
//! [`JsonDirCache`] reads from disk only when asked: [`JsonDirCache::load`]
//! for one table, or [`JsonDirCache::load_all`] to populate a
//! [`MemoryCache`] up front.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use es_math::LinearInterpolant;

use crate::conditional::ConditionalPriorEstimator;
use crate::error::{Error, Result};
use crate::logging::{event_names, Stage};
use crate::params::SpinParameter;
use crate::prior::SpinPrior;

/// Name of the χeff column.
pub const XEFF_COLUMN: &str = "xeff";
/// Name of the density column.
pub const PROBABILITY_COLUMN: &str = "probability";
/// Resolution of the χeff part of a key's string form.
pub const XEFF_KEY_RESOLUTION: f64 = 1e-6;

/// Address of one cached table: a conditioned parameter at a χeff value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheKey {
    pub param: SpinParameter,
    pub xeff: f64,
}

impl CacheKey {
    pub fn new(param: SpinParameter, xeff: f64) -> Result<Self> {
        param.ensure_conditionable()?;
        if !xeff.is_finite() {
            return Err(Error::MalformedKey(format!("non-finite xeff {}", xeff)));
        }
        Ok(Self { param, xeff })
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{:+.6}", self.param, self.xeff)
    }
}

impl std::str::FromStr for CacheKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (param, xeff) = s
            .split_once('@')
            .ok_or_else(|| Error::MalformedKey(s.to_string()))?;
        let param: SpinParameter = param
            .parse()
            .map_err(|_| Error::MalformedKey(s.to_string()))?;
        let xeff: f64 = xeff
            .parse()
            .map_err(|_| Error::MalformedKey(s.to_string()))?;
        Self::new(param, xeff).map_err(|_| Error::MalformedKey(s.to_string()))
    }
}

/// On-disk shape: a parameter tag and named columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawTable {
    parameter: SpinParameter,
    columns: BTreeMap<String, Vec<f64>>,
}

/// p(param | χeff) rows for one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTable", into = "RawTable")]
pub struct ProbabilityTable {
    parameter: SpinParameter,
    values: Vec<f64>,
    xeff: Vec<f64>,
    probability: Vec<f64>,
}

impl ProbabilityTable {
    pub fn new(
        parameter: SpinParameter,
        values: Vec<f64>,
        xeff: Vec<f64>,
        probability: Vec<f64>,
    ) -> Result<Self> {
        let expected = values.len();
        for (column, len) in [
            (XEFF_COLUMN, xeff.len()),
            (PROBABILITY_COLUMN, probability.len()),
        ] {
            if len != expected {
                return Err(Error::RaggedTable {
                    column: column.to_string(),
                    len,
                    expected,
                });
            }
        }
        Ok(Self {
            parameter,
            values,
            xeff,
            probability,
        })
    }

    /// Rows for a single χeff value.
    pub fn at_xeff(parameter: SpinParameter, values: Vec<f64>, xeff: f64, probability: Vec<f64>) -> Result<Self> {
        let n = values.len();
        Self::new(parameter, values, vec![xeff; n], probability)
    }

    pub fn parameter(&self) -> SpinParameter {
        self.parameter
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parameter column.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn xeff(&self) -> &[f64] {
        &self.xeff
    }

    pub fn probability(&self) -> &[f64] {
        &self.probability
    }

    /// Rows with `|xeff - target| <= tolerance`, sorted by parameter value.
    pub fn rows_at(&self, target: f64, tolerance: f64) -> (Vec<f64>, Vec<f64>) {
        let mut rows: Vec<(f64, f64)> = (0..self.len())
            .filter(|&i| (self.xeff[i] - target).abs() <= tolerance)
            .map(|i| (self.values[i], self.probability[i]))
            .collect();
        rows.sort_by(|a, b| a.0.total_cmp(&b.0));
        rows.into_iter().unzip()
    }

    /// Bounded interpolant of p(param | χeff = target) over the parameter.
    pub fn interpolant_at(&self, target: f64, tolerance: f64) -> Result<LinearInterpolant> {
        let (values, probability) = self.rows_at(target, tolerance);
        Ok(LinearInterpolant::bounded(values, probability)?)
    }

    fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl TryFrom<RawTable> for ProbabilityTable {
    type Error = Error;

    fn try_from(mut raw: RawTable) -> Result<Self> {
        let mut take = |name: &str| {
            raw.columns
                .remove(name)
                .ok_or_else(|| Error::MissingColumn(name.to_string()))
        };
        let values = take(raw.parameter.key())?;
        let xeff = take(XEFF_COLUMN)?;
        let probability = take(PROBABILITY_COLUMN)?;
        Self::new(raw.parameter, values, xeff, probability)
    }
}

impl From<ProbabilityTable> for RawTable {
    fn from(table: ProbabilityTable) -> Self {
        let mut columns = BTreeMap::new();
        columns.insert(table.parameter.key().to_string(), table.values);
        columns.insert(XEFF_COLUMN.to_string(), table.xeff);
        columns.insert(PROBABILITY_COLUMN.to_string(), table.probability);
        RawTable {
            parameter: table.parameter,
            columns,
        }
    }
}

/// Storage for conditional probability tables.
pub trait ProbabilityCache {
    fn store(&mut self, key: &CacheKey, table: &ProbabilityTable) -> Result<()>;

    fn load(&self, key: &CacheKey) -> Result<ProbabilityTable>;
}

fn check_parameter(key: &CacheKey, table: &ProbabilityTable) -> Result<()> {
    if key.param != table.parameter {
        return Err(Error::ParameterMismatch {
            expected: key.param.to_string(),
            actual: table.parameter.to_string(),
        });
    }
    Ok(())
}

/// In-process cache keyed by the canonical key string.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    tables: BTreeMap<String, ProbabilityTable>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.tables.contains_key(&key.to_string())
    }

    /// Stored keys in canonical order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}

impl ProbabilityCache for MemoryCache {
    fn store(&mut self, key: &CacheKey, table: &ProbabilityTable) -> Result<()> {
        check_parameter(key, table)?;
        self.tables.insert(key.to_string(), table.clone());
        Ok(())
    }

    fn load(&self, key: &CacheKey) -> Result<ProbabilityTable> {
        self.tables
            .get(&key.to_string())
            .cloned()
            .ok_or_else(|| Error::CacheMiss(key.to_string()))
    }
}

/// One JSON file per key under a directory.
#[derive(Debug, Clone)]
pub struct JsonDirCache {
    root: PathBuf,
}

impl JsonDirCache {
    /// Open (creating if needed) a cache directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    /// Read every table in the directory into memory.
    ///
    /// Files without a `.json` extension are ignored; a `.json` file whose
    /// stem is not a valid key is an error.
    pub fn load_all(&self) -> Result<MemoryCache> {
        let mut cache = MemoryCache::new();
        let mut paths: Vec<PathBuf> = fs::read_dir(&self.root)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        for path in paths {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| Error::MalformedKey(path.display().to_string()))?;
            let key: CacheKey = stem.parse()?;
            let table = ProbabilityTable::from_json(&fs::read_to_string(&path)?)?;
            cache.store(&key, &table)?;
        }

        info!(
            event = event_names::CACHE_LOADED,
            stage = %Stage::Cache,
            root = %self.root.display(),
            tables = cache.len(),
            "loaded cached probability tables"
        );
        Ok(cache)
    }
}

impl ProbabilityCache for JsonDirCache {
    fn store(&mut self, key: &CacheKey, table: &ProbabilityTable) -> Result<()> {
        check_parameter(key, table)?;
        let path = self.path_for(key);
        fs::write(&path, serde_json::to_string_pretty(table)?)?;
        debug!(
            event = event_names::CACHE_STORED,
            stage = %Stage::Cache,
            key = %key,
            rows = table.len(),
            "stored probability table"
        );
        Ok(())
    }

    fn load(&self, key: &CacheKey) -> Result<ProbabilityTable> {
        let path = self.path_for(key);
        if !path.exists() {
            return Err(Error::CacheMiss(key.to_string()));
        }
        let table = ProbabilityTable::from_json(&fs::read_to_string(&path)?)?;
        check_parameter(key, &table)?;
        Ok(table)
    }
}

/// Tabulate p(param | χeff = xeff) on `values`.
pub fn tabulate_conditional<P, R>(
    estimator: &ConditionalPriorEstimator<'_, P>,
    param: SpinParameter,
    values: &[f64],
    xeff: f64,
    rng: &mut R,
) -> Result<ProbabilityTable>
where
    P: SpinPrior,
    R: Rng + ?Sized,
{
    let probability = estimator.conditional_density_on_grid(param, values, xeff, rng)?;
    ProbabilityTable::at_xeff(param, values.to_vec(), xeff, probability)
}
