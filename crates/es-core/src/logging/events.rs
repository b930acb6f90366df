//! Structured event vocabulary.
//!
//! Every event carries an `event` name from [`event_names`] and a [`Stage`],
//! so JSONL output can be filtered without parsing messages.

use serde::{Deserialize, Serialize};

/// Computation stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Configuration loading.
    Init,
    /// Prior sampling and Monte-Carlo estimation.
    Sample,
    /// Evidence p(xeff).
    Evidence,
    /// xp|xeff stage chaining.
    Pipeline,
    /// Probability table storage.
    Cache,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Sample => "sample",
            Stage::Evidence => "evidence",
            Stage::Pipeline => "pipeline",
            Stage::Cache => "cache",
        };
        write!(f, "{}", s)
    }
}

/// Standard event names used in logging.
pub mod event_names {
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_DEFAULT_USED: &str = "config.default_used";

    pub const SAMPLE_BATCH: &str = "sample.batch";

    pub const EVIDENCE_COMPUTED: &str = "evidence.computed";
    pub const EVIDENCE_ZERO: &str = "evidence.zero";

    pub const PIPELINE_STAGE: &str = "pipeline.stage";
    pub const PIPELINE_MASS_LOST: &str = "pipeline.mass_lost";
    pub const PIPELINE_FINISHED: &str = "pipeline.finished";

    pub const CACHE_STORED: &str = "cache.stored";
    pub const CACHE_LOADED: &str = "cache.loaded";
}
