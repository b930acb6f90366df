//! Logging configuration resolved from ES_LOG, RUST_LOG and ES_LOG_FORMAT,
//! with explicit overrides from the embedding program.

use std::fmt;
use std::str::FromStr;

/// Where stage diagnostics end up: a console for interactive runs or JSON
/// lines for batch jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Human,
    Jsonl,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "human" | "console" => Ok(LogFormat::Human),
            "jsonl" | "json" => Ok(LogFormat::Jsonl),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

/// Verbosity for the es_* targets. `Debug` adds one event per pipeline
/// stage and per tabulated conditional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    /// Directive name understood by `EnvFilter`.
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }

    /// Most verbose level mentioned in a RUST_LOG directive list such as
    /// `es_core=debug,warn`.
    fn scan_directives(directives: &str) -> Option<Self> {
        [LogLevel::Trace, LogLevel::Debug, LogLevel::Info, LogLevel::Warn, LogLevel::Error]
            .into_iter()
            .find(|level| directives.contains(level.as_directive()))
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" | "quiet" => Ok(LogLevel::Off),
            other => Err(format!("unknown log level: {}", other)),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_directive())
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
}

impl LogConfig {
    /// Read the environment, then apply the overrides.
    pub fn from_env(level: Option<LogLevel>, format: Option<LogFormat>) -> Self {
        let var = |name: &str| std::env::var(name).ok();
        Self::from_vars(
            var("ES_LOG").as_deref(),
            var("RUST_LOG").as_deref(),
            var("ES_LOG_FORMAT").as_deref(),
        )
        .with_overrides(level, format)
    }

    /// ES_LOG wins over RUST_LOG; unparseable values are ignored.
    fn from_vars(es_log: Option<&str>, rust_log: Option<&str>, format: Option<&str>) -> Self {
        let level = match es_log {
            Some(value) => value.parse().ok(),
            None => rust_log.and_then(LogLevel::scan_directives),
        };
        LogConfig {
            format: format.and_then(|f| f.parse().ok()).unwrap_or_default(),
            level: level.unwrap_or_default(),
        }
    }

    pub fn with_overrides(mut self, level: Option<LogLevel>, format: Option<LogFormat>) -> Self {
        if let Some(level) = level {
            self.level = level;
        }
        if let Some(format) = format {
            self.format = format;
        }
        self
    }
}
