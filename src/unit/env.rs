//! Environment record handed to every unit.
//!
//! Consumers may bring their own environment type; the only requirement is a
//! log level. `UnitEnv` is the default record loaded from configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing_subscriber::filter::LevelFilter;

/// Contract every environment record satisfies.
pub trait Environment: Send + Sync + 'static {
    fn log_level(&self) -> LogLevel;
}

/// Logging verbosity requested by the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    pub fn as_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unrecognized log level strings.
#[derive(Debug, thiserror::Error)]
#[error("unknown log level `{0}` (expected trace, debug, info, warn or error)")]
pub struct ParseLogLevelError(String);

impl FromStr for LogLevel {
    type Err = ParseLogLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ParseLogLevelError(s.to_string())),
        }
    }
}

/// Default environment record: a log level plus free-form variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitEnv {
    #[serde(default)]
    pub log_level: LogLevel,

    /// Any other keys in the `[env]` table.
    #[serde(flatten)]
    pub vars: BTreeMap<String, Value>,
}

impl UnitEnv {
    pub fn new(log_level: LogLevel) -> Self {
        Self {
            log_level,
            vars: BTreeMap::new(),
        }
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn var(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }
}

impl Environment for UnitEnv {
    fn log_level(&self) -> LogLevel {
        self.log_level
    }
}
