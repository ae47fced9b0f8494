//! Configuration schema definitions.
//!
//! This module defines the configuration of the local host.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::routing::RouterConfig;
use crate::unit::env::UnitEnv;

/// Root configuration for the local host.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HostConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Namespace the served units belong to.
    pub namespace: NamespaceConfig,

    /// Options applied to every unit built by the host.
    pub unit: UnitConfig,

    /// Where unit storage lives.
    pub storage: StorageConfig,

    /// Environment record handed to every unit.
    pub env: UnitEnv,

    /// Log output settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8787").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8787".to_string(),
        }
    }
}

/// Namespace configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NamespaceConfig {
    /// Namespace name; unit ids derived from names are scoped by it.
    pub name: String,
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            name: "counter".to_string(),
        }
    }
}

/// Per-unit construction options.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct UnitConfig {
    /// Display name; the unit factory picks its own default when absent
    /// (the bundled counter uses "counter").
    pub name: Option<String>,

    /// Passed through to the unit's router.
    pub router: RouterConfig,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON snapshot file; in-memory storage when absent.
    pub persistence_path: Option<PathBuf>,
}

/// Observability configuration.
///
/// The log level itself lives on the environment record (`env.log_level`).
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Emit JSON log lines instead of the human-readable format.
    pub json: bool,
}
