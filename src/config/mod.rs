//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → HostConfig (validated, immutable)
//!     → env shared via Arc with every unit
//!     → unit.router passed through to each unit's router
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::HostConfig;
pub use schema::ListenerConfig;
pub use schema::NamespaceConfig;
pub use schema::ObservabilityConfig;
pub use schema::StorageConfig;
pub use schema::UnitConfig;
pub use validation::{validate_config, ValidationError};
