//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Derive the default filter from the environment's log level
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - `RUST_LOG` overrides the configured level when set

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;
use crate::unit::env::LogLevel;

/// Filter used when `RUST_LOG` is not set.
pub fn default_filter(level: LogLevel) -> String {
    format!("durable_unit={level},tower_http={level}")
}

/// Install the global subscriber. Returns false if one was already installed.
pub fn init_logging(level: LogLevel, config: &ObservabilityConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(level)));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    result.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(
            default_filter(LogLevel::Debug),
            "durable_unit=debug,tower_http=debug"
        );
    }

    #[test]
    fn test_second_init_is_not_fatal() {
        let config = ObservabilityConfig::default();
        let _ = init_logging(LogLevel::Info, &config);
        assert!(!init_logging(LogLevel::Info, &config));
    }
}
