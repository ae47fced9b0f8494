//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the bind address and namespace name
//! - Validate pass-through router options before any unit is built
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: HostConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::HostConfig;
use crate::routing::RouterError;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    InvalidBindAddress(String),

    #[error("namespace.name must not be empty")]
    EmptyNamespace,

    #[error("unit.name must not be empty when set")]
    EmptyUnitName,

    #[error("unit.router: {0}")]
    Router(#[from] RouterError),

    #[error("storage.persistence_path `{0}` is a directory")]
    PersistencePathIsDirectory(String),

    #[error("storage.persistence_path `{0}`: parent directory does not exist")]
    PersistenceDirMissing(String),
}

/// Check `config`, collecting every problem found.
pub fn validate_config(config: &HostConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.namespace.name.trim().is_empty() {
        errors.push(ValidationError::EmptyNamespace);
    }

    if matches!(config.unit.name.as_deref(), Some(name) if name.trim().is_empty()) {
        errors.push(ValidationError::EmptyUnitName);
    }

    if let Err(router_errors) = config.unit.router.validate() {
        errors.extend(router_errors.into_iter().map(ValidationError::Router));
    }

    if let Some(path) = &config.storage.persistence_path {
        if path.is_dir() {
            errors.push(ValidationError::PersistencePathIsDirectory(
                path.display().to_string(),
            ));
        }
        // A bare file name lives in the working directory
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.is_dir() {
                errors.push(ValidationError::PersistenceDirMissing(
                    path.display().to_string(),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&HostConfig::default()).is_ok());
    }

    #[test]
    fn test_persistence_path_parent_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing_dir").join("units.json");

        let mut config = HostConfig::default();
        config.storage.persistence_path = Some(missing.clone());
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::PersistenceDirMissing(
                missing.display().to_string()
            )]
        );

        config.storage.persistence_path = Some(dir.path().join("units.json"));
        assert!(validate_config(&config).is_ok());

        config.storage.persistence_path = Some("units.json".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let dir = tempfile::tempdir().unwrap();

        let mut config = HostConfig::default();
        config.listener.bind_address = "localhost".into();
        config.namespace.name = "  ".into();
        config.unit.name = Some(String::new());
        config.unit.router.base_path = Some("api".into());
        config.storage.persistence_path = Some(dir.path().to_path_buf());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::EmptyNamespace));
        assert!(errors.contains(&ValidationError::Router(RouterError::InvalidBasePath(
            "api".into()
        ))));
    }
}
