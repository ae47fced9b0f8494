//! Pass-through router configuration.
//!
//! Everything here is optional; `RouterConfig::default()` yields a router
//! with no prefix, no CORS, no timeout and axum's default body limit.

use axum::http::{HeaderName, HeaderValue, Method};
use serde::{Deserialize, Serialize};

use crate::routing::error::RouterError;

/// Router options supplied by the unit author or host configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Prefix every route is nested under (e.g. "/api").
    pub base_path: Option<String>,

    /// Cross-origin policy.
    pub cors: Option<CorsConfig>,

    /// Whole-request timeout in seconds.
    pub request_timeout_secs: Option<u64>,

    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: Option<usize>,
}

/// Cross-origin resource sharing policy.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins; `["*"]` allows any. Must not be empty.
    pub allow_origins: Vec<String>,

    /// Allowed methods; empty allows any.
    pub allow_methods: Vec<String>,

    /// Allowed request headers; empty allows any.
    pub allow_headers: Vec<String>,

    /// Preflight cache lifetime in seconds.
    pub max_age_secs: Option<u64>,
}

impl RouterConfig {
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    pub fn with_cors(mut self, cors: CorsConfig) -> Self {
        self.cors = Some(cors);
        self
    }

    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    pub fn with_max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = Some(bytes);
        self
    }

    /// Normalized prefix, `None` when routes live at the root.
    pub fn prefix(&self) -> Result<Option<&str>, RouterError> {
        match self.base_path.as_deref() {
            None | Some("") | Some("/") => Ok(None),
            Some(path) if !path.starts_with('/') || path.ends_with('/') => {
                Err(RouterError::InvalidBasePath(path.to_string()))
            }
            Some(path) => Ok(Some(path)),
        }
    }

    /// Check every option, returning all problems found.
    pub fn validate(&self) -> Result<(), Vec<RouterError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.prefix() {
            errors.push(e);
        }
        if self.request_timeout_secs == Some(0) {
            errors.push(RouterError::InvalidTimeout);
        }
        if let Some(cors) = &self.cors {
            if let Err(e) = cors.origins() {
                errors.push(e);
            }
            if let Err(e) = cors.methods() {
                errors.push(e);
            }
            if let Err(e) = cors.headers() {
                errors.push(e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl CorsConfig {
    /// An open policy allowing any origin, method and header.
    pub fn permissive() -> Self {
        Self {
            allow_origins: vec!["*".to_string()],
            ..Self::default()
        }
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allow_origins.iter().any(|o| o == "*")
    }

    /// Parsed origins; empty when any origin is allowed.
    pub fn origins(&self) -> Result<Vec<HeaderValue>, RouterError> {
        if self.allow_origins.is_empty() {
            return Err(RouterError::EmptyCorsOrigins);
        }
        if self.allows_any_origin() {
            return Ok(Vec::new());
        }
        self.allow_origins
            .iter()
            .map(|origin| {
                if !origin.starts_with("http://") && !origin.starts_with("https://") {
                    return Err(RouterError::InvalidCorsOrigin(origin.clone()));
                }
                HeaderValue::from_str(origin)
                    .map_err(|_| RouterError::InvalidCorsOrigin(origin.clone()))
            })
            .collect()
    }

    pub fn methods(&self) -> Result<Vec<Method>, RouterError> {
        self.allow_methods
            .iter()
            .map(|m| {
                Method::from_bytes(m.to_ascii_uppercase().as_bytes())
                    .map_err(|_| RouterError::InvalidCorsMethod(m.clone()))
            })
            .collect()
    }

    pub fn headers(&self) -> Result<Vec<HeaderName>, RouterError> {
        self.allow_headers
            .iter()
            .map(|h| {
                HeaderName::from_bytes(h.as_bytes())
                    .map_err(|_| RouterError::InvalidCorsHeader(h.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_normalization() {
        assert_eq!(RouterConfig::default().prefix().unwrap(), None);
        assert_eq!(RouterConfig::default().with_base_path("/").prefix().unwrap(), None);
        assert_eq!(
            RouterConfig::default().with_base_path("/api").prefix().unwrap(),
            Some("/api")
        );
        assert!(RouterConfig::default().with_base_path("api").prefix().is_err());
        assert!(RouterConfig::default().with_base_path("/api/").prefix().is_err());
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let config = RouterConfig::default()
            .with_base_path("nope")
            .with_request_timeout(0)
            .with_cors(CorsConfig {
                allow_origins: vec!["example.com".into()],
                allow_methods: vec!["NOT A METHOD".into()],
                ..CorsConfig::default()
            });

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_cors_wildcard() {
        let cors = CorsConfig::permissive();
        assert!(cors.allows_any_origin());
        assert!(cors.origins().unwrap().is_empty());
        assert!(RouterConfig::default().with_cors(cors).validate().is_ok());
    }

    #[test]
    fn test_cors_without_origins_rejected() {
        let cors = CorsConfig {
            allow_methods: vec!["GET".into()],
            ..CorsConfig::default()
        };
        assert_eq!(cors.origins().unwrap_err(), RouterError::EmptyCorsOrigins);

        let errors = RouterConfig::default().with_cors(cors).validate().unwrap_err();
        assert_eq!(errors, vec![RouterError::EmptyCorsOrigins]);
    }

    #[test]
    fn test_from_toml() {
        let config: RouterConfig = toml::from_str(
            r#"
            base_path = "/v1"
            request_timeout_secs = 10

            [cors]
            allow_origins = ["https://app.example.com"]
            allow_methods = ["get", "post"]
            "#,
        )
        .unwrap();

        assert_eq!(config.prefix().unwrap(), Some("/v1"));
        let cors = config.cors.as_ref().unwrap();
        assert_eq!(cors.methods().unwrap(), vec![Method::GET, Method::POST]);
        assert!(config.validate().is_ok());
    }
}
