//! Axum-backed unit router.
//!
//! # Responsibilities
//! - Register handlers for path patterns, scoped to one unit's context
//! - Apply pass-through configuration (prefix, CORS, timeout, body limit)
//! - Dispatch a request and return axum's response unchanged
//!
//! # Design Decisions
//! - Registration never panics: paths are checked before reaching axum,
//!   including captures the matcher cannot share a position with
//! - The compiled service is cached by `seal()`; dispatch clones it (cheap, Arc-backed)
//! - Unmatched paths get a JSON 404; matched paths with a foreign method get axum's 405

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::routing::MethodRouter;
use tower::ServiceExt;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::routing::config::{CorsConfig, RouterConfig};
use crate::routing::context::UnitContext;
use crate::routing::error::{error_response, RouterError};
use crate::routing::RequestRouter;
use crate::unit::env::Environment;
use crate::unit::state::UnitState;

/// Router owned by a single unit.
pub struct UnitRouter<E> {
    name: String,
    context: UnitContext<E>,
    config: RouterConfig,
    prefix: Option<String>,
    cors: Option<CorsLayer>,
    routes: axum::Router<UnitContext<E>>,
    // Normalized patterns, used to reject conflicting registrations
    patterns: BTreeSet<String>,
    paths: Vec<String>,
    service: Option<axum::Router>,
}

impl<E: Environment> UnitRouter<E> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn context(&self) -> &UnitContext<E> {
        &self.context
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Registered paths in registration order, without the prefix.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn is_sealed(&self) -> bool {
        self.service.is_some()
    }

    #[allow(deprecated)]
    fn compile(&self) -> axum::Router {
        let routes: axum::Router = self.routes.clone().with_state(self.context.clone());

        let mut app = match &self.prefix {
            Some(prefix) => axum::Router::new().nest(prefix, routes),
            None => routes,
        }
        .fallback(not_found);

        if let Some(bytes) = self.config.max_body_bytes {
            app = app.layer(DefaultBodyLimit::max(bytes));
        }
        if let Some(secs) = self.config.request_timeout_secs {
            app = app.layer(TimeoutLayer::new(Duration::from_secs(secs)));
        }
        if let Some(cors) = &self.cors {
            app = app.layer(cors.clone());
        }

        app.layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }
}

impl<E: Environment> RequestRouter for UnitRouter<E> {
    type Env = E;
    type Config = RouterConfig;
    type Handler = MethodRouter<UnitContext<E>>;
    type Error = RouterError;

    fn new(
        state: UnitState,
        env: Arc<E>,
        name: &str,
        config: RouterConfig,
    ) -> Result<Self, RouterError> {
        let prefix = config.prefix()?.map(str::to_string);
        if config.request_timeout_secs == Some(0) {
            return Err(RouterError::InvalidTimeout);
        }
        let cors = config.cors.as_ref().map(build_cors).transpose()?;

        Ok(Self {
            name: name.to_string(),
            context: UnitContext::new(state, env, name),
            config,
            prefix,
            cors,
            routes: axum::Router::new(),
            patterns: BTreeSet::new(),
            paths: Vec::new(),
            service: None,
        })
    }

    fn route(
        &mut self,
        path: &str,
        handler: MethodRouter<UnitContext<E>>,
    ) -> Result<&mut Self, RouterError> {
        let pattern = normalize_path(path)?;
        if self.patterns.contains(&pattern) {
            return Err(RouterError::DuplicateRoute(path.to_string()));
        }
        if let Some(existing) = self.paths.iter().find(|existing| conflicts(existing, path)) {
            return Err(RouterError::ConflictingRoute(
                path.to_string(),
                existing.clone(),
            ));
        }
        self.patterns.insert(pattern);

        let routes = std::mem::take(&mut self.routes);
        self.routes = routes.route(path, handler);
        self.paths.push(path.to_string());
        self.service = None;

        tracing::debug!(unit.name = %self.name, path, "Route registered");
        Ok(self)
    }

    fn seal(&mut self) -> Result<(), RouterError> {
        self.service = Some(self.compile());
        tracing::debug!(
            unit.name = %self.name,
            routes = self.paths.len(),
            prefix = self.prefix.as_deref().unwrap_or("/"),
            "Router sealed"
        );
        Ok(())
    }

    fn dispatch(
        &self,
        request: Request<Body>,
    ) -> impl Future<Output = Result<Response, RouterError>> + Send {
        let service = self.service.clone().unwrap_or_else(|| self.compile());
        async move {
            match service.oneshot(request).await {
                Ok(response) => Ok(response),
                Err(never) => match never {},
            }
        }
    }
}

async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not Found")
}

fn build_cors(cors: &CorsConfig) -> Result<CorsLayer, RouterError> {
    let origins = cors.origins()?;
    let methods = cors.methods()?;
    let headers = cors.headers()?;

    let mut layer = CorsLayer::new();
    layer = if cors.allows_any_origin() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    };
    layer = if methods.is_empty() {
        layer.allow_methods(Any)
    } else {
        layer.allow_methods(methods)
    };
    layer = if headers.is_empty() {
        layer.allow_headers(Any)
    } else {
        layer.allow_headers(headers)
    };
    if let Some(secs) = cors.max_age_secs {
        layer = layer.max_age(Duration::from_secs(secs));
    }
    Ok(layer)
}

/// Check a route path and reduce it to a pattern where parameter names
/// no longer matter (`/users/{id}` and `/users/{name}` collide).
fn normalize_path(path: &str) -> Result<String, RouterError> {
    let invalid = |reason| RouterError::InvalidPath(path.to_string(), reason);

    if path.is_empty() {
        return Err(invalid("path must not be empty"));
    }
    if !path.starts_with('/') {
        return Err(invalid("path must start with '/'"));
    }

    let segments: Vec<&str> = path[1..].split('/').collect();
    let last = segments.len() - 1;
    let mut pattern = String::with_capacity(path.len());

    for (i, segment) in segments.iter().enumerate() {
        pattern.push('/');
        if segment.starts_with(':') || segment.starts_with('*') {
            return Err(invalid("use `{param}` or `{*rest}` captures"));
        }
        if let Some(inner) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            if inner.is_empty() || inner.contains(['{', '}']) {
                return Err(invalid("empty or nested capture"));
            }
            if inner.starts_with('*') {
                if i != last {
                    return Err(invalid("wildcard capture must be the last segment"));
                }
                pattern.push_str("{*}");
            } else {
                pattern.push_str("{}");
            }
        } else if segment.contains(['{', '}']) {
            return Err(invalid("captures must span a whole segment"));
        } else {
            pattern.push_str(segment);
        }
    }

    Ok(pattern)
}

enum Segment<'a> {
    Static(&'a str),
    Param(&'a str),
    Wildcard,
}

impl<'a> Segment<'a> {
    fn parse(segment: &'a str) -> Self {
        match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(inner) if inner.starts_with('*') => Segment::Wildcard,
            Some(inner) => Segment::Param(inner),
            None => Segment::Static(segment),
        }
    }
}

/// Whether two already-normalized paths would collide inside axum's matcher.
///
/// Walking the shared prefix, a capture position may hold one parameter name
/// only, and a parameter may not share its position with a wildcard. Static
/// segments take priority over captures, so they never collide.
fn conflicts(a: &str, b: &str) -> bool {
    let a = a[1..].split('/').map(Segment::parse);
    let b = b[1..].split('/').map(Segment::parse);

    for (x, y) in a.zip(b) {
        match (x, y) {
            (Segment::Static(x), Segment::Static(y)) if x == y => continue,
            (Segment::Param(x), Segment::Param(y)) if x == y => continue,
            (Segment::Param(_), Segment::Param(_)) => return true,
            (Segment::Param(_), Segment::Wildcard) | (Segment::Wildcard, Segment::Param(_)) => {
                return true
            }
            _ => return false,
        }
    }
    false
}
