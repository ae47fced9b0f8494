//! HTTP front door for a namespace.
//!
//! # Responsibilities
//! - Accept HTTP connections and map `/{unit}/...` to the unit named `unit`
//! - Strip the unit segment before delivery (query string preserved)
//! - Turn unit construction or dispatch failures into a 500 JSON body
//!
//! # Design Decisions
//! - The unit name is resolved with `id_from_name`, so the same name always
//!   reaches the same unit
//! - Graceful shutdown through the lifecycle broadcast channel

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode, Uri},
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::host::{HostError, Namespace};
use crate::routing::error::error_response;
use crate::routing::RequestRouter;

/// Serves one namespace over HTTP.
pub struct HostServer<R: RequestRouter> {
    namespace: Arc<Namespace<R>>,
}

impl<R: RequestRouter> HostServer<R> {
    pub fn new(namespace: Arc<Namespace<R>>) -> Self {
        Self { namespace }
    }

    pub fn namespace(&self) -> &Arc<Namespace<R>> {
        &self.namespace
    }

    /// Build the Axum router forwarding to units.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/{unit}", any(forward::<R>))
            .route("/{unit}/{*path}", any(forward::<R>))
            .with_state(Arc::clone(&self.namespace))
            .layer(TraceLayer::new_for_http())
    }

    /// Serve until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), HostError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            namespace = %self.namespace.name(),
            "Host server starting"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!(
            active_units = self.namespace.active_count(),
            "Host server stopped"
        );
        Ok(())
    }
}

async fn forward<R: RequestRouter>(
    State(namespace): State<Arc<Namespace<R>>>,
    Path(params): Path<HashMap<String, String>>,
    request: Request<Body>,
) -> Response {
    let Some(unit_name) = params.get("unit") else {
        return error_response(StatusCode::NOT_FOUND, "Not Found");
    };

    let request = match strip_unit_segment(request) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(unit.name = %unit_name, error = %e, "Could not rewrite request URI");
            return error_response(StatusCode::BAD_REQUEST, "Invalid request URI");
        }
    };

    let id = namespace.id_from_name(unit_name);
    tracing::debug!(
        unit.name = %unit_name,
        unit.id = %id,
        method = %request.method(),
        path = %request.uri().path(),
        "Delivering request"
    );

    let stub = match namespace.get(&id) {
        Ok(stub) => stub,
        Err(e) => {
            tracing::error!(unit.name = %unit_name, unit.id = %id, error = %e, "Unit unavailable");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
        }
    };

    match stub.fetch(request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(unit.name = %unit_name, unit.id = %id, error = %e, "Unit dispatch failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

/// Rewrite `/{unit}/rest?query` to `/rest?query`, using the raw (still
/// percent-encoded) path.
fn strip_unit_segment(request: Request<Body>) -> Result<Request<Body>, axum::http::uri::InvalidUri> {
    let (mut parts, body) = request.into_parts();

    let rest = parts
        .uri
        .path()
        .strip_prefix('/')
        .and_then(|p| p.split_once('/'))
        .map(|(_, rest)| rest)
        .unwrap_or("");
    let path_and_query = match parts.uri.query() {
        Some(query) => format!("/{rest}?{query}"),
        None => format!("/{rest}"),
    };

    parts.uri = path_and_query.parse::<Uri>()?;
    Ok(Request::from_parts(parts, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewritten(uri: &str) -> String {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        strip_unit_segment(request).unwrap().uri().to_string()
    }

    #[test]
    fn test_strip_unit_segment() {
        assert_eq!(rewritten("/alice/count"), "/count");
        assert_eq!(rewritten("/alice"), "/");
        assert_eq!(rewritten("/alice/"), "/");
        assert_eq!(rewritten("/alice/a/b?x=1&y=2"), "/a/b?x=1&y=2");
        assert_eq!(rewritten("http://localhost:8787/alice/a%20b"), "/a%20b");
    }
}
