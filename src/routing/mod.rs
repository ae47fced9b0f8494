//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Unit construction:
//!     RequestRouter::new(state, env, name, config)
//!     → route(path, handler) ... (inside the unit's configure callback)
//!     → seal()  (compile middleware stack once)
//!
//! Request:
//!     Unit::fetch(request)
//!     → RequestRouter::dispatch(request)
//!     → [request id → trace → CORS → timeout → body limit]
//!     → path match → handler(State<UnitContext>, extractors...)
//!     → Response (handler output, RouteError body, 404 fallback or 405)
//! ```
//!
//! # Design Decisions
//! - `RequestRouter` is the only seam units depend on; the axum-backed
//!   `UnitRouter` is one implementation of it
//! - Matching, middleware and error translation belong to the router; the
//!   unit forwards requests and never inspects them

pub mod config;
pub mod context;
pub mod error;
pub mod router;

use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;

use crate::unit::env::Environment;
use crate::unit::state::UnitState;

pub use config::{CorsConfig, RouterConfig};
pub use context::UnitContext;
pub use error::{RouteError, RouterError};
pub use router::UnitRouter;

/// Capability contract for the router a unit owns.
pub trait RequestRouter: Sized + Send + Sync + 'static {
    /// Environment record the router (and its handlers) receive.
    type Env: Environment;

    /// Pass-through configuration, opaque to the unit.
    type Config: Default;

    /// What gets registered against a path pattern.
    type Handler;

    type Error: std::error::Error + Send + Sync + 'static;

    /// Build a router bound to one unit's state and environment.
    fn new(
        state: UnitState,
        env: Arc<Self::Env>,
        name: &str,
        config: Self::Config,
    ) -> Result<Self, Self::Error>;

    /// Register `handler` for requests matching `path`.
    fn route(&mut self, path: &str, handler: Self::Handler) -> Result<&mut Self, Self::Error>;

    /// Finish registration. Called once, after the last `route`.
    fn seal(&mut self) -> Result<(), Self::Error>;

    /// Handle one request.
    fn dispatch(
        &self,
        request: Request<Body>,
    ) -> impl Future<Output = Result<Response, Self::Error>> + Send;
}
