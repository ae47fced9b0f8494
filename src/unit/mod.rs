//! Delegating unit.
//!
//! A unit is built by the host from a state handle and an environment. It
//! owns exactly one router, lets the author register routes while it is
//! being built, and forwards every request to that router.
//!
//! ```text
//! host ──(state, env)──▶ Unit::new
//!                          ├─ resolve name ("unnamed" when absent)
//!                          ├─ R::new(state, env, name, router config)
//!                          ├─ configure(&mut router)   // register routes
//!                          └─ router.seal()
//!
//! host ──request──▶ Unit::fetch ──▶ router.dispatch ──▶ response / error
//! ```

pub mod env;
pub mod state;

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;

use crate::routing::RequestRouter;
use crate::storage::Storage;
use crate::unit::state::{UnitId, UnitState};

/// Name used when the unit author does not supply one.
pub const DEFAULT_NAME: &str = "unnamed";

/// Optional construction parameters.
#[derive(Debug, Clone, Default)]
pub struct UnitOptions<C> {
    /// Display name; `DEFAULT_NAME` when `None`.
    pub name: Option<String>,

    /// Forwarded verbatim to the router.
    pub router: C,
}

impl<C> UnitOptions<C> {
    pub fn named(name: impl Into<String>) -> Self
    where
        C: Default,
    {
        Self {
            name: Some(name.into()),
            router: C::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_router_config(mut self, router: C) -> Self {
        self.router = router;
        self
    }

    /// The name the router will be built with.
    pub fn resolved_name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_NAME)
    }
}

/// A durable unit: state, environment and the router it delegates to.
pub struct Unit<R: RequestRouter> {
    state: UnitState,
    env: Arc<R::Env>,
    name: String,
    router: R,
}

impl<R: RequestRouter> Unit<R> {
    /// Build a unit and let `configure` register its routes.
    ///
    /// Errors from the router (bad configuration, bad paths) are returned
    /// as-is.
    pub fn new<F>(
        state: UnitState,
        env: Arc<R::Env>,
        options: UnitOptions<R::Config>,
        configure: F,
    ) -> Result<Self, R::Error>
    where
        F: FnOnce(&mut R) -> Result<(), R::Error>,
    {
        let name = options.resolved_name().to_string();
        let mut router = R::new(state.clone(), Arc::clone(&env), &name, options.router)?;
        configure(&mut router)?;
        router.seal()?;

        tracing::trace!(unit.id = %state.id, unit.name = %name, "Unit constructed");

        Ok(Self {
            state,
            env,
            name,
            router,
        })
    }

    /// `new` with default options.
    pub fn with_defaults<F>(state: UnitState, env: Arc<R::Env>, configure: F) -> Result<Self, R::Error>
    where
        F: FnOnce(&mut R) -> Result<(), R::Error>,
    {
        Self::new(state, env, UnitOptions::default(), configure)
    }

    /// Entry point for requests delivered by the host.
    pub async fn fetch(&self, request: Request<Body>) -> Result<Response, R::Error> {
        self.router.dispatch(request).await
    }

    pub fn id(&self) -> &UnitId {
        &self.state.id
    }

    pub fn storage(&self) -> &Storage {
        &self.state.storage
    }

    pub fn state(&self) -> &UnitState {
        &self.state
    }

    pub fn env(&self) -> &Arc<R::Env> {
        &self.env
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn router(&self) -> &R {
        &self.router
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{RouteError, RouterConfig, RouterError, UnitContext, UnitRouter};
    use crate::unit::env::{LogLevel, UnitEnv};
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::get;

    type TestUnit = Unit<UnitRouter<UnitEnv>>;

    fn state() -> UnitState {
        let id = UnitId::new_unique();
        UnitState::new(id.clone(), Storage::in_memory(id))
    }

    #[test]
    fn test_router_bound_to_unit_state_and_env() {
        let env = Arc::new(UnitEnv::new(LogLevel::Debug));
        let state = state();
        let unit = TestUnit::with_defaults(state.clone(), env.clone(), |_| Ok(())).unwrap();

        let ctx = unit.router().context();
        assert_eq!(ctx.id(), &state.id);
        assert_eq!(unit.id(), &state.id);
        assert!(Arc::ptr_eq(ctx.env(), &env));
        assert!(Arc::ptr_eq(unit.env(), &env));
        assert!(unit.router().is_sealed());
    }

    #[test]
    fn test_default_name() {
        let unit = TestUnit::with_defaults(state(), Arc::new(UnitEnv::default()), |_| Ok(())).unwrap();
        assert_eq!(unit.name(), DEFAULT_NAME);
        assert_eq!(unit.router().name(), "unnamed");
        assert_eq!(unit.router().context().name(), "unnamed");
    }

    #[test]
    fn test_supplied_name_reaches_router() {
        let unit = TestUnit::new(
            state(),
            Arc::new(UnitEnv::default()),
            UnitOptions::named("counter"),
            |_| Ok(()),
        )
        .unwrap();
        assert_eq!(unit.name(), "counter");
        assert_eq!(unit.router().name(), "counter");
    }

    #[test]
    fn test_router_config_passed_through() {
        let config = RouterConfig::default().with_base_path("/api");
        let options = UnitOptions::default().with_router_config(config.clone());
        let unit = TestUnit::new(state(), Arc::new(UnitEnv::default()), options, |_| Ok(())).unwrap();
        assert_eq!(unit.router().config(), &config);
    }

    #[test]
    fn test_construction_errors_propagate() {
        let options = UnitOptions::default()
            .with_router_config(RouterConfig::default().with_base_path("api/"));
        let err = TestUnit::new(state(), Arc::new(UnitEnv::default()), options, |_| Ok(()))
            .err()
            .unwrap();
        assert_eq!(err, RouterError::InvalidBasePath("api/".into()));

        let err = TestUnit::with_defaults(state(), Arc::new(UnitEnv::default()), |router| {
            router.route("no-slash", get(|| async { "x" }))?;
            Ok(())
        })
        .err()
        .unwrap();
        assert!(matches!(err, RouterError::InvalidPath(..)));
    }

    #[tokio::test]
    async fn test_fetch_forwards_to_registered_route() {
        async fn greet(State(ctx): State<UnitContext<UnitEnv>>) -> Result<String, RouteError> {
            Ok(format!("hello from {}", ctx.name()))
        }

        let unit = TestUnit::new(
            state(),
            Arc::new(UnitEnv::default()),
            UnitOptions::named("greeter"),
            |router| {
                router.route("/greet", get(greet))?;
                Ok(())
            },
        )
        .unwrap();

        let request = Request::builder().uri("/greet").body(Body::empty()).unwrap();
        let response = unit.fetch(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"hello from greeter");
    }
}
