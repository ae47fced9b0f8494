//! Everything needed to write a unit and its handlers from one import.
//!
//! ```ignore
//! use durable_unit::prelude::*;
//!
//! async fn hello(State(ctx): State<UnitContext<UnitEnv>>) -> String {
//!     format!("hello from {}", ctx.name())
//! }
//!
//! let unit = Unit::<UnitRouter<UnitEnv>>::with_defaults(state, env, |router| {
//!     router.route("/hello", get(hello))?;
//!     Ok(())
//! })?;
//! ```

pub use axum::body::Body;
pub use axum::extract::{Path, Query, State};
pub use axum::http::{HeaderMap, Method, Request, StatusCode};
pub use axum::response::{IntoResponse, Response};
pub use axum::routing::{any, delete, get, patch, post, put, MethodRouter};
pub use axum::Json;

pub use crate::routing::{
    CorsConfig, RequestRouter, RouteError, RouterConfig, RouterError, UnitContext, UnitRouter,
};
pub use crate::storage::{Storage, StorageError};
pub use crate::unit::env::{Environment, LogLevel, UnitEnv};
pub use crate::unit::state::{UnitId, UnitState};
pub use crate::unit::{Unit, UnitOptions, DEFAULT_NAME};
