//! Counter unit.
//!
//! `/count` on a unit holding one integer:
//! - `GET` returns `{"count": n}` (0 when nothing is stored)
//! - `POST {"increment": k}` adds `k` (default 1), stores and returns the total
//! - `DELETE` clears the stored value

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::host::UnitFactory;
use crate::routing::{RequestRouter, RouteError, RouterConfig, RouterError, UnitContext, UnitRouter};
use crate::unit::env::Environment;
use crate::unit::state::UnitState;
use crate::unit::{Unit, UnitOptions};

/// Storage key holding the count.
pub const COUNT_KEY: &str = "count";

/// Name given to counter units unless configured otherwise.
pub const UNIT_NAME: &str = "counter";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountBody {
    pub count: i64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct IncrementBody {
    #[serde(default = "default_increment")]
    pub increment: i64,
}

fn default_increment() -> i64 {
    1
}

/// Register the counter routes.
pub fn configure<E: Environment>(router: &mut UnitRouter<E>) -> Result<(), RouterError> {
    router.route(
        "/count",
        get(get_count::<E>).post(add_count::<E>).delete(clear_count::<E>),
    )?;
    Ok(())
}

/// Factory building counter units for a namespace.
pub fn factory<E: Environment>(options: UnitOptions<RouterConfig>) -> UnitFactory<UnitRouter<E>> {
    let name = options.name.unwrap_or_else(|| UNIT_NAME.to_string());
    let router = options.router;
    Arc::new(move |state: UnitState, env: Arc<E>| {
        let options = UnitOptions {
            name: Some(name.clone()),
            router: router.clone(),
        };
        Unit::<UnitRouter<E>>::new(state, env, options, configure::<E>)
    })
}

async fn get_count<E: Environment>(
    State(ctx): State<UnitContext<E>>,
) -> Result<Json<CountBody>, RouteError> {
    let count = ctx.storage().get::<i64>(COUNT_KEY)?.unwrap_or(0);
    Ok(Json(CountBody { count }))
}

async fn add_count<E: Environment>(
    State(ctx): State<UnitContext<E>>,
    Json(body): Json<IncrementBody>,
) -> Result<Json<CountBody>, RouteError> {
    let current = ctx.storage().get::<i64>(COUNT_KEY)?.unwrap_or(0);
    let count = current
        .checked_add(body.increment)
        .ok_or_else(|| RouteError::BadRequest("count would overflow".to_string()))?;

    ctx.storage().put(COUNT_KEY, &count)?;
    tracing::debug!(unit.id = %ctx.id(), count, "Counter updated");
    Ok(Json(CountBody { count }))
}

async fn clear_count<E: Environment>(
    State(ctx): State<UnitContext<E>>,
) -> Result<StatusCode, RouteError> {
    ctx.storage().delete(COUNT_KEY)?;
    Ok(StatusCode::NO_CONTENT)
}
