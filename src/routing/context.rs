//! Per-request context handed to route handlers.

use std::sync::Arc;

use crate::storage::Storage;
use crate::unit::env::Environment;
use crate::unit::state::{UnitId, UnitState};

/// What a handler sees of its unit: identity, storage, environment and name.
///
/// Handlers extract it with `State(ctx): State<UnitContext<E>>`.
pub struct UnitContext<E> {
    state: UnitState,
    env: Arc<E>,
    name: Arc<str>,
}

impl<E: Environment> UnitContext<E> {
    pub fn new(state: UnitState, env: Arc<E>, name: &str) -> Self {
        Self {
            state,
            env,
            name: Arc::from(name),
        }
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

    pub fn env(&self) -> &Arc<E> {
        &self.env
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

// Manual impl: `E` itself need not be Clone
impl<E> Clone for UnitContext<E> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            env: Arc::clone(&self.env),
            name: Arc::clone(&self.name),
        }
    }
}
