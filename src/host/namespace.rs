//! Unit activation by identity.
//!
//! # Responsibilities
//! - Derive, generate and parse unit identities for one namespace
//! - Activate at most one unit per identity, on first use
//! - Deliver requests to an activation one at a time
//!
//! # Design Decisions
//! - The factory runs under the map entry lock: construction happens exactly once
//! - A failed construction leaves no entry behind; the next request retries
//! - Each activation sits behind an async mutex; distinct units run concurrently
//! - Eviction drops the instance only; its storage stays in the backend

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::routing::RequestRouter;
use crate::storage::{Storage, StorageBackend};
use crate::unit::state::{IdError, UnitId, UnitState};
use crate::unit::Unit;

/// Builds a unit from the state handle and environment the host provides.
pub type UnitFactory<R> = Arc<
    dyn Fn(UnitState, Arc<<R as RequestRouter>::Env>) -> Result<Unit<R>, <R as RequestRouter>::Error>
        + Send
        + Sync,
>;

/// A set of units sharing a factory, an environment and a storage backend.
pub struct Namespace<R: RequestRouter> {
    name: String,
    uuid: Uuid,
    env: Arc<R::Env>,
    backend: Arc<dyn StorageBackend>,
    factory: UnitFactory<R>,
    active: DashMap<UnitId, Arc<Mutex<Unit<R>>>>,
}

impl<R: RequestRouter> Namespace<R> {
    pub fn new(
        name: impl Into<String>,
        env: Arc<R::Env>,
        backend: Arc<dyn StorageBackend>,
        factory: UnitFactory<R>,
    ) -> Self {
        let name = name.into();
        Self {
            uuid: Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()),
            name,
            env,
            backend,
            factory,
            active: DashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn env(&self) -> &Arc<R::Env> {
        &self.env
    }

    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    /// Same name, same id, for the lifetime of this namespace name.
    pub fn id_from_name(&self, name: &str) -> UnitId {
        UnitId::from_name(&self.uuid, name)
    }

    pub fn new_unique_id(&self) -> UnitId {
        UnitId::new_unique()
    }

    pub fn id_from_string(&self, id: &str) -> Result<UnitId, IdError> {
        id.parse()
    }

    /// Handle to the unit with `id`, activating it if needed.
    pub fn get(&self, id: &UnitId) -> Result<UnitStub<R>, R::Error> {
        if let Some(unit) = self.active.get(id) {
            return Ok(UnitStub::new(id.clone(), Arc::clone(unit.value())));
        }

        let unit = match self.active.entry(id.clone()) {
            Entry::Occupied(entry) => Arc::clone(entry.get()),
            Entry::Vacant(entry) => {
                let storage = Storage::new(id.clone(), Arc::clone(&self.backend));
                let state = UnitState::new(id.clone(), storage);
                let unit = (self.factory)(state, Arc::clone(&self.env)).inspect_err(|e| {
                    tracing::warn!(namespace = %self.name, unit.id = %id, error = %e, "Unit construction failed");
                })?;

                tracing::info!(
                    namespace = %self.name,
                    unit.id = %id,
                    unit.name = %unit.name(),
                    "Unit activated"
                );
                Arc::clone(entry.insert(Arc::new(Mutex::new(unit))).value())
            }
        };
        Ok(UnitStub::new(id.clone(), unit))
    }

    /// Drop the activation for `id`. Returns whether one existed.
    pub fn evict(&self, id: &UnitId) -> bool {
        let evicted = self.active.remove(id).is_some();
        if evicted {
            tracing::info!(namespace = %self.name, unit.id = %id, "Unit evicted");
        }
        evicted
    }

    pub fn is_active(&self, id: &UnitId) -> bool {
        self.active.contains_key(id)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}

/// Handle used to send requests to one activated unit.
pub struct UnitStub<R: RequestRouter> {
    id: UnitId,
    unit: Arc<Mutex<Unit<R>>>,
}

impl<R: RequestRouter> UnitStub<R> {
    fn new(id: UnitId, unit: Arc<Mutex<Unit<R>>>) -> Self {
        Self { id, unit }
    }

    pub fn id(&self) -> &UnitId {
        &self.id
    }

    /// Whether both stubs point at the same activation.
    pub fn same_activation(&self, other: &UnitStub<R>) -> bool {
        Arc::ptr_eq(&self.unit, &other.unit)
    }

    /// Deliver a request. Requests to the same unit are handled one at a time.
    pub async fn fetch(&self, request: Request<Body>) -> Result<Response, R::Error> {
        let unit = self.unit.lock().await;
        unit.fetch(request).await
    }
}

impl<R: RequestRouter> Clone for UnitStub<R> {
    fn clone(&self) -> Self {
        Self::new(self.id.clone(), Arc::clone(&self.unit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{RouterConfig, RouterError, UnitRouter};
    use crate::storage::MemoryBackend;
    use crate::unit::env::UnitEnv;
    use crate::unit::UnitOptions;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type TestRouter = UnitRouter<UnitEnv>;
    type TestUnit = Unit<TestRouter>;

    fn counting_namespace(builds: Arc<AtomicUsize>) -> Namespace<TestRouter> {
        let factory: UnitFactory<TestRouter> = Arc::new(move |state: UnitState, env: Arc<UnitEnv>| {
            builds.fetch_add(1, Ordering::SeqCst);
            TestUnit::new(state, env, UnitOptions::named("probe"), |_| Ok(()))
        });
        Namespace::new(
            "probes",
            Arc::new(UnitEnv::default()),
            Arc::new(MemoryBackend::new()),
            factory,
        )
    }

    #[test]
    fn test_single_activation_per_id() {
        let builds = Arc::new(AtomicUsize::new(0));
        let ns = counting_namespace(builds.clone());

        let id = ns.id_from_name("alpha");
        let a = ns.get(&id).unwrap();
        let b = ns.get(&ns.id_from_name("alpha")).unwrap();
        let c = ns.get(&ns.id_from_name("beta")).unwrap();

        assert!(a.same_activation(&b));
        assert!(!a.same_activation(&c));
        assert_eq!(builds.load(Ordering::SeqCst), 2);
        assert_eq!(ns.active_count(), 2);
    }

    #[test]
    fn test_evict_then_reactivate() {
        let builds = Arc::new(AtomicUsize::new(0));
        let ns = counting_namespace(builds.clone());
        let id = ns.new_unique_id();

        let first = ns.get(&id).unwrap();
        assert!(ns.evict(&id));
        assert!(!ns.evict(&id));
        assert!(!ns.is_active(&id));

        let second = ns.get(&id).unwrap();
        assert!(!first.same_activation(&second));
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failed_construction_not_cached() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let factory: UnitFactory<TestRouter> = Arc::new(move |state: UnitState, env: Arc<UnitEnv>| {
            let options = if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                UnitOptions::default().with_router_config(RouterConfig::default().with_base_path("bad"))
            } else {
                UnitOptions::default()
            };
            TestUnit::new(state, env, options, |_| Ok(()))
        });
        let ns = Namespace::new(
            "flaky",
            Arc::new(UnitEnv::default()),
            Arc::new(MemoryBackend::new()),
            factory,
        );
        let id = ns.id_from_name("x");

        let err = ns.get(&id).err().unwrap();
        assert_eq!(err, RouterError::InvalidBasePath("bad".into()));
        assert!(!ns.is_active(&id));

        assert!(ns.get(&id).is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_id_helpers() {
        let ns = counting_namespace(Arc::new(AtomicUsize::new(0)));
        let id = ns.id_from_name("alpha");

        assert_eq!(ns.id_from_string(&id.to_string()).unwrap(), id);
        assert!(ns.id_from_string("zzz").is_err());
        assert_ne!(ns.new_unique_id(), ns.new_unique_id());
    }
}
