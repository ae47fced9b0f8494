//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use serde_json::Value;
use tokio::net::TcpListener;

use durable_unit::counter;
use durable_unit::host::{HostServer, Namespace};
use durable_unit::lifecycle::Shutdown;
use durable_unit::storage::{MemoryBackend, StorageBackend};
use durable_unit::unit::env::UnitEnv;
use durable_unit::{UnitOptions, UnitRouter};

pub type CounterNamespace = Namespace<UnitRouter<UnitEnv>>;

/// A counter namespace over the given backend.
pub fn counter_namespace(backend: Arc<dyn StorageBackend>) -> Arc<CounterNamespace> {
    Arc::new(Namespace::new(
        "counter",
        Arc::new(UnitEnv::default()),
        backend,
        counter::factory(UnitOptions::default()),
    ))
}

pub fn memory_counter_namespace() -> Arc<CounterNamespace> {
    counter_namespace(Arc::new(MemoryBackend::new()))
}

pub fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Start a host server on an ephemeral port. Returns its address and the
/// shutdown coordinator.
pub async fn start_host(namespace: Arc<CounterNamespace>) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = HostServer::new(namespace).run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}
