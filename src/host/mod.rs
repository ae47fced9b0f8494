//! Local host for running units outside the platform.
//!
//! # Data Flow
//! ```text
//! HTTP request  /{unit}/{path}?{query}
//!     → server.rs (resolve unit name → UnitId, strip unit segment)
//!     → namespace.rs (activate once per id, serialize delivery)
//!     → Unit::fetch → router
//!     → Response
//! ```
//!
//! # Design Decisions
//! - Mirrors the platform contract only: one instance per identity,
//!   one request at a time per instance, storage outliving instances
//! - Storage backend chosen from config: memory, or a JSON snapshot file

pub mod namespace;
pub mod server;

use std::sync::Arc;

use crate::config::StorageConfig;
use crate::storage::{FileBackend, MemoryBackend, StorageBackend, StorageError};

pub use namespace::{Namespace, UnitFactory, UnitStub};
pub use server::HostServer;

/// Errors raised while running the host.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Open the storage backend described by `config`.
pub fn open_backend(config: &StorageConfig) -> Result<Arc<dyn StorageBackend>, StorageError> {
    match &config.persistence_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Using file-backed storage");
            Ok(Arc::new(FileBackend::open(path)?))
        }
        None => {
            tracing::info!("Using in-memory storage");
            Ok(Arc::new(MemoryBackend::new()))
        }
    }
}
