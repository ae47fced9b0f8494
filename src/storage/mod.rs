//! Persistent key-value storage for units.
//!
//! # Data Flow
//! ```text
//! Route handler
//!     → Storage (keyspace scoped to one UnitId, typed get/put)
//!     → StorageBackend (shared across units)
//!         → memory.rs (DashMap, process lifetime)
//!         → file.rs   (memory + JSON snapshot on disk)
//! ```
//!
//! # Design Decisions
//! - Values are stored as JSON; typed access goes through serde
//! - Keys are validated once, in `Storage`, before reaching any backend
//! - Backends are internally synchronized; no locking in callers

pub mod file;
pub mod memory;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::unit::state::UnitId;

pub use file::FileBackend;
pub use memory::MemoryBackend;

/// Maximum size of a storage key in bytes.
pub const MAX_KEY_BYTES: usize = 2048;

/// Errors produced by storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt storage snapshot: {0}")]
    Corrupt(String),
}

/// A shared store holding the keyspaces of many units.
pub trait StorageBackend: Send + Sync + fmt::Debug {
    fn get(&self, unit: &UnitId, key: &str) -> Result<Option<Value>, StorageError>;

    fn put(&self, unit: &UnitId, key: &str, value: Value) -> Result<(), StorageError>;

    /// Returns whether the key existed.
    fn delete(&self, unit: &UnitId, key: &str) -> Result<bool, StorageError>;

    /// Entries whose key starts with `prefix`, ordered by key.
    fn list(&self, unit: &UnitId, prefix: &str) -> Result<BTreeMap<String, Value>, StorageError>;

    /// Returns the number of keys removed.
    fn delete_all(&self, unit: &UnitId) -> Result<usize, StorageError>;
}

/// Storage handle for a single unit.
#[derive(Clone)]
pub struct Storage {
    unit: UnitId,
    backend: Arc<dyn StorageBackend>,
}

impl Storage {
    pub fn new(unit: UnitId, backend: Arc<dyn StorageBackend>) -> Self {
        Self { unit, backend }
    }

    /// A storage handle over a fresh in-memory backend.
    pub fn in_memory(unit: UnitId) -> Self {
        Self::new(unit, Arc::new(MemoryBackend::new()))
    }

    pub fn unit(&self) -> &UnitId {
        &self.unit
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        check_key(key)?;
        match self.backend.get(&self.unit, key)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        check_key(key)?;
        let value = serde_json::to_value(value)?;
        self.backend.put(&self.unit, key, value)
    }

    pub fn delete(&self, key: &str) -> Result<bool, StorageError> {
        check_key(key)?;
        self.backend.delete(&self.unit, key)
    }

    pub fn list(&self, prefix: &str) -> Result<BTreeMap<String, Value>, StorageError> {
        self.backend.list(&self.unit, prefix)
    }

    pub fn delete_all(&self) -> Result<usize, StorageError> {
        self.backend.delete_all(&self.unit)
    }
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("unit", &self.unit)
            .field("backend", &self.backend)
            .finish()
    }
}

fn check_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("key must not be empty".to_string()));
    }
    if key.len() > MAX_KEY_BYTES {
        return Err(StorageError::InvalidKey(format!(
            "key is {} bytes, limit is {}",
            key.len(),
            MAX_KEY_BYTES
        )));
    }
    Ok(())
}
