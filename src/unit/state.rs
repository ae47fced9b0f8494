//! Host-provided state handle.
//!
//! # Responsibilities
//! - Carry the stable identity of a unit
//! - Carry the unit's persistent storage handle
//!
//! # Design Decisions
//! - Identity equality ignores the originating name (UUID only)
//! - The handle is cheap to clone; storage is shared behind an Arc

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::Storage;

/// Error returned when parsing a unit id from a string.
#[derive(Debug, thiserror::Error)]
#[error("invalid unit id `{input}`: {source}")]
pub struct IdError {
    input: String,
    #[source]
    source: uuid::Error,
}

/// Stable identity of a unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitId {
    uuid: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl UnitId {
    /// Derive an id from a name inside a namespace. Same inputs, same id.
    pub fn from_name(namespace: &Uuid, name: &str) -> Self {
        Self {
            uuid: Uuid::new_v5(namespace, name.as_bytes()),
            name: Some(name.to_string()),
        }
    }

    /// Generate a random id.
    pub fn new_unique() -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: None,
        }
    }

    pub fn uuid(&self) -> &Uuid {
        &self.uuid
    }

    /// Name the id was derived from, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl From<Uuid> for UnitId {
    fn from(uuid: Uuid) -> Self {
        Self { uuid, name: None }
    }
}

impl FromStr for UnitId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = Uuid::parse_str(s).map_err(|source| IdError {
            input: s.to_string(),
            source,
        })?;
        Ok(uuid.into())
    }
}

impl PartialEq for UnitId {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
    }
}

impl Eq for UnitId {}

impl Hash for UnitId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uuid.hash(state);
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uuid.hyphenated())
    }
}

/// State handle injected by the host: identity plus storage.
#[derive(Debug, Clone)]
pub struct UnitState {
    pub id: UnitId,
    pub storage: Storage,
}

impl UnitState {
    pub fn new(id: UnitId, storage: Storage) -> Self {
        Self { id, storage }
    }
}
