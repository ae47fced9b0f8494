//! In-memory storage backend.

use std::collections::BTreeMap;

use dashmap::DashMap;
use serde_json::Value;

use crate::storage::{StorageBackend, StorageError};
use crate::unit::state::UnitId;

/// Process-lifetime storage keyed by unit.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    units: DashMap<UnitId, BTreeMap<String, Value>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of units holding at least one key.
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Copy of every keyspace, used for snapshots.
    pub(crate) fn snapshot(&self) -> BTreeMap<String, BTreeMap<String, Value>> {
        self.units
            .iter()
            .map(|entry| (entry.key().to_string(), entry.value().clone()))
            .collect()
    }

    pub(crate) fn restore(&self, unit: UnitId, entries: BTreeMap<String, Value>) {
        if !entries.is_empty() {
            self.units.insert(unit, entries);
        }
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, unit: &UnitId, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self
            .units
            .get(unit)
            .and_then(|entries| entries.get(key).cloned()))
    }

    fn put(&self, unit: &UnitId, key: &str, value: Value) -> Result<(), StorageError> {
        self.units
            .entry(unit.clone())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, unit: &UnitId, key: &str) -> Result<bool, StorageError> {
        let removed = match self.units.get_mut(unit) {
            Some(mut entries) => entries.remove(key).is_some(),
            None => return Ok(false),
        };
        // Drop empty keyspaces so they do not show up in snapshots
        self.units.remove_if(unit, |_, entries| entries.is_empty());
        Ok(removed)
    }

    fn list(&self, unit: &UnitId, prefix: &str) -> Result<BTreeMap<String, Value>, StorageError> {
        Ok(self
            .units
            .get(unit)
            .map(|entries| {
                entries
                    .range(prefix.to_string()..)
                    .take_while(|(k, _)| k.starts_with(prefix))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn delete_all(&self, unit: &UnitId) -> Result<usize, StorageError> {
        Ok(self
            .units
            .remove(unit)
            .map(|(_, entries)| entries.len())
            .unwrap_or(0))
    }
}
