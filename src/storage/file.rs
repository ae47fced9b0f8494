//! File-persisted storage backend.
//!
//! Keeps every keyspace in memory and writes a JSON snapshot after each
//! mutation. Snapshot layout:
//!
//! ```text
//! { "<unit uuid>": { "<key>": <json value>, ... }, ... }
//! ```

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

use crate::storage::memory::MemoryBackend;
use crate::storage::{StorageBackend, StorageError};
use crate::unit::state::UnitId;

type Snapshot = BTreeMap<String, BTreeMap<String, Value>>;

/// Storage that survives process restarts.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    memory: MemoryBackend,
    // Serializes snapshot writes
    write_lock: Mutex<()>,
}

impl FileBackend {
    /// Open the snapshot at `path`, creating an empty store if it does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let memory = MemoryBackend::new();

        if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            let snapshot: Snapshot = serde_json::from_reader(reader)
                .map_err(|e| StorageError::Corrupt(format!("{}: {}", path.display(), e)))?;

            for (unit, entries) in snapshot {
                let id: UnitId = unit
                    .parse()
                    .map_err(|e| StorageError::Corrupt(format!("{}: {}", path.display(), e)))?;
                memory.restore(id, entries);
            }
            tracing::info!(
                path = %path.display(),
                units = memory.unit_count(),
                "Loaded storage snapshot"
            );
        }

        Ok(Self {
            path,
            memory,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Write the current memory state to disk. Callers hold the write lock.
    fn persist(&self) -> Result<(), StorageError> {
        let snapshot = self.memory.snapshot();
        let tmp = self.path.with_extension("tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer(&mut writer, &snapshot)?;
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;

        tracing::debug!(path = %self.path.display(), units = snapshot.len(), "Saved storage snapshot");
        Ok(())
    }

    /// Persist, undoing the in-memory mutation if the write fails.
    fn persist_or(&self, rollback: impl FnOnce(&MemoryBackend)) -> Result<(), StorageError> {
        self.persist().inspect_err(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "Snapshot write failed; change rolled back");
            rollback(&self.memory);
        })
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, unit: &UnitId, key: &str) -> Result<Option<Value>, StorageError> {
        self.memory.get(unit, key)
    }

    fn put(&self, unit: &UnitId, key: &str, value: Value) -> Result<(), StorageError> {
        let _guard = self.lock();
        let previous = self.memory.get(unit, key)?;
        self.memory.put(unit, key, value)?;

        self.persist_or(|memory| {
            let _ = match previous {
                Some(value) => memory.put(unit, key, value),
                None => memory.delete(unit, key).map(drop),
            };
        })
    }

    fn delete(&self, unit: &UnitId, key: &str) -> Result<bool, StorageError> {
        let _guard = self.lock();
        let Some(previous) = self.memory.get(unit, key)? else {
            return Ok(false);
        };
        self.memory.delete(unit, key)?;

        self.persist_or(|memory| {
            let _ = memory.put(unit, key, previous);
        })?;
        Ok(true)
    }

    fn list(&self, unit: &UnitId, prefix: &str) -> Result<BTreeMap<String, Value>, StorageError> {
        self.memory.list(unit, prefix)
    }

    fn delete_all(&self, unit: &UnitId) -> Result<usize, StorageError> {
        let _guard = self.lock();
        let previous = self.memory.list(unit, "")?;
        if previous.is_empty() {
            return Ok(0);
        }
        let removed = self.memory.delete_all(unit)?;

        self.persist_or(|memory| memory.restore(unit.clone(), previous))?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("units.json");
        let unit = UnitId::new_unique();

        {
            let backend = FileBackend::open(&path).unwrap();
            backend.put(&unit, "count", json!(5)).unwrap();
            backend.put(&unit, "label", json!("five")).unwrap();
            assert!(backend.delete(&unit, "label").unwrap());
        }

        let reopened = FileBackend::open(&path).unwrap();
        assert_eq!(reopened.get(&unit, "count").unwrap(), Some(json!(5)));
        assert_eq!(reopened.get(&unit, "label").unwrap(), None);
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path().join("absent.json")).unwrap();
        assert!(backend.list(&UnitId::new_unique(), "").unwrap().is_empty());
    }

    #[test]
    fn test_failed_write_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path().join("missing_dir").join("units.json")).unwrap();
        let unit = UnitId::new_unique();

        let err = backend.put(&unit, "count", json!(5)).unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
        assert_eq!(backend.get(&unit, "count").unwrap(), None);
        assert!(backend.list(&unit, "").unwrap().is_empty());
    }

    #[test]
    fn test_failed_write_restores_previous_values() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        let backend = FileBackend::open(nested.join("units.json")).unwrap();
        let unit = UnitId::new_unique();
        backend.put(&unit, "count", json!(1)).unwrap();
        backend.put(&unit, "label", json!("one")).unwrap();

        fs::remove_dir_all(&nested).unwrap();

        assert!(backend.put(&unit, "count", json!(2)).is_err());
        assert_eq!(backend.get(&unit, "count").unwrap(), Some(json!(1)));

        assert!(backend.delete(&unit, "label").is_err());
        assert_eq!(backend.get(&unit, "label").unwrap(), Some(json!("one")));

        assert!(backend.delete_all(&unit).is_err());
        assert_eq!(backend.list(&unit, "").unwrap().len(), 2);
    }

    #[test]
    fn test_corrupt_snapshot_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();

        let err = FileBackend::open(&path).unwrap_err();
        assert!(matches!(err, StorageError::Corrupt(_)));
    }
}
