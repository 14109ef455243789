//! In-memory document store
//!
//! Backs the test suite and embedded use. Same contract as the PostgreSQL
//! backend, including the compare-and-swap replace and the idempotent
//! history insert; "collections" are nested maps keyed the same way the
//! SQL tables are.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use stratum_meta::VersionOrder;

use crate::{
    db::traits::DocumentStore,
    models::{HistoryEntry, Resource},
    Error, Result,
};

type Key = (String, String);

#[derive(Default)]
struct Shelves {
    /// (resourceType, id) -> live document
    current: HashMap<Key, Resource>,
    /// (resourceType, id) -> version -> archived document
    history: HashMap<Key, HashMap<String, Resource>>,
    /// resourceType -> last allocated counter value
    sequences: HashMap<String, i64>,
}

#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    inner: Arc<RwLock<Shelves>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Shelves>> {
        self.inner
            .read()
            .map_err(|_| Error::Internal("document store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Shelves>> {
        self.inner
            .write()
            .map_err(|_| Error::Internal("document store lock poisoned".to_string()))
    }
}

fn key(resource_type: &str, id: &str) -> Key {
    (resource_type.to_string(), id.to_string())
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find_current(&self, resource_type: &str, id: &str) -> Result<Option<Resource>> {
        let shelves = self.read()?;
        Ok(shelves.current.get(&key(resource_type, id)).cloned())
    }

    async fn insert_current(&self, resource_type: &str, resource: &Resource) -> Result<()> {
        let mut shelves = self.write()?;
        let key = key(resource_type, &resource.id);
        if shelves.current.contains_key(&key) {
            return Err(Error::already_exists(resource_type, &resource.id));
        }
        shelves.current.insert(key, resource.clone());
        Ok(())
    }

    async fn replace_current(
        &self,
        resource_type: &str,
        id: &str,
        expected_version: &str,
        resource: &Resource,
    ) -> Result<()> {
        let mut shelves = self.write()?;
        let slot = shelves
            .current
            .get_mut(&key(resource_type, id))
            .ok_or_else(|| Error::not_found(resource_type, id))?;

        if slot.meta.version_id != expected_version {
            return Err(Error::VersionConflict {
                resource_type: resource_type.to_string(),
                id: id.to_string(),
                expected: expected_version.to_string(),
                actual: slot.meta.version_id.clone(),
            });
        }

        *slot = resource.clone();
        Ok(())
    }

    async fn delete_current(&self, resource_type: &str, id: &str) -> Result<bool> {
        let mut shelves = self.write()?;
        Ok(shelves.current.remove(&key(resource_type, id)).is_some())
    }

    async fn insert_history(&self, resource_type: &str, entry: &HistoryEntry) -> Result<()> {
        let mut shelves = self.write()?;
        let versions = shelves
            .history
            .entry(key(resource_type, &entry.resource.id))
            .or_default();

        // Idempotent: the first archived snapshot of a version wins.
        versions
            .entry(entry.version.clone())
            .or_insert_with(|| entry.resource.clone());
        Ok(())
    }

    async fn find_history_version(
        &self,
        resource_type: &str,
        id: &str,
        version: &str,
    ) -> Result<Option<Resource>> {
        let shelves = self.read()?;
        Ok(shelves
            .history
            .get(&key(resource_type, id))
            .and_then(|versions| versions.get(version))
            .cloned())
    }

    async fn list_history(
        &self,
        resource_type: &str,
        id: &str,
        order: VersionOrder,
    ) -> Result<Vec<HistoryEntry>> {
        let shelves = self.read()?;
        let mut entries: Vec<HistoryEntry> = shelves
            .history
            .get(&key(resource_type, id))
            .map(|versions| {
                versions
                    .iter()
                    .map(|(version, resource)| HistoryEntry {
                        version: version.clone(),
                        resource: resource.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        entries.sort_by(|a, b| order.compare(&b.version, &a.version));
        Ok(entries)
    }

    async fn delete_history(&self, resource_type: &str, id: &str) -> Result<u64> {
        let mut shelves = self.write()?;
        let removed = shelves
            .history
            .remove(&key(resource_type, id))
            .map(|versions| versions.len() as u64)
            .unwrap_or(0);
        Ok(removed)
    }

    async fn next_sequence(&self, resource_type: &str) -> Result<i64> {
        let mut shelves = self.write()?;
        let counter = shelves
            .sequences
            .entry(resource_type.to_string())
            .or_insert(0);
        *counter += 1;
        Ok(*counter)
    }
}
