//! Catalog store implementations.
//!
//! The runtime only requires the [`CatalogStore`] contract; these two
//! implementations cover tests/embedding (in-memory) and single-node
//! deployments (JSON file). Anything durable works.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use plughub_core::AppResult;
use plughub_core::traits::CatalogStore;
use plughub_core::types::PluginRecord;

/// Volatile in-memory store.
pub struct MemoryStore {
    records: RwLock<HashMap<String, PluginRecord>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn load_all(&self) -> AppResult<Vec<PluginRecord>> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn save(&self, record: &PluginRecord) -> AppResult<()> {
        self.records
            .write()
            .await
            .insert(record.name.clone(), record.clone());
        Ok(())
    }

    async fn delete(&self, name: &str) -> AppResult<()> {
        self.records.write().await.remove(name);
        Ok(())
    }
}

/// JSON-file backed store.
///
/// The whole catalog is one JSON array; every mutation rewrites the file
/// under a lock. Plugin catalogs are small, so read-modify-write is fine.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Creates a store persisting to `path`. The file is created on first
    /// write; a missing file reads as an empty catalog.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read_records(&self) -> AppResult<Vec<PluginRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_records(&self, records: &[PluginRecord]) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_string_pretty(records)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for JsonFileStore {
    async fn load_all(&self) -> AppResult<Vec<PluginRecord>> {
        let _guard = self.lock.lock().await;
        self.read_records()
    }

    async fn save(&self, record: &PluginRecord) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        let mut records = self.read_records()?;
        match records.iter_mut().find(|r| r.name == record.name) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        self.write_records(&records)
    }

    async fn delete(&self, name: &str) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        let mut records = self.read_records()?;
        records.retain(|r| r.name != name);
        self.write_records(&records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        store.save(&PluginRecord::new("metrics")).await.unwrap();

        let records = store.load_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "metrics");

        store.delete("metrics").await.unwrap();
        assert!(store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_json_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data/plugins.json");

        {
            let store = JsonFileStore::new(&path);
            let mut record = PluginRecord::new("metrics");
            record.version = "2.1.0".to_string();
            store.save(&record).await.unwrap();
        }

        let store = JsonFileStore::new(&path);
        let records = store.load_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].version, "2.1.0");
    }

    #[tokio::test]
    async fn test_json_store_save_replaces_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("plugins.json"));

        let mut record = PluginRecord::new("metrics");
        store.save(&record).await.unwrap();
        record.mark_active();
        store.save(&record).await.unwrap();

        let records = store.load_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].is_active);
    }

    #[tokio::test]
    async fn test_json_store_delete_unknown_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("plugins.json"));
        store.delete("ghost").await.unwrap();
    }
}
