//! Plugin catalog — the in-memory record set, written through to the
//! durable store on every mutation.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use plughub_core::traits::CatalogStore;
use plughub_core::types::{PluginRecord, PluginStats};
use plughub_core::{AppError, AppResult};

use crate::plugin::PluginMetadata;

/// Catalog of every known plugin.
///
/// Owned by the lifecycle manager; the hook registry never reads or writes
/// it. Records survive restarts via the store, the in-memory map is the
/// working copy.
pub struct PluginCatalog {
    records: RwLock<HashMap<String, PluginRecord>>,
    store: Arc<dyn CatalogStore>,
}

impl PluginCatalog {
    /// Creates an empty catalog over `store`.
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            store,
        }
    }

    /// Populates the in-memory map from the store.
    pub async fn load(&self) -> AppResult<()> {
        let persisted = self.store.load_all().await?;
        let mut records = self.records.write().await;
        records.clear();
        for record in persisted {
            records.insert(record.name.clone(), record);
        }
        debug!(count = records.len(), "Plugin catalog loaded");
        Ok(())
    }

    /// Returns a copy of the record for `name`.
    pub async fn get(&self, name: &str) -> Option<PluginRecord> {
        self.records.read().await.get(name).cloned()
    }

    /// Returns whether a record exists for `name`.
    pub async fn contains(&self, name: &str) -> bool {
        self.records.read().await.contains_key(name)
    }

    /// Returns all records, sorted by name.
    pub async fn list(&self) -> Vec<PluginRecord> {
        let mut records: Vec<PluginRecord> = self.records.read().await.values().cloned().collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        records
    }

    /// Upserts a record from discovered metadata.
    ///
    /// Existing records keep their lifecycle state and only refresh the
    /// self-described fields; new records start installed and inactive.
    pub async fn upsert_discovered(&self, meta: &PluginMetadata) -> AppResult<()> {
        let mut records = self.records.write().await;
        let record = records
            .entry(meta.name.clone())
            .or_insert_with(|| PluginRecord::new(&meta.name));

        record.version = meta.version.clone();
        record.description = meta.description.clone();
        record.author = meta.author.clone();
        record.dependencies = meta.dependencies.clone();
        record.is_installed = true;

        let snapshot = record.clone();
        drop(records);
        self.store.save(&snapshot).await
    }

    /// Applies `mutate` to the record for `name` and persists the result.
    async fn update(
        &self,
        name: &str,
        mutate: impl FnOnce(&mut PluginRecord),
    ) -> AppResult<PluginRecord> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(name)
            .ok_or_else(|| AppError::not_found(format!("Plugin '{name}' not found")))?;
        mutate(record);
        let snapshot = record.clone();
        drop(records);
        self.store.save(&snapshot).await?;
        Ok(snapshot)
    }

    /// Transitions the record to Active.
    pub async fn mark_active(&self, name: &str) -> AppResult<()> {
        self.update(name, |r| r.mark_active()).await.map(|_| ())
    }

    /// Transitions the record to Inactive.
    pub async fn mark_inactive(&self, name: &str) -> AppResult<()> {
        self.update(name, |r| r.mark_inactive()).await.map(|_| ())
    }

    /// Records an activation failure on the record.
    pub async fn mark_error(&self, name: &str, message: impl Into<String>) -> AppResult<()> {
        let message = message.into();
        self.update(name, move |r| r.mark_error(message))
            .await
            .map(|_| ())
    }

    /// Soft-removes a record whose source disappeared.
    pub async fn mark_missing(&self, name: &str) -> AppResult<()> {
        self.update(name, |r| r.mark_missing()).await.map(|_| ())
    }

    /// Hard-deletes the record. Only explicit removal reaches this.
    pub async fn remove(&self, name: &str) -> AppResult<()> {
        self.records.write().await.remove(name);
        self.store.delete(name).await
    }

    /// Returns whether every dependency of `name` is currently active.
    ///
    /// A missing record, or a record with no dependencies, follows the
    /// obvious reading: false and true respectively.
    pub async fn dependencies_satisfied(&self, name: &str) -> bool {
        let records = self.records.read().await;
        let Some(record) = records.get(name) else {
            return false;
        };
        record.dependencies.iter().all(|dep| {
            records
                .get(dep)
                .map(|r| r.is_running())
                .unwrap_or(false)
        })
    }

    /// Returns the dependencies of `name` that are missing or inactive.
    pub async fn unsatisfied_dependencies(&self, name: &str) -> Vec<String> {
        let records = self.records.read().await;
        let Some(record) = records.get(name) else {
            return Vec::new();
        };
        record
            .dependencies
            .iter()
            .filter(|dep| !records.get(*dep).map(|r| r.is_running()).unwrap_or(false))
            .cloned()
            .collect()
    }

    /// Computes catalog-wide counters. Hook counts are filled in by the
    /// manager, which owns the registry.
    pub async fn stats(&self) -> PluginStats {
        let records = self.records.read().await;
        let mut stats = PluginStats {
            total: records.len(),
            ..Default::default()
        };
        for record in records.values() {
            if record.is_active {
                stats.active += 1;
            } else {
                stats.inactive += 1;
            }
            if record.is_installed {
                stats.installed += 1;
            }
            if record.status == plughub_core::types::PluginStatus::Error {
                stats.error += 1;
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn catalog() -> PluginCatalog {
        PluginCatalog::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_upsert_preserves_lifecycle_state() {
        let catalog = catalog();
        let meta = PluginMetadata::new("metrics", "1.0.0");
        catalog.upsert_discovered(&meta).await.unwrap();
        catalog.mark_active("metrics").await.unwrap();

        // Re-sync with a newer version.
        let meta = PluginMetadata::new("metrics", "1.1.0");
        catalog.upsert_discovered(&meta).await.unwrap();

        let record = catalog.get("metrics").await.unwrap();
        assert_eq!(record.version, "1.1.0");
        assert!(record.is_active);
    }

    #[tokio::test]
    async fn test_dependencies_satisfied() {
        let catalog = catalog();
        catalog
            .upsert_discovered(&PluginMetadata::new("base", "1.0.0"))
            .await
            .unwrap();
        catalog
            .upsert_discovered(&PluginMetadata::new("ext", "1.0.0").with_dependency("base"))
            .await
            .unwrap();

        assert!(!catalog.dependencies_satisfied("ext").await);
        assert_eq!(catalog.unsatisfied_dependencies("ext").await, vec!["base"]);

        catalog.mark_active("base").await.unwrap();
        assert!(catalog.dependencies_satisfied("ext").await);
        assert!(catalog.unsatisfied_dependencies("ext").await.is_empty());
    }

    #[tokio::test]
    async fn test_stats_breakdown() {
        let catalog = catalog();
        for name in ["a", "b", "c"] {
            catalog
                .upsert_discovered(&PluginMetadata::new(name, "1.0.0"))
                .await
                .unwrap();
        }
        catalog.mark_active("a").await.unwrap();
        catalog.mark_error("b", "boom").await.unwrap();

        let stats = catalog.stats().await;
        assert_eq!(stats.total, 3);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.inactive, 2);
        assert_eq!(stats.error, 1);
        assert_eq!(stats.installed, 3);
    }

    #[tokio::test]
    async fn test_load_restores_from_store() {
        let store = Arc::new(MemoryStore::new());
        {
            let catalog = PluginCatalog::new(store.clone());
            catalog
                .upsert_discovered(&PluginMetadata::new("metrics", "1.0.0"))
                .await
                .unwrap();
        }

        let catalog = PluginCatalog::new(store);
        catalog.load().await.unwrap();
        assert!(catalog.contains("metrics").await);
    }
}
