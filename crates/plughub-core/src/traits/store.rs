//! Durable plugin catalog contract.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::PluginRecord;

/// Persists [`PluginRecord`]s across process restarts.
///
/// The runtime does not dictate a schema beyond the record fields; any
/// durable key-value or relational backing works. All catalog mutations are
/// written through immediately so a restart observes the last state.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Loads every persisted record.
    async fn load_all(&self) -> AppResult<Vec<PluginRecord>>;

    /// Inserts or replaces the record with the same name.
    async fn save(&self, record: &PluginRecord) -> AppResult<()>;

    /// Deletes the record for `name`. Deleting an unknown name is not an
    /// error.
    async fn delete(&self, name: &str) -> AppResult<()>;
}
