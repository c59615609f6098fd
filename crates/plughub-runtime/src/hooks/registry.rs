//! Hook registry — priority-ordered action and filter tables.
//!
//! Entries for a hook name are always iterated in ascending
//! `(priority, sequence)` order, where `sequence` is a monotone registration
//! counter. Execution order is therefore deterministic and stable across
//! repeated fires for an unchanged registration set.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;
use tracing::debug;

use super::callback::{ActionCallback, FilterCallback};

/// Priority used when the caller does not care about ordering.
pub const DEFAULT_PRIORITY: i32 = 10;

/// Argument count passed to callbacks that do not opt into more.
pub const DEFAULT_MAX_ARGS: usize = 1;

/// One registered callback on a hook.
pub(crate) struct Entry<C: ?Sized> {
    /// Ordering key; lower runs first.
    pub priority: i32,
    /// Registration-order tie-break.
    pub sequence: u64,
    /// Number of arguments the callback accepts; 0 means unlimited.
    pub max_args: usize,
    /// Plugin that registered this entry, if any.
    pub owner: Option<String>,
    /// The callback itself.
    pub callback: Arc<C>,
}

/// One of the two hook tables (actions or filters).
struct Table<C: ?Sized> {
    hooks: HashMap<String, Vec<Entry<C>>>,
}

impl<C: ?Sized> Table<C> {
    fn new() -> Self {
        Self {
            hooks: HashMap::new(),
        }
    }

    fn insert(&mut self, hook: &str, entry: Entry<C>) {
        let entries = self.hooks.entry(hook.to_string()).or_default();
        entries.push(entry);
        entries.sort_by_key(|e| (e.priority, e.sequence));
    }

    /// Removes the entry matching by callback identity and priority.
    /// Empty priority buckets and empty hooks are pruned.
    fn remove(&mut self, hook: &str, callback: &Arc<C>, priority: i32) -> bool {
        let Some(entries) = self.hooks.get_mut(hook) else {
            return false;
        };

        let Some(index) = entries
            .iter()
            .position(|e| e.priority == priority && Arc::ptr_eq(&e.callback, callback))
        else {
            return false;
        };

        entries.remove(index);
        if entries.is_empty() {
            self.hooks.remove(hook);
        }
        true
    }

    fn remove_all(&mut self, hook: &str, priority: Option<i32>) {
        match priority {
            Some(p) => {
                if let Some(entries) = self.hooks.get_mut(hook) {
                    entries.retain(|e| e.priority != p);
                    if entries.is_empty() {
                        self.hooks.remove(hook);
                    }
                }
            }
            None => {
                self.hooks.remove(hook);
            }
        }
    }

    fn remove_owner(&mut self, owner: &str) {
        for entries in self.hooks.values_mut() {
            entries.retain(|e| e.owner.as_deref() != Some(owner));
        }
        self.hooks.retain(|_, entries| !entries.is_empty());
    }

    fn contains(&self, hook: &str, callback: Option<&Arc<C>>) -> bool {
        let Some(entries) = self.hooks.get(hook) else {
            return false;
        };
        match callback {
            None => true,
            Some(cb) => entries.iter().any(|e| Arc::ptr_eq(&e.callback, cb)),
        }
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.hooks.keys().cloned().collect();
        names.sort();
        names
    }

    fn count(&self, hook: &str) -> usize {
        self.hooks.get(hook).map(|e| e.len()).unwrap_or(0)
    }

    /// Clones the ordered `(max_args, callback)` pairs for a hook so the
    /// dispatcher can invoke them without holding the table lock.
    fn snapshot(&self, hook: &str) -> Vec<(usize, Arc<C>)> {
        self.hooks
            .get(hook)
            .map(|entries| {
                entries
                    .iter()
                    .map(|e| (e.max_args, e.callback.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Process-wide table of named extension points.
///
/// Actions and filters live in independent tables: registering the same name
/// in both addresses different entries. Duplicate registration of the same
/// callback is allowed and will fire twice.
pub struct HookRegistry {
    actions: RwLock<Table<dyn ActionCallback>>,
    filters: RwLock<Table<dyn FilterCallback>>,
    sequence: AtomicU64,
}

impl HookRegistry {
    /// Creates a new empty hook registry.
    pub fn new() -> Self {
        Self {
            actions: RwLock::new(Table::new()),
            filters: RwLock::new(Table::new()),
            sequence: AtomicU64::new(0),
        }
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed)
    }

    /// Registers an action callback. Always succeeds.
    pub async fn register_action(
        &self,
        hook: &str,
        callback: Arc<dyn ActionCallback>,
        priority: i32,
        max_args: usize,
    ) {
        self.register_action_owned(hook, callback, priority, max_args, None)
            .await;
    }

    /// Registers an action callback with the default priority and arg count.
    pub async fn add_action(&self, hook: &str, callback: Arc<dyn ActionCallback>) {
        self.register_action(hook, callback, DEFAULT_PRIORITY, DEFAULT_MAX_ARGS)
            .await;
    }

    pub(crate) async fn register_action_owned(
        &self,
        hook: &str,
        callback: Arc<dyn ActionCallback>,
        priority: i32,
        max_args: usize,
        owner: Option<String>,
    ) {
        let entry = Entry {
            priority,
            sequence: self.next_sequence(),
            max_args,
            owner: owner.clone(),
            callback,
        };
        self.actions.write().await.insert(hook, entry);
        debug!(hook = %hook, priority, owner = owner.as_deref().unwrap_or("-"), "Action registered");
    }

    /// Registers a filter callback. Always succeeds.
    pub async fn register_filter(
        &self,
        hook: &str,
        callback: Arc<dyn FilterCallback>,
        priority: i32,
        max_args: usize,
    ) {
        self.register_filter_owned(hook, callback, priority, max_args, None)
            .await;
    }

    /// Registers a filter callback with the default priority and arg count.
    pub async fn add_filter(&self, hook: &str, callback: Arc<dyn FilterCallback>) {
        self.register_filter(hook, callback, DEFAULT_PRIORITY, DEFAULT_MAX_ARGS)
            .await;
    }

    pub(crate) async fn register_filter_owned(
        &self,
        hook: &str,
        callback: Arc<dyn FilterCallback>,
        priority: i32,
        max_args: usize,
        owner: Option<String>,
    ) {
        let entry = Entry {
            priority,
            sequence: self.next_sequence(),
            max_args,
            owner: owner.clone(),
            callback,
        };
        self.filters.write().await.insert(hook, entry);
        debug!(hook = %hook, priority, owner = owner.as_deref().unwrap_or("-"), "Filter registered");
    }

    /// Removes the action entry matching `callback` (by identity) at
    /// `priority`. Returns whether a removal occurred.
    pub async fn deregister_action(
        &self,
        hook: &str,
        callback: &Arc<dyn ActionCallback>,
        priority: i32,
    ) -> bool {
        let removed = self.actions.write().await.remove(hook, callback, priority);
        if removed {
            debug!(hook = %hook, priority, "Action deregistered");
        }
        removed
    }

    /// Removes the filter entry matching `callback` (by identity) at
    /// `priority`. Returns whether a removal occurred.
    pub async fn deregister_filter(
        &self,
        hook: &str,
        callback: &Arc<dyn FilterCallback>,
        priority: i32,
    ) -> bool {
        let removed = self.filters.write().await.remove(hook, callback, priority);
        if removed {
            debug!(hook = %hook, priority, "Filter deregistered");
        }
        removed
    }

    /// Removes every action on `hook`, or only those at `priority`.
    pub async fn remove_all_actions(&self, hook: &str, priority: Option<i32>) {
        self.actions.write().await.remove_all(hook, priority);
    }

    /// Removes every filter on `hook`, or only those at `priority`.
    pub async fn remove_all_filters(&self, hook: &str, priority: Option<i32>) {
        self.filters.write().await.remove_all(hook, priority);
    }

    /// Removes every entry, in both tables, registered by `owner`.
    pub async fn deregister_owner(&self, owner: &str) {
        self.actions.write().await.remove_owner(owner);
        self.filters.write().await.remove_owner(owner);
        debug!(plugin = %owner, "All hook entries deregistered for plugin");
    }

    /// Returns whether `hook` has any action, or the given one specifically.
    pub async fn has_action(&self, hook: &str, callback: Option<&Arc<dyn ActionCallback>>) -> bool {
        self.actions.read().await.contains(hook, callback)
    }

    /// Returns whether `hook` has any filter, or the given one specifically.
    pub async fn has_filter(&self, hook: &str, callback: Option<&Arc<dyn FilterCallback>>) -> bool {
        self.filters.read().await.contains(hook, callback)
    }

    /// Returns all registered action hook names, sorted.
    pub async fn action_names(&self) -> Vec<String> {
        self.actions.read().await.names()
    }

    /// Returns all registered filter hook names, sorted.
    pub async fn filter_names(&self) -> Vec<String> {
        self.filters.read().await.names()
    }

    /// Returns the number of action entries on `hook`.
    pub async fn action_count(&self, hook: &str) -> usize {
        self.actions.read().await.count(hook)
    }

    /// Returns the number of filter entries on `hook`.
    pub async fn filter_count(&self, hook: &str) -> usize {
        self.filters.read().await.count(hook)
    }

    pub(crate) async fn action_snapshot(&self, hook: &str) -> Vec<(usize, Arc<dyn ActionCallback>)> {
        self.actions.read().await.snapshot(hook)
    }

    pub(crate) async fn filter_snapshot(&self, hook: &str) -> Vec<(usize, Arc<dyn FilterCallback>)> {
        self.filters.read().await.snapshot(hook)
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::callback::action_fn;

    fn noop() -> Arc<dyn ActionCallback> {
        action_fn(|_| Ok(()))
    }

    #[tokio::test]
    async fn test_register_and_introspect() {
        let registry = HookRegistry::new();
        let cb = noop();
        registry.add_action("user.created", cb.clone()).await;

        assert!(registry.has_action("user.created", None).await);
        assert!(registry.has_action("user.created", Some(&cb)).await);
        assert!(!registry.has_action("user.deleted", None).await);
        assert_eq!(registry.action_names().await, vec!["user.created"]);
    }

    #[tokio::test]
    async fn test_action_and_filter_tables_are_independent() {
        let registry = HookRegistry::new();
        registry.add_action("render", noop()).await;

        assert!(registry.has_action("render", None).await);
        assert!(!registry.has_filter("render", None).await);
    }

    #[tokio::test]
    async fn test_duplicate_registration_allowed() {
        let registry = HookRegistry::new();
        let cb = noop();
        registry.add_action("boot", cb.clone()).await;
        registry.add_action("boot", cb.clone()).await;

        assert_eq!(registry.action_count("boot").await, 2);
    }

    #[tokio::test]
    async fn test_deregister_matches_identity_and_priority() {
        let registry = HookRegistry::new();
        let first = noop();
        let second = noop();
        registry.register_action("boot", first.clone(), 10, 1).await;
        registry.register_action("boot", second.clone(), 10, 1).await;

        // Wrong priority: no removal.
        assert!(!registry.deregister_action("boot", &first, 20).await);
        assert!(registry.deregister_action("boot", &first, 10).await);
        assert_eq!(registry.action_count("boot").await, 1);
        assert!(registry.has_action("boot", Some(&second)).await);

        // Removing the last entry removes the hook name entirely.
        assert!(registry.deregister_action("boot", &second, 10).await);
        assert!(registry.action_names().await.is_empty());
    }

    #[tokio::test]
    async fn test_remove_all_actions_by_priority() {
        let registry = HookRegistry::new();
        registry.register_action("boot", noop(), 5, 1).await;
        registry.register_action("boot", noop(), 10, 1).await;
        registry.register_action("boot", noop(), 10, 1).await;

        registry.remove_all_actions("boot", Some(10)).await;
        assert_eq!(registry.action_count("boot").await, 1);

        registry.remove_all_actions("boot", None).await;
        assert!(!registry.has_action("boot", None).await);
    }

    #[tokio::test]
    async fn test_deregister_owner_clears_both_tables() {
        let registry = HookRegistry::new();
        registry
            .register_action_owned("boot", noop(), 10, 1, Some("metrics".into()))
            .await;
        registry
            .register_filter_owned(
                "title",
                crate::hooks::callback::filter_fn(|v, _| Ok(v)),
                10,
                1,
                Some("metrics".into()),
            )
            .await;
        registry.add_action("boot", noop()).await;

        registry.deregister_owner("metrics").await;

        // The unowned entry survives; the owned ones are gone.
        assert_eq!(registry.action_count("boot").await, 1);
        assert!(!registry.has_filter("title", None).await);
    }
}
