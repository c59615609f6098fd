//! Hook dispatcher — fires actions and applies filters with fault isolation.
//!
//! A failing callback never aborts the remaining callbacks or the caller:
//! the error is logged with the hook name and dispatch continues. For
//! filters, the failing callback's attempted mutation is discarded and the
//! previous value is kept, so a filter chain always produces a result.

use std::sync::{Arc, Mutex};

use tracing::{debug, error};

use super::callback::HookValue;
use super::registry::HookRegistry;

/// Pops the re-entrancy stack on every exit path, including errors.
struct StackGuard<'a> {
    stack: &'a Mutex<Vec<String>>,
}

impl Drop for StackGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut stack) = self.stack.lock() {
            stack.pop();
        }
    }
}

/// Dispatches hooks to the callbacks registered for them.
///
/// One dispatcher instance is threaded explicitly to anything that fires
/// hooks; there is no global state.
pub struct HookDispatcher {
    /// Hook registry.
    registry: Arc<HookRegistry>,
    /// Names of hooks currently firing, innermost last.
    current: Mutex<Vec<String>>,
}

impl HookDispatcher {
    /// Creates a new dispatcher over `registry`.
    pub fn new(registry: Arc<HookRegistry>) -> Self {
        Self {
            registry,
            current: Mutex::new(Vec::new()),
        }
    }

    /// Fires an action hook.
    ///
    /// Unknown hook names are a no-op. Callbacks run in ascending
    /// `(priority, sequence)` order against a snapshot of the entry list;
    /// each receives `args` truncated to its registered `max_args`.
    pub async fn fire_action(&self, hook: &str, args: &[HookValue]) {
        let entries = self.registry.action_snapshot(hook).await;
        if entries.is_empty() {
            return;
        }

        debug!(hook = %hook, callbacks = entries.len(), "Firing action");

        self.push_current(hook);
        let _guard = StackGuard {
            stack: &self.current,
        };

        for (max_args, callback) in entries {
            if let Err(e) = callback.call(clip(args, max_args)).await {
                error!(hook = %hook, error = %e, "Action callback failed, continuing");
            }
        }
    }

    /// Applies a filter hook, threading `value` through each callback.
    ///
    /// Unknown hook names return `value` unchanged. A callback receives
    /// `(value, extra args)` truncated to its `max_args` (the value counts
    /// as the first argument); its return value becomes the input to the
    /// next callback. On error the previous value is kept.
    pub async fn apply_filter(
        &self,
        hook: &str,
        value: HookValue,
        args: &[HookValue],
    ) -> HookValue {
        let entries = self.registry.filter_snapshot(hook).await;
        if entries.is_empty() {
            return value;
        }

        debug!(hook = %hook, callbacks = entries.len(), "Applying filter");

        self.push_current(hook);
        let _guard = StackGuard {
            stack: &self.current,
        };

        let mut value = value;
        for (max_args, callback) in entries {
            // The value is the first accepted argument, so only
            // max_args - 1 extras are passed through.
            let extras = if max_args == 0 {
                args
            } else {
                clip(args, max_args.saturating_sub(1))
            };
            match callback.call(value.clone(), extras).await {
                Ok(next) => value = next,
                Err(e) => {
                    error!(hook = %hook, error = %e, "Filter callback failed, keeping previous value");
                }
            }
        }

        value
    }

    /// Returns the hook currently firing (top of the re-entrancy stack).
    ///
    /// The stack is shared across every task firing through this dispatcher,
    /// so under concurrent fires the answer may reflect another task's
    /// in-flight hook. Reliable only within a single dispatch chain.
    pub fn current_hook(&self) -> Option<String> {
        self.current
            .lock()
            .ok()
            .and_then(|stack| stack.last().cloned())
    }

    /// Returns whether `hook` is anywhere on the re-entrancy stack.
    ///
    /// Plugin callbacks use this to guard against firing a hook from inside
    /// itself. Like [`current_hook`](Self::current_hook), the stack is
    /// dispatcher-wide: a concurrent fire in another task can make this
    /// return `true` for a hook the calling task never entered.
    pub fn is_firing(&self, hook: &str) -> bool {
        self.current
            .lock()
            .map(|stack| stack.iter().any(|h| h == hook))
            .unwrap_or(false)
    }

    /// Returns a reference to the hook registry.
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }

    fn push_current(&self, hook: &str) {
        if let Ok(mut stack) = self.current.lock() {
            stack.push(hook.to_string());
        }
    }
}

impl std::fmt::Debug for HookDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookDispatcher").finish()
    }
}

/// Truncates `args` to `max`; `max == 0` means no limit.
fn clip(args: &[HookValue], max: usize) -> &[HookValue] {
    if max == 0 || args.len() <= max {
        args
    } else {
        &args[..max]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::callback::{action_fn, filter_fn};
    use plughub_core::AppError;
    use serde_json::json;

    fn setup() -> (Arc<HookRegistry>, HookDispatcher) {
        let registry = Arc::new(HookRegistry::new());
        let dispatcher = HookDispatcher::new(registry.clone());
        (registry, dispatcher)
    }

    #[tokio::test]
    async fn test_fire_unknown_hook_is_noop() {
        let (_registry, dispatcher) = setup();
        dispatcher.fire_action("nope", &[]).await;
        assert!(dispatcher.current_hook().is_none());
    }

    #[tokio::test]
    async fn test_priority_order_with_sequence_tiebreak() {
        let (registry, dispatcher) = setup();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for (label, priority) in [("A", 10), ("B", 5), ("C", 10)] {
            let seen = seen.clone();
            registry
                .register_action(
                    "greet",
                    action_fn(move |_| {
                        seen.lock().unwrap().push(label);
                        Ok(())
                    }),
                    priority,
                    1,
                )
                .await;
        }

        dispatcher.fire_action("greet", &[]).await;
        // Priority 5 first, then the two priority-10 entries in
        // registration order.
        assert_eq!(*seen.lock().unwrap(), vec!["B", "A", "C"]);
    }

    #[tokio::test]
    async fn test_action_fault_isolation() {
        let (registry, dispatcher) = setup();
        let seen = Arc::new(Mutex::new(Vec::new()));

        registry
            .register_action(
                "boot",
                action_fn(|_| Err(AppError::callback("first one breaks"))),
                5,
                1,
            )
            .await;
        let after = seen.clone();
        registry
            .register_action(
                "boot",
                action_fn(move |_| {
                    after.lock().unwrap().push("ran");
                    Ok(())
                }),
                10,
                1,
            )
            .await;

        dispatcher.fire_action("boot", &[]).await;
        assert_eq!(*seen.lock().unwrap(), vec!["ran"]);
    }

    #[tokio::test]
    async fn test_filter_identity_on_unknown_hook() {
        let (_registry, dispatcher) = setup();
        let value = json!({"title": "hello"});
        let out = dispatcher.apply_filter("missing", value.clone(), &[]).await;
        assert_eq!(out, value);
    }

    #[tokio::test]
    async fn test_filter_chain_composes_in_priority_order() {
        let (registry, dispatcher) = setup();

        registry
            .register_filter(
                "title",
                filter_fn(|v, _| Ok(json!(format!("{}!", v.as_str().unwrap_or_default())))),
                20,
                1,
            )
            .await;
        registry
            .register_filter(
                "title",
                filter_fn(|v, _| Ok(json!(v.as_str().unwrap_or_default().to_uppercase()))),
                10,
                1,
            )
            .await;

        // f2(f1(v)): uppercase at 10 runs before the bang at 20.
        let out = dispatcher.apply_filter("title", json!("hi"), &[]).await;
        assert_eq!(out, json!("HI!"));
    }

    #[tokio::test]
    async fn test_filter_error_keeps_previous_value() {
        let (registry, dispatcher) = setup();

        registry
            .register_filter("n", filter_fn(|v, _| Ok(json!(v.as_i64().unwrap() + 1))), 5, 1)
            .await;
        registry
            .register_filter(
                "n",
                filter_fn(|_, _| Err(AppError::callback("refuses to count"))),
                10,
                1,
            )
            .await;
        registry
            .register_filter("n", filter_fn(|v, _| Ok(json!(v.as_i64().unwrap() * 10))), 15, 1)
            .await;

        // 1 -> 2 -> (error, keep 2) -> 20
        let out = dispatcher.apply_filter("n", json!(1), &[]).await;
        assert_eq!(out, json!(20));
    }

    #[tokio::test]
    async fn test_max_args_truncation() {
        let (registry, dispatcher) = setup();
        let seen = Arc::new(Mutex::new(0usize));

        let count = seen.clone();
        registry
            .register_action(
                "evt",
                action_fn(move |args| {
                    *count.lock().unwrap() = args.len();
                    Ok(())
                }),
                10,
                2,
            )
            .await;

        dispatcher
            .fire_action("evt", &[json!(1), json!(2), json!(3)])
            .await;
        assert_eq!(*seen.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_filter_extras_truncated_after_value() {
        let (registry, dispatcher) = setup();
        let seen = Arc::new(Mutex::new(0usize));

        let count = seen.clone();
        registry
            .register_filter(
                "fmt",
                filter_fn(move |v, extras| {
                    *count.lock().unwrap() = extras.len();
                    Ok(v)
                }),
                10,
                2,
            )
            .await;

        dispatcher
            .apply_filter("fmt", json!("x"), &[json!(1), json!(2), json!(3)])
            .await;
        // max_args 2 = the value plus one extra.
        assert_eq!(*seen.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_reentrancy_stack_visible_during_fire() {
        let registry = Arc::new(HookRegistry::new());
        let dispatcher = Arc::new(HookDispatcher::new(registry.clone()));

        let inner = dispatcher.clone();
        let observed = Arc::new(Mutex::new((None, false)));
        let slot = observed.clone();
        registry
            .add_action(
                "boot",
                action_fn(move |_| {
                    *slot.lock().unwrap() = (inner.current_hook(), inner.is_firing("boot"));
                    Ok(())
                }),
            )
            .await;

        dispatcher.fire_action("boot", &[]).await;

        let (current, firing) = observed.lock().unwrap().clone();
        assert_eq!(current.as_deref(), Some("boot"));
        assert!(firing);
        // Stack is popped once the fire completes.
        assert!(dispatcher.current_hook().is_none());
        assert!(!dispatcher.is_firing("boot"));
    }
}
