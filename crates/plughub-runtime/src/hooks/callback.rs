//! Callback traits for action and filter hooks.

use std::sync::Arc;

use async_trait::async_trait;

use plughub_core::AppResult;

/// Payload value carried through hooks.
///
/// The engine is agnostic to what callbacks put in here; `serde_json::Value`
/// gives plugins a common currency without the registry interpreting it.
pub type HookValue = serde_json::Value;

/// A callback registered on an action hook. Invoked for side effect.
#[async_trait]
pub trait ActionCallback: Send + Sync {
    /// Runs the callback with the (already truncated) argument list.
    async fn call(&self, args: &[HookValue]) -> AppResult<()>;
}

/// A callback registered on a filter hook. Transforms and returns a value.
#[async_trait]
pub trait FilterCallback: Send + Sync {
    /// Receives the current value plus any extra arguments and returns the
    /// value to hand to the next callback in the chain.
    async fn call(&self, value: HookValue, args: &[HookValue]) -> AppResult<HookValue>;
}

struct FnAction<F>(F);

#[async_trait]
impl<F> ActionCallback for FnAction<F>
where
    F: Fn(&[HookValue]) -> AppResult<()> + Send + Sync,
{
    async fn call(&self, args: &[HookValue]) -> AppResult<()> {
        (self.0)(args)
    }
}

struct FnFilter<F>(F);

#[async_trait]
impl<F> FilterCallback for FnFilter<F>
where
    F: Fn(HookValue, &[HookValue]) -> AppResult<HookValue> + Send + Sync,
{
    async fn call(&self, value: HookValue, args: &[HookValue]) -> AppResult<HookValue> {
        (self.0)(value, args)
    }
}

/// Wraps a plain closure as an [`ActionCallback`].
pub fn action_fn<F>(f: F) -> Arc<dyn ActionCallback>
where
    F: Fn(&[HookValue]) -> AppResult<()> + Send + Sync + 'static,
{
    Arc::new(FnAction(f))
}

/// Wraps a plain closure as a [`FilterCallback`].
pub fn filter_fn<F>(f: F) -> Arc<dyn FilterCallback>
where
    F: Fn(HookValue, &[HookValue]) -> AppResult<HookValue> + Send + Sync + 'static,
{
    Arc::new(FnFilter(f))
}
