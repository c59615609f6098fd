//! Hook dispatch engine: named extension points with priority-ordered
//! callback chains.
//!
//! Actions are invoked for side effect; filters thread a value through each
//! callback in turn. The two tables are independent: the same hook name may
//! exist in both without collision.

pub mod callback;
pub mod dispatcher;
pub mod registrar;
pub mod registry;

pub use callback::{ActionCallback, FilterCallback, HookValue, action_fn, filter_fn};
pub use dispatcher::HookDispatcher;
pub use registrar::HookRegistrar;
pub use registry::{DEFAULT_MAX_ARGS, DEFAULT_PRIORITY, HookRegistry};
