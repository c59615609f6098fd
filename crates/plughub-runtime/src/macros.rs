//! Convenience macros for plugin development.

/// Macro for building [`PluginMetadata`](crate::plugin::PluginMetadata)
/// without chaining builder calls.
///
/// # Example
/// ```rust,ignore
/// let meta = plugin_metadata!(
///     name: "metrics",
///     version: "1.0.0",
///     description: "Request metrics collector",
///     author: "Ops Team"
/// );
/// ```
#[macro_export]
macro_rules! plugin_metadata {
    (
        name: $name:expr,
        version: $version:expr
    ) => {
        $crate::prelude::PluginMetadata::new($name, $version)
    };
    (
        name: $name:expr,
        version: $version:expr,
        description: $desc:expr,
        author: $author:expr
    ) => {
        $crate::prelude::PluginMetadata::new($name, $version)
            .with_description($desc)
            .with_author($author)
    };
    (
        name: $name:expr,
        version: $version:expr,
        description: $desc:expr,
        author: $author:expr,
        dependencies: [$($dep:expr),* $(,)?]
    ) => {{
        let meta = $crate::prelude::PluginMetadata::new($name, $version)
            .with_description($desc)
            .with_author($author);
        $(
            let meta = meta.with_dependency($dep);
        )*
        meta
    }};
}

/// Macro for building a slice of [`HookValue`](crate::hooks::callback::HookValue)
/// arguments from anything `serde_json::json!` accepts.
///
/// # Example
/// ```rust,ignore
/// dispatcher.fire_action("file.uploaded", &hook_args!["report.pdf", 1024]).await;
/// ```
#[macro_export]
macro_rules! hook_args {
    [$($value:expr),* $(,)?] => {
        [$(::serde_json::json!($value)),*]
    };
}
