//! # plughub-core
//!
//! Core crate for the Plughub extension runtime. Contains collaborator
//! traits, configuration schemas, the shared plugin data model, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other Plughub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
