//! # Ampere Config
//!
//! Layered configuration loading and validation for the Ampere cache layer.
//! Sources are merged in order: defaults, environment-specific files, local
//! overrides, then `AMPERE_*` environment variables.

pub mod app_config;
pub mod loader;
pub mod validation;

pub use app_config::*;
pub use loader::*;
pub use validation::*;
