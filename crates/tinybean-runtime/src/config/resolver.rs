//! Configuration resolver trait for layered overrides.
//!
//! # Architecture
//!
//! ```text
//! ConfigLoader.load()  →  ContainerConfig (base)
//!                              │
//!                              ▼
//!                     ConfigResolver.apply()
//!                              │
//!                              ▼
//!                     ContainerConfig (final)
//! ```

use super::ContainerConfig;

/// Trait for applying configuration overrides.
///
/// Separates config loading (file/env) from runtime overrides such as
/// CLI flags.
pub trait ConfigResolver {
    /// Applies overrides to the given configuration.
    ///
    /// Only values the resolver actually carries should be applied,
    /// preserving existing values for unspecified options.
    fn apply(&self, config: &mut ContainerConfig);
}

/// No-op resolver that makes no changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpResolver;

impl ConfigResolver for NoOpResolver {
    fn apply(&self, _config: &mut ContainerConfig) {}
}
