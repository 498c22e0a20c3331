//! # Nacelle Core Module System Errors
//!
//! Defines error types specific to the module registry: resolution misses,
//! factory failures and shared-dependency seeding failures. Version parse
//! errors from [`version`](crate::module_registry::version) fold in via
//! `#[from]`.

use crate::module_registry::version::VersionError;

#[derive(Debug, thiserror::Error)]
pub enum ModuleSystemError {
    #[error("Cannot find module '{id}'")]
    ModuleNotFound { id: String },

    #[error("Factory for module '{id}' failed: {message}")]
    FactoryFailed { id: String, message: String },

    #[error("Version parsing error: {0}")]
    VersionParsing(#[from] VersionError),

    #[error("Seeding shared dependency '{name}' failed: {source}")]
    SeedFailed {
        name: String,
        #[source]
        source: Box<ModuleSystemError>,
    },
}

impl ModuleSystemError {
    /// Convenience constructor for factory failures.
    pub fn factory_failed(id: impl Into<String>, message: impl Into<String>) -> Self {
        ModuleSystemError::FactoryFailed {
            id: id.into(),
            message: message.into(),
        }
    }
}
