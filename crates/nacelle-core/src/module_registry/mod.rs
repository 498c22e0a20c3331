//! # Nacelle Core Module Registry
//!
//! This module provides the versioned module table at the heart of the host:
//! a process-wide (per host instance) mapping from module name, optionally
//! qualified with a version, to a registration that can produce the module's
//! exported value on demand.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`version`]**: Parsing and matching of semantic versions and version
//!   requirement ranges.
//! - **[`exports`]**: The shape of exported module values: type-erased
//!   content, default-export synthesis, and the sync/async factory split.
//! - **[`registry`]**: The [`ModuleRegistry`] itself: registration,
//!   two-stage resolution (exact match, then range search), non-suspending
//!   reads and single-flight asynchronous imports.
//! - **[`injector`]**: Seeding of host-provided shared dependencies into the
//!   registry before any pilet loads.
//! - **[`error`]**: Error types (e.g. [`ModuleSystemError`](error::ModuleSystemError))
//!   for module operations.

pub mod error;
pub mod exports;
pub mod injector;
pub mod registry;
pub mod version;

use std::collections::HashMap;

pub use error::ModuleSystemError;
pub use exports::{ExportedValue, ModuleExports, ModuleFactory, SharedValue};
pub use injector::seed;
pub use registry::{ModuleRegistry, ResolvedModule};
pub use version::{satisfies, validate, VersionError, VersionRange};

/// Host-provided mapping of shared module name to implementation.
pub type SharedDependencies = HashMap<String, SharedValue>;

// Test module declaration
#[cfg(test)]
mod tests;
