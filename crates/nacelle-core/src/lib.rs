//! # Nacelle Core
//!
//! Core library for the nacelle runtime plugin host. It discovers, fetches
//! and activates independently built, independently versioned plugin bundles
//! ("pilets") inside a long-lived host application, while multiplexing a set
//! of shared runtime modules between host and pilets.
//!
//! ## Subsystems
//!
//! - [`module_registry`]: the versioned module table, semver resolution and
//!   shared-dependency seeding.
//! - [`pilet_loader`]: pilet descriptors, the loading pipeline and its
//!   lifecycle hooks and scheduling strategies.
//! - [`capability`]: per-pilet capability surfaces composed from a chain of
//!   extension functions.
//! - [`host`]: the bootstrap entry point tying everything together, plus
//!   host configuration and the top-level error type.

pub mod capability;
pub mod host;
pub mod module_registry;
pub mod pilet_loader;

// Re-export key public types for easier use by the binary and pilets.
pub use capability::{ApiExtender, CapabilityComposer, PiletApi};
pub use host::config::HostConfig;
pub use host::error::{Error, HostLifecyclePhase, Result};
pub use host::{PluginHost, PluginHostBuilder};
pub use module_registry::exports::{ExportedValue, ModuleExports, ModuleFactory, SharedValue};
pub use module_registry::registry::ModuleRegistry;
pub use module_registry::version::VersionRange;
pub use module_registry::SharedDependencies;
pub use pilet_loader::descriptor::{PiletDescriptor, PiletFeed};
pub use pilet_loader::hooks::LifecycleHooks;
pub use pilet_loader::pipeline::{FailedPilet, LoadOutcome, LoadedPilet, PiletState};
pub use pilet_loader::strategy::LoadingStrategy;
pub use pilet_loader::traits::{FeedSource, Pilet, PiletLoader};
