//! # Nacelle Core Host
//!
//! The bootstrap entry point of the plugin host. [`PluginHost`] wires the
//! module registry, the capability composer and the pilet pipeline together
//! and drives the canonical startup sequence: seed shared dependencies,
//! fetch the descriptor feed, load pilets under the configured strategy and
//! hand the complete accounting back to the caller.
//!
//! Also home to host configuration ([`config`]), application constants
//! ([`constants`]) and the top-level error type ([`error`]).

pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod error;

pub use bootstrap::{PluginHost, PluginHostBuilder};
pub use config::HostConfig;
pub use error::{Error, HostLifecyclePhase, Result};

// Test module declaration
#[cfg(test)]
mod tests;
