//! # Nacelle Core Pilet System Errors
//!
//! Defines error types specific to pilet loading. Fetch and setup failures
//! are recorded per pilet in the load outcome rather than propagated; feed
//! failures abort discovery since without a descriptor list there is no
//! pilet identity to record a failure against.

use crate::module_registry::error::ModuleSystemError;

#[derive(Debug, thiserror::Error)]
pub enum PiletSystemError {
    #[error("Failed to fetch pilet feed: {message}")]
    FeedFailure {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Failed to fetch pilet '{pilet}': {message}")]
    FetchFailure { pilet: String, message: String },

    #[error("Setup of pilet '{pilet}' failed: {message}")]
    SetupFailure { pilet: String, message: String },

    #[error("Setup of pilet '{pilet}' timed out after {timeout_ms} ms")]
    SetupTimeout { pilet: String, timeout_ms: u64 },

    #[error("Teardown of pilet '{pilet}' failed: {message}")]
    TeardownFailure { pilet: String, message: String },

    #[error("Pilet '{pilet}' is not available for activation")]
    UnknownPilet { pilet: String },

    #[error("Invalid pilet feed: {0}")]
    InvalidFeed(#[from] serde_json::Error),

    #[error("Module system error: {0}")]
    ModuleSystem(#[from] ModuleSystemError),
}

impl PiletSystemError {
    /// Convenience constructor for content-fetch failures.
    pub fn fetch_failure(pilet: impl Into<String>, message: impl Into<String>) -> Self {
        PiletSystemError::FetchFailure {
            pilet: pilet.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for setup failures.
    pub fn setup_failure(pilet: impl Into<String>, message: impl Into<String>) -> Self {
        PiletSystemError::SetupFailure {
            pilet: pilet.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for teardown failures.
    pub fn teardown_failure(pilet: impl Into<String>, message: impl Into<String>) -> Self {
        PiletSystemError::TeardownFailure {
            pilet: pilet.into(),
            message: message.into(),
        }
    }
}
