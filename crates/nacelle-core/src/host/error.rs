//! # Nacelle Core Host Errors
//!
//! Defines the top-level error type aggregating the subsystem errors, plus
//! the lifecycle phases used to tag failures during host startup and
//! shutdown.

use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::module_registry::error::ModuleSystemError;
use crate::pilet_loader::error::PiletSystemError;

/// Custom error type for the nacelle host
#[derive(Debug, ThisError)]
pub enum Error {
    /// Specific, typed module system error
    #[error("Module system error: {0}")]
    ModuleSystem(#[from] ModuleSystemError),

    /// Specific, typed pilet system error
    #[error("Pilet system error: {0}")]
    PiletSystem(#[from] PiletSystemError),

    /// Error occurring during a specific host lifecycle phase.
    #[error("Host lifecycle error during {phase:?}: {message}")]
    Lifecycle {
        phase: HostLifecyclePhase,
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },

    /// Configuration loading or parsing error.
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

impl Error {
    /// Tags a failure with the lifecycle phase it occurred in.
    pub fn lifecycle(phase: HostLifecyclePhase, message: impl Into<String>, source: Error) -> Self {
        Error::Lifecycle {
            phase,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Represents a specific phase in the host's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum HostLifecyclePhase {
    #[error("Seed")]
    Seed,
    #[error("Discover")]
    Discover,
    #[error("Load")]
    Load,
    #[error("Shutdown")]
    Shutdown,
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}
