use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::host::error::Error;
use crate::pilet_loader::strategy::LoadingStrategy;

/// Host configuration, loadable from a TOML or JSON file.
///
/// Everything is optional; defaults match an unconfigured host (parallel
/// loading, no feed file, no setup timeout).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Scheduling strategy for the pilet list.
    pub strategy: LoadingStrategy,

    /// Path of the pilet feed file.
    pub feed: Option<PathBuf>,

    /// Upper bound for each pilet's setup, in milliseconds. Absent means no
    /// bound, preserving the behavior of a host that never times out.
    pub setup_timeout_ms: Option<u64>,
}

impl HostConfig {
    /// Parses a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|e| Error::Config {
            message: "invalid JSON host configuration".to_string(),
            source: Some(Box::new(e)),
        })
    }

    /// Parses a configuration from TOML.
    #[cfg(feature = "toml-config")]
    pub fn from_toml_str(input: &str) -> Result<Self, Error> {
        toml::from_str(input).map_err(|e| Error::Config {
            message: "invalid TOML host configuration".to_string(),
            source: Some(Box::new(e)),
        })
    }

    /// Loads a configuration file, dispatching on the file extension.
    pub async fn load(path: &Path) -> Result<Self, Error> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::Config {
                message: format!("cannot read config file '{}'", path.display()),
                source: Some(Box::new(e)),
            })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            #[cfg(feature = "toml-config")]
            Some("toml") => Self::from_toml_str(&contents),
            other => Err(Error::Config {
                message: format!(
                    "unsupported config format '{}' for '{}'",
                    other.unwrap_or("<none>"),
                    path.display()
                ),
                source: None,
            }),
        }
    }

    /// The configured setup timeout as a `Duration`.
    pub fn setup_timeout(&self) -> Option<Duration> {
        self.setup_timeout_ms.map(Duration::from_millis)
    }
}
