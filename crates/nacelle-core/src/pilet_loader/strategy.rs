use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Scheduling policy governing how a whole pilet list is loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadingStrategy {
    /// All discovered pilets fetch concurrently; the load completes once
    /// every pilet has reached a terminal state.
    #[default]
    Parallel,
    /// Each pilet's whole pipeline completes before the next begins. Use
    /// when setup order matters, e.g. a later pilet importing a module an
    /// earlier pilet registers during its setup.
    Sequential,
    /// Pilets stay parked until something requests them explicitly.
    OnDemand,
}

impl fmt::Display for LoadingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadingStrategy::Parallel => write!(f, "parallel"),
            LoadingStrategy::Sequential => write!(f, "sequential"),
            LoadingStrategy::OnDemand => write!(f, "on-demand"),
        }
    }
}

impl FromStr for LoadingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parallel" => Ok(LoadingStrategy::Parallel),
            "sequential" => Ok(LoadingStrategy::Sequential),
            "on-demand" | "ondemand" => Ok(LoadingStrategy::OnDemand),
            other => Err(format!("unknown loading strategy '{other}'")),
        }
    }
}
