use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::pilet_loader::error::PiletSystemError;

/// Metadata describing one discoverable pilet.
///
/// Produced by a feed, consumed read-only by the loading pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiletDescriptor {
    /// Unique pilet name within the feed.
    pub name: String,

    /// Exact version of this pilet build.
    pub version: String,

    /// Where the pilet's executable content can be fetched from.
    #[serde(default)]
    pub link: String,

    /// Subresource integrity hash for the content, if the feed provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrity: Option<String>,

    /// Loader selection key. Pilets built against a non-default bundle
    /// format carry a spec key that routes them to a matching custom loader.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<String>,

    /// Direct dependencies of the bundle: module name to version range.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub dependencies: HashMap<String, String>,

    /// Free-form per-pilet configuration forwarded by the feed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

impl PiletDescriptor {
    /// Creates a minimal descriptor.
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            link: String::new(),
            integrity: None,
            spec: None,
            dependencies: HashMap::new(),
            config: None,
        }
    }

    /// Sets the content link.
    pub fn with_link(mut self, link: &str) -> Self {
        self.link = link.to_string();
        self
    }

    /// Sets the loader selection key.
    pub fn with_spec(mut self, spec: &str) -> Self {
        self.spec = Some(spec.to_string());
        self
    }

    /// The registry key this pilet is published under once active.
    pub fn qualified_name(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }
}

/// Wire shapes a feed response may arrive in.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawFeed {
    Wrapped { items: Vec<PiletDescriptor> },
    Bare(Vec<PiletDescriptor>),
}

/// A parsed pilet feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PiletFeed {
    pub items: Vec<PiletDescriptor>,
}

impl PiletFeed {
    /// Parses a feed from JSON, accepting both the wrapped `{"items": []}`
    /// shape and a bare descriptor array.
    pub fn parse(json: &str) -> Result<Self, PiletSystemError> {
        let raw: RawFeed = serde_json::from_str(json)?;
        let items = match raw {
            RawFeed::Wrapped { items } => items,
            RawFeed::Bare(items) => items,
        };
        Ok(Self { items })
    }
}
