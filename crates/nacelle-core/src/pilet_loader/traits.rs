use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::capability::api::PiletApi;
use crate::pilet_loader::descriptor::{PiletDescriptor, PiletFeed};
use crate::pilet_loader::error::PiletSystemError;

/// The lifecycle surface of a pilet's executed content.
///
/// A loader evaluates the pilet's content inside its own scope and yields an
/// implementation of this trait; the pipeline then drives it with the
/// capability surface composed for that pilet.
#[async_trait]
pub trait Pilet: Send + Sync {
    /// Integrates the pilet into the host. Runs once, with the pilet's own
    /// composed capability surface.
    async fn setup(&self, api: PiletApi) -> Result<(), PiletSystemError>;

    /// Releases everything `setup` established. The default implementation
    /// does nothing.
    async fn teardown(&self, _api: PiletApi) -> Result<(), PiletSystemError> {
        Ok(())
    }
}

/// Injected collaborator that fetches and evaluates one pilet's content.
///
/// The core never talks to a transport itself; fetching and evaluation are
/// abstract I/O behind this seam.
#[async_trait]
pub trait PiletLoader: Send + Sync {
    async fn load(&self, descriptor: &PiletDescriptor) -> Result<Arc<dyn Pilet>, PiletSystemError>;
}

/// Injected collaborator that produces the list of available pilets.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_pilets(&self) -> Result<Vec<PiletDescriptor>, PiletSystemError>;
}

/// Loader over a fixed set of pre-built pilet instances.
///
/// This is how statically linked in-tree pilets are wired into the host, and
/// what tests use in place of a real transport.
#[derive(Default)]
pub struct StaticPiletLoader {
    pilets: RwLock<HashMap<String, Arc<dyn Pilet>>>,
}

impl StaticPiletLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pre-built instance under a pilet name.
    pub fn insert(&self, name: &str, pilet: Arc<dyn Pilet>) {
        self.pilets
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_string(), pilet);
    }

    /// Builder-style registration.
    pub fn with(self, name: &str, pilet: Arc<dyn Pilet>) -> Self {
        self.insert(name, pilet);
        self
    }
}

#[async_trait]
impl PiletLoader for StaticPiletLoader {
    async fn load(&self, descriptor: &PiletDescriptor) -> Result<Arc<dyn Pilet>, PiletSystemError> {
        self.pilets
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&descriptor.name)
            .cloned()
            .ok_or_else(|| {
                PiletSystemError::fetch_failure(
                    &descriptor.name,
                    "no statically registered pilet under this name",
                )
            })
    }
}

/// Feed source reading a JSON feed file from disk.
pub struct FileFeedSource {
    path: PathBuf,
}

impl FileFeedSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl FeedSource for FileFeedSource {
    async fn fetch_pilets(&self) -> Result<Vec<PiletDescriptor>, PiletSystemError> {
        let json = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| PiletSystemError::FeedFailure {
                message: format!("cannot read feed file '{}'", self.path.display()),
                source: Some(Box::new(e)),
            })?;
        let feed = PiletFeed::parse(&json)?;
        log::info!(
            "feed '{}' lists {} pilets",
            self.path.display(),
            feed.items.len()
        );
        Ok(feed.items)
    }
}

/// Feed source over an in-memory descriptor list.
#[derive(Default)]
pub struct StaticFeedSource {
    items: Vec<PiletDescriptor>,
}

impl StaticFeedSource {
    pub fn new(items: Vec<PiletDescriptor>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl FeedSource for StaticFeedSource {
    async fn fetch_pilets(&self) -> Result<Vec<PiletDescriptor>, PiletSystemError> {
        Ok(self.items.clone())
    }
}
