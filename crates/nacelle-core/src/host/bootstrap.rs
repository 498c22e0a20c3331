use std::sync::Arc;
use std::time::Duration;

use crate::capability::api::PiletApi;
use crate::capability::composer::{ApiExtender, CapabilityComposer};
use crate::host::config::HostConfig;
use crate::host::constants;
use crate::host::error::{Error, HostLifecyclePhase, Result};
use crate::module_registry::exports::SharedValue;
use crate::module_registry::registry::ModuleRegistry;
use crate::module_registry::{injector, SharedDependencies};
use crate::pilet_loader::descriptor::PiletDescriptor;
use crate::pilet_loader::hooks::LifecycleHooks;
use crate::pilet_loader::pipeline::{LoadOutcome, LoadedPilet, PiletPipeline, PiletState};
use crate::pilet_loader::strategy::LoadingStrategy;
use crate::pilet_loader::traits::{FeedSource, FileFeedSource, PiletLoader};

/// The assembled plugin host for one application instance.
///
/// Owns the module registry, the capability composer and the pilet pipeline.
/// Several hosts can coexist in one process; nothing here is a global.
pub struct PluginHost {
    registry: Arc<ModuleRegistry>,
    composer: Arc<CapabilityComposer>,
    pipeline: PiletPipeline,
    feed: Arc<dyn FeedSource>,
    shared: Option<SharedDependencies>,
    active: Vec<LoadedPilet>,
    bootstrapped: bool,
}

impl PluginHost {
    /// Starts building a host.
    pub fn builder() -> PluginHostBuilder {
        PluginHostBuilder::new()
    }

    /// Runs the startup sequence: seed shared dependencies, fetch the
    /// descriptor feed and load every pilet under the configured strategy.
    ///
    /// Seeding and feed failures are fatal; per-pilet failures are not —
    /// they are part of the returned [`LoadOutcome`].
    pub async fn bootstrap(&mut self) -> Result<LoadOutcome> {
        if self.bootstrapped {
            return Err(Error::Lifecycle {
                phase: HostLifecyclePhase::Load,
                message: "host already bootstrapped".to_string(),
                source: None,
            });
        }
        log::info!("bootstrapping {} v{}", constants::APP_NAME, constants::APP_VERSION);

        if let Some(shared) = self.shared.take() {
            injector::seed(&self.registry, shared).await.map_err(|e| {
                Error::lifecycle(
                    HostLifecyclePhase::Seed,
                    "shared dependency seeding failed",
                    e.into(),
                )
            })?;
        }

        let descriptors = self.feed.fetch_pilets().await.map_err(|e| {
            Error::lifecycle(
                HostLifecyclePhase::Discover,
                "pilet feed fetch failed",
                e.into(),
            )
        })?;

        let outcome = self.pipeline.load_all(descriptors).await;
        self.active = outcome.active.clone();
        self.bootstrapped = true;
        Ok(outcome)
    }

    /// Activates a parked pilet (on-demand strategy) and tracks it with the
    /// other active pilets.
    pub async fn request_pilet(&mut self, name: &str) -> Result<LoadedPilet> {
        let loaded = self.pipeline.request(name).await?;
        self.active.push(loaded.clone());
        Ok(loaded)
    }

    /// Tears all active pilets down, in reverse activation order.
    ///
    /// A failing teardown is reported but never stops the remaining
    /// teardowns.
    pub async fn shutdown(&mut self) -> Result<()> {
        let mut errors = Vec::new();
        for pilet in self.active.drain(..).rev() {
            if let Err(e) = self.pipeline.teardown(&pilet).await {
                errors.push(format!("{}: {e}", pilet.descriptor.qualified_name()));
            }
        }
        self.bootstrapped = false;

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Lifecycle {
                phase: HostLifecyclePhase::Shutdown,
                message: format!("pilet teardown errors: {}", errors.join("; ")),
                source: None,
            })
        }
    }

    /// The host's module registry.
    pub fn registry(&self) -> &Arc<ModuleRegistry> {
        &self.registry
    }

    /// The host's capability composer.
    pub fn composer(&self) -> &Arc<CapabilityComposer> {
        &self.composer
    }

    /// Current lifecycle state of a pilet.
    pub fn pilet_state(&self, name: &str) -> Option<PiletState> {
        self.pipeline.state(name)
    }

    /// The currently active pilets, in activation order.
    pub fn active_pilets(&self) -> &[LoadedPilet] {
        &self.active
    }

    /// Whether `bootstrap` has completed.
    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped
    }

    /// Names of pilets parked for on-demand activation.
    pub fn parked_pilets(&self) -> Vec<String> {
        self.pipeline.parked_names()
    }
}

impl std::fmt::Debug for PluginHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginHost")
            .field("bootstrapped", &self.bootstrapped)
            .field("active", &self.active.len())
            .finish_non_exhaustive()
    }
}

/// Builder assembling a [`PluginHost`] from its collaborators.
pub struct PluginHostBuilder {
    shared: SharedDependencies,
    feed: Option<Arc<dyn FeedSource>>,
    loader: Option<Arc<dyn PiletLoader>>,
    spec_loaders: Vec<(String, Arc<dyn PiletLoader>)>,
    strategy: LoadingStrategy,
    hooks: LifecycleHooks,
    extenders: Vec<ApiExtender>,
    setup_timeout: Option<Duration>,
}

impl Default for PluginHostBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginHostBuilder {
    pub fn new() -> Self {
        Self {
            shared: SharedDependencies::new(),
            feed: None,
            loader: None,
            spec_loaders: Vec::new(),
            strategy: LoadingStrategy::default(),
            hooks: LifecycleHooks::default(),
            extenders: Vec::new(),
            setup_timeout: None,
        }
    }

    /// Declares one shared dependency.
    pub fn share_dependency(mut self, name: &str, value: SharedValue) -> Self {
        self.shared.insert(name.to_string(), value);
        self
    }

    /// Declares a whole map of shared dependencies.
    pub fn share_dependencies(mut self, shared: SharedDependencies) -> Self {
        self.shared.extend(shared);
        self
    }

    /// Installs the descriptor feed source.
    pub fn with_feed(mut self, feed: impl FeedSource + 'static) -> Self {
        self.feed = Some(Arc::new(feed));
        self
    }

    /// Installs the default pilet loader.
    pub fn with_loader(mut self, loader: impl PiletLoader + 'static) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    /// Installs a loader for pilets carrying a specific spec key.
    pub fn with_spec_loader(mut self, spec: &str, loader: impl PiletLoader + 'static) -> Self {
        self.spec_loaders.push((spec.to_string(), Arc::new(loader)));
        self
    }

    /// Sets the loading strategy.
    pub fn with_strategy(mut self, strategy: LoadingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Installs the lifecycle hooks.
    pub fn with_hooks(mut self, hooks: LifecycleHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Appends a capability chain link.
    pub fn with_extender<F>(mut self, extender: F) -> Self
    where
        F: Fn(PiletApi, &PiletDescriptor) -> PiletApi + Send + Sync + 'static,
    {
        self.extenders.push(Box::new(extender));
        self
    }

    /// Bounds each pilet's setup.
    pub fn with_setup_timeout(mut self, timeout: Duration) -> Self {
        self.setup_timeout = Some(timeout);
        self
    }

    /// Applies a loaded [`HostConfig`]: strategy, setup timeout and — if no
    /// feed source was installed yet — the configured feed file.
    pub fn with_config(mut self, config: &HostConfig) -> Self {
        self.strategy = config.strategy;
        if let Some(timeout) = config.setup_timeout() {
            self.setup_timeout = Some(timeout);
        }
        if self.feed.is_none() {
            if let Some(feed) = &config.feed {
                self.feed = Some(Arc::new(FileFeedSource::new(feed)));
            }
        }
        self
    }

    /// Assembles the host.
    pub fn build(self) -> Result<PluginHost> {
        let feed = self
            .feed
            .ok_or_else(|| Error::Other("a feed source is required to build a host".to_string()))?;
        let loader = self
            .loader
            .ok_or_else(|| Error::Other("a pilet loader is required to build a host".to_string()))?;

        let registry = Arc::new(ModuleRegistry::new());
        let composer = Arc::new(CapabilityComposer::new(registry.clone()));
        for extender in self.extenders {
            composer.extend(extender);
        }

        let mut pipeline = PiletPipeline::new(registry.clone(), composer.clone(), loader)
            .with_strategy(self.strategy)
            .with_hooks(self.hooks);
        for (spec, spec_loader) in self.spec_loaders {
            pipeline = pipeline.with_spec_loader(&spec, spec_loader);
        }
        if let Some(timeout) = self.setup_timeout {
            pipeline = pipeline.with_setup_timeout(timeout);
        }

        Ok(PluginHost {
            registry,
            composer,
            pipeline,
            feed,
            shared: Some(self.shared),
            active: Vec::new(),
            bootstrapped: false,
        })
    }
}
