use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::join_all;

use crate::capability::api::PiletApi;
use crate::capability::composer::CapabilityComposer;
use crate::module_registry::registry::ModuleRegistry;
use crate::pilet_loader::descriptor::PiletDescriptor;
use crate::pilet_loader::error::PiletSystemError;
use crate::pilet_loader::hooks::LifecycleHooks;
use crate::pilet_loader::strategy::LoadingStrategy;
use crate::pilet_loader::traits::{Pilet, PiletLoader};

/// Lifecycle state of one pilet within the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PiletState {
    /// Descriptor known, content not yet requested.
    Discovered,
    /// Content request in flight.
    Fetching,
    /// Content retrieved, `setup` running.
    Executing,
    /// `setup` completed without error.
    Active,
    /// Fetch or setup raised an error.
    Failed,
}

impl fmt::Display for PiletState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PiletState::Discovered => "discovered",
            PiletState::Fetching => "fetching",
            PiletState::Executing => "executing",
            PiletState::Active => "active",
            PiletState::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// A successfully activated pilet: its descriptor, executed instance and the
/// capability surface bound to it.
#[derive(Clone)]
pub struct LoadedPilet {
    pub descriptor: PiletDescriptor,
    pub instance: Arc<dyn Pilet>,
    pub api: PiletApi,
}

impl fmt::Debug for LoadedPilet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedPilet")
            .field("descriptor", &self.descriptor.qualified_name())
            .finish_non_exhaustive()
    }
}

/// A pilet that reached the `Failed` state, with the error recorded against
/// its identity.
#[derive(Debug)]
pub struct FailedPilet {
    pub descriptor: PiletDescriptor,
    pub error: PiletSystemError,
}

/// Complete accounting of one load attempt.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub active: Vec<LoadedPilet>,
    pub failed: Vec<FailedPilet>,
}

impl LoadOutcome {
    /// Whether every discovered pilet reached `Active`.
    pub fn is_fully_active(&self) -> bool {
        self.failed.is_empty()
    }

    /// Names of the activated pilets, in activation order.
    pub fn active_names(&self) -> Vec<&str> {
        self.active
            .iter()
            .map(|p| p.descriptor.name.as_str())
            .collect()
    }

    fn push(&mut self, result: Result<LoadedPilet, FailedPilet>) {
        match result {
            Ok(pilet) => self.active.push(pilet),
            Err(failed) => self.failed.push(failed),
        }
    }
}

/// Drives pilets from `Discovered` to a terminal state.
///
/// Scheduling across the whole list follows the configured
/// [`LoadingStrategy`]; failures stay isolated per pilet, so one broken
/// pilet never aborts its siblings. All concurrency is cooperative: the
/// parallel strategy interleaves suspended per-pilet futures on the calling
/// task, it does not spawn threads.
pub struct PiletPipeline {
    registry: Arc<ModuleRegistry>,
    composer: Arc<CapabilityComposer>,
    default_loader: Arc<dyn PiletLoader>,
    spec_loaders: HashMap<String, Arc<dyn PiletLoader>>,
    hooks: LifecycleHooks,
    strategy: LoadingStrategy,
    setup_timeout: Option<Duration>,
    states: Mutex<HashMap<String, PiletState>>,
    parked: Mutex<HashMap<String, PiletDescriptor>>,
}

impl PiletPipeline {
    /// Creates a pipeline with the parallel strategy and no hooks.
    pub fn new(
        registry: Arc<ModuleRegistry>,
        composer: Arc<CapabilityComposer>,
        default_loader: Arc<dyn PiletLoader>,
    ) -> Self {
        Self {
            registry,
            composer,
            default_loader,
            spec_loaders: HashMap::new(),
            hooks: LifecycleHooks::default(),
            strategy: LoadingStrategy::default(),
            setup_timeout: None,
            states: Mutex::new(HashMap::new()),
            parked: Mutex::new(HashMap::new()),
        }
    }

    /// Sets the scheduling strategy.
    pub fn with_strategy(mut self, strategy: LoadingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Installs the host's lifecycle hooks.
    pub fn with_hooks(mut self, hooks: LifecycleHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Bounds every pilet's `setup`. Without a bound, a setup that never
    /// resolves stalls its own slot indefinitely (the source behavior).
    pub fn with_setup_timeout(mut self, timeout: Duration) -> Self {
        self.setup_timeout = Some(timeout);
        self
    }

    /// Routes descriptors carrying this spec key to a dedicated loader.
    pub fn with_spec_loader(mut self, spec: &str, loader: Arc<dyn PiletLoader>) -> Self {
        self.spec_loaders.insert(spec.to_string(), loader);
        self
    }

    /// The configured strategy.
    pub fn strategy(&self) -> LoadingStrategy {
        self.strategy
    }

    /// Current state of a pilet, if the pipeline has seen it.
    pub fn state(&self, name: &str) -> Option<PiletState> {
        self.states
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .copied()
    }

    fn set_state(&self, name: &str, state: PiletState) {
        log::debug!("pilet '{name}' -> {state}");
        self.states
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_string(), state);
    }

    fn loader_for(&self, descriptor: &PiletDescriptor) -> Arc<dyn PiletLoader> {
        if let Some(spec) = &descriptor.spec {
            if let Some(loader) = self.spec_loaders.get(spec) {
                return loader.clone();
            }
            log::warn!(
                "pilet '{}' requests unknown spec '{}', falling back to default loader",
                descriptor.name,
                spec
            );
        }
        self.default_loader.clone()
    }

    /// Loads the whole descriptor list under the configured strategy.
    pub async fn load_all(&self, descriptors: Vec<PiletDescriptor>) -> LoadOutcome {
        for descriptor in &descriptors {
            self.set_state(&descriptor.name, PiletState::Discovered);
        }

        let mut outcome = LoadOutcome::default();
        match self.strategy {
            LoadingStrategy::Parallel => {
                let results = join_all(
                    descriptors
                        .into_iter()
                        .map(|descriptor| self.load_one(descriptor)),
                )
                .await;
                for result in results {
                    outcome.push(result);
                }
            }
            LoadingStrategy::Sequential => {
                for descriptor in descriptors {
                    outcome.push(self.load_one(descriptor).await);
                }
            }
            LoadingStrategy::OnDemand => {
                let mut parked = self.parked.lock().unwrap_or_else(|e| e.into_inner());
                for descriptor in descriptors {
                    parked.insert(descriptor.name.clone(), descriptor);
                }
            }
        }

        log::info!(
            "load finished: {} active, {} failed",
            outcome.active.len(),
            outcome.failed.len()
        );
        outcome
    }

    /// Activates a parked pilet explicitly (on-demand strategy).
    pub async fn request(&self, name: &str) -> Result<LoadedPilet, PiletSystemError> {
        let descriptor = {
            let mut parked = self.parked.lock().unwrap_or_else(|e| e.into_inner());
            parked.remove(name)
        };
        let Some(descriptor) = descriptor else {
            return Err(PiletSystemError::UnknownPilet {
                pilet: name.to_string(),
            });
        };
        self.load_one(descriptor).await.map_err(|failed| failed.error)
    }

    /// Names of pilets still parked for on-demand activation, sorted.
    pub fn parked_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .parked
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Runs one pilet through `Fetching` and `Executing` to a terminal
    /// state. Errors are returned as values; they never propagate to
    /// sibling loads.
    async fn load_one(&self, descriptor: PiletDescriptor) -> Result<LoadedPilet, FailedPilet> {
        let name = descriptor.name.clone();

        self.set_state(&name, PiletState::Fetching);
        let loader = self.loader_for(&descriptor);
        let instance = match loader.load(&descriptor).await {
            Ok(instance) => instance,
            Err(error) => {
                self.set_state(&name, PiletState::Failed);
                log::warn!("fetching pilet '{name}' failed: {error}");
                return Err(FailedPilet { descriptor, error });
            }
        };

        self.set_state(&name, PiletState::Executing);
        let api = self.composer.compose(&descriptor);
        self.hooks.fire_before_setup(&descriptor);

        let setup = instance.setup(api.clone());
        let result = match self.setup_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, setup).await {
                Ok(result) => result,
                Err(_) => Err(PiletSystemError::SetupTimeout {
                    pilet: name.clone(),
                    timeout_ms: timeout.as_millis() as u64,
                }),
            },
            None => setup.await,
        };
        self.hooks.fire_after_setup(&descriptor, result.as_ref().err());

        match result {
            Ok(()) => {
                // Publish the activated pilet under its own versioned name,
                // so sibling pilets can resolve it like any shared module.
                self.registry.register_value(
                    &descriptor.name,
                    Some(&descriptor.version),
                    Arc::new(instance.clone()),
                );
                self.set_state(&name, PiletState::Active);
                log::info!("pilet '{}' is active", descriptor.qualified_name());
                Ok(LoadedPilet {
                    descriptor,
                    instance,
                    api,
                })
            }
            Err(error) => {
                self.set_state(&name, PiletState::Failed);
                log::warn!("setup of pilet '{name}' failed: {error}");
                Err(FailedPilet { descriptor, error })
            }
        }
    }

    /// Tears one pilet down, firing the teardown hooks symmetrically to
    /// setup. The pilet's state entry is cleared afterwards.
    pub async fn teardown(&self, pilet: &LoadedPilet) -> Result<(), PiletSystemError> {
        let descriptor = &pilet.descriptor;
        self.hooks.fire_before_teardown(descriptor);
        let result = pilet.instance.teardown(pilet.api.clone()).await;
        self.hooks.fire_after_teardown(descriptor, result.as_ref().err());

        self.states
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&descriptor.name);
        match &result {
            Ok(()) => log::info!("pilet '{}' torn down", descriptor.qualified_name()),
            Err(error) => log::warn!(
                "teardown of pilet '{}' failed: {error}",
                descriptor.qualified_name()
            ),
        }
        result
    }
}

impl fmt::Debug for PiletPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PiletPipeline")
            .field("strategy", &self.strategy)
            .field("spec_loaders", &self.spec_loaders.len())
            .field("setup_timeout", &self.setup_timeout)
            .finish_non_exhaustive()
    }
}
