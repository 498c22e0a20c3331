use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::capability::api::PiletApi;
use crate::module_registry::registry::ModuleRegistry;
use crate::pilet_loader::descriptor::PiletDescriptor;

/// One link of the capability chain.
///
/// Receives the surface accumulated so far plus the descriptor of the pilet
/// being composed for, and returns the next accumulator. Links may
/// mutate-and-return the same surface; later links see everything earlier
/// links merged in.
pub type ApiExtender = Box<dyn Fn(PiletApi, &PiletDescriptor) -> PiletApi + Send + Sync>;

/// Builds per-pilet capability surfaces from an ordered extension chain.
pub struct CapabilityComposer {
    registry: Arc<ModuleRegistry>,
    chain: RwLock<Vec<Arc<ApiExtender>>>,
    composed: RwLock<HashMap<String, PiletApi>>,
}

impl CapabilityComposer {
    /// Creates a composer with an empty chain.
    pub fn new(registry: Arc<ModuleRegistry>) -> Self {
        Self {
            registry,
            chain: RwLock::new(Vec::new()),
            composed: RwLock::new(HashMap::new()),
        }
    }

    /// Appends a link to the chain.
    ///
    /// The host installs its links before loading starts; a feature pilet
    /// may append further links from its own `setup`, augmenting the
    /// surfaces of pilets that load after it.
    pub fn extend(&self, extender: ApiExtender) {
        self.chain
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::new(extender));
    }

    /// Number of links currently installed.
    pub fn chain_len(&self) -> usize {
        self.chain.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Folds a fresh base surface through the chain for one pilet.
    ///
    /// Always produces a distinct surface instance, and records it in the
    /// side table keyed by pilet name. The recording is diagnostic only; it
    /// never affects whether loading succeeds.
    pub fn compose(&self, descriptor: &PiletDescriptor) -> PiletApi {
        // Snapshot the chain so a link appended mid-composition (by a
        // feature pilet loading concurrently) applies to the next pilet,
        // not half of this one.
        let links: Vec<Arc<ApiExtender>> = self
            .chain
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        let mut api = PiletApi::new(self.registry.clone(), descriptor);
        for link in &links {
            api = link(api, descriptor);
        }
        log::debug!(
            "composed capability surface for '{}' through {} links",
            descriptor.name,
            links.len()
        );

        self.composed
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(descriptor.name.clone(), api.clone());
        api
    }

    /// The final surface composed for a pilet, if it has been composed.
    pub fn composed_for(&self, name: &str) -> Option<PiletApi> {
        self.composed
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }

    /// Names of all pilets a surface has been composed for, sorted.
    pub fn composed_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .composed
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for CapabilityComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityComposer")
            .field("chain_len", &self.chain_len())
            .field("composed", &self.composed_names())
            .finish()
    }
}
