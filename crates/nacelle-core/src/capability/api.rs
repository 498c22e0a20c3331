use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::module_registry::error::ModuleSystemError;
use crate::module_registry::exports::{ModuleExports, ModuleFactory, SharedValue};
use crate::module_registry::registry::ModuleRegistry;
use crate::pilet_loader::descriptor::PiletDescriptor;

struct ApiInner {
    owner: PiletDescriptor,
    registry: Arc<ModuleRegistry>,
    extensions: RwLock<HashMap<String, SharedValue>>,
}

/// The capability surface handed to a pilet's `setup`.
///
/// Cloning is cheap and preserves identity: clones share the same underlying
/// surface. A fresh surface is created per composition, so the object pilet
/// A receives is never the instance pilet B receives.
#[derive(Clone)]
pub struct PiletApi {
    inner: Arc<ApiInner>,
}

impl PiletApi {
    /// Creates the base surface for one pilet.
    pub fn new(registry: Arc<ModuleRegistry>, owner: &PiletDescriptor) -> Self {
        Self {
            inner: Arc::new(ApiInner {
                owner: owner.clone(),
                registry,
                extensions: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Metadata of the pilet this surface belongs to.
    pub fn owner(&self) -> &PiletDescriptor {
        &self.inner.owner
    }

    /// True iff both handles refer to the same composed surface.
    pub fn same_instance(a: &PiletApi, b: &PiletApi) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Adds or overrides a capability entry. Later chain links override
    /// earlier ones under the same key.
    pub fn set_extension(&self, key: &str, value: SharedValue) {
        self.inner
            .extensions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value);
    }

    /// Reads a capability entry.
    pub fn extension(&self, key: &str) -> Option<SharedValue> {
        self.inner
            .extensions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    /// Reads a capability entry downcast to a concrete type.
    pub fn extension_as<T: Send + Sync + 'static>(&self, key: &str) -> Option<Arc<T>> {
        self.extension(key).and_then(|v| v.downcast::<T>().ok())
    }

    /// Installed capability keys, sorted.
    pub fn extension_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .inner
            .extensions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// Registers a module in the host's shared registry on behalf of this
    /// pilet, making it importable by sibling pilets.
    pub fn register_module(&self, name: &str, version: Option<&str>, factory: ModuleFactory) {
        log::debug!(
            "pilet '{}' registering module '{}'",
            self.inner.owner.name,
            name
        );
        self.inner.registry.register(name, version, factory);
    }

    /// Suspending import of a shared module.
    pub async fn import_module(&self, id: &str) -> Result<ModuleExports, ModuleSystemError> {
        self.inner.registry.import(id).await
    }

    /// Non-suspending read of a shared module.
    pub fn get_module(&self, id: &str) -> Option<ModuleExports> {
        self.inner.registry.get(id)
    }

    /// Non-suspending read that reports resolution misses as errors.
    pub fn require_module(&self, id: &str) -> Result<ModuleExports, ModuleSystemError> {
        self.inner.registry.require(id)
    }
}

impl fmt::Debug for PiletApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PiletApi")
            .field("owner", &self.inner.owner.name)
            .field("extensions", &self.extension_keys())
            .finish()
    }
}
