use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use semver::Version;
use tokio::sync::{OnceCell, SetError};

use crate::module_registry::error::ModuleSystemError;
use crate::module_registry::exports::{ExportedValue, ModuleExports, ModuleFactory};
use crate::module_registry::version::VersionRange;

/// A single registration: the factory plus its memoization cell.
///
/// The cell gives the single-flight guarantee: concurrent `import`s for the
/// same entry observe one in-flight materialization, and the factory runs at
/// most once per entry on the cooperative path.
struct ModuleEntry {
    id: String,
    factory: ModuleFactory,
    cell: OnceCell<ModuleExports>,
}

impl ModuleEntry {
    fn new(id: String, factory: ModuleFactory) -> Self {
        Self {
            id,
            factory,
            cell: OnceCell::new(),
        }
    }

    /// Non-suspending materialization: executes synchronous factories
    /// inline, never waits for asynchronous ones.
    fn materialize_sync(&self) -> Option<ModuleExports> {
        if let Some(exports) = self.cell.get() {
            return Some(exports.clone());
        }
        match &self.factory {
            ModuleFactory::Sync(f) => {
                let exports = f();
                match self.cell.set(exports.clone()) {
                    Ok(()) => Some(exports),
                    // Filled concurrently: hand back the canonical value.
                    Err(SetError::AlreadyInitializedError(_)) => self.cell.get().cloned(),
                    // An import holds the init lock; our locally produced
                    // exports are equivalent, return them without waiting.
                    Err(SetError::InitializingError(_)) => Some(exports),
                }
            }
            ModuleFactory::Async(_) => None,
        }
    }

    /// Suspending materialization with memoized execution. Only successful
    /// results are cached; a failed deferred factory may be retried by a
    /// later import.
    async fn materialize(&self) -> Result<ModuleExports, ModuleSystemError> {
        self.cell
            .get_or_try_init(|| async {
                log::trace!("materializing module '{}'", self.id);
                match self.factory.produce() {
                    ExportedValue::Direct(exports) => Ok(exports),
                    ExportedValue::Deferred(fut) => fut.await,
                }
            })
            .await
            .cloned()
    }
}

/// The result of resolving a requested module identifier.
pub struct ResolvedModule {
    id: String,
    entry: Arc<ModuleEntry>,
}

impl ResolvedModule {
    /// The registration key the request resolved to, e.g. `pkg@1.2.3`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the registration's factory produces exports synchronously.
    pub fn is_sync(&self) -> bool {
        self.entry.factory.is_sync()
    }

    /// Whether the registration has already been materialized.
    pub fn is_materialized(&self) -> bool {
        self.entry.cell.initialized()
    }
}

/// Versioned module registry for a single host instance.
///
/// Registrations are keyed by `name` or `name@version`. Lookups resolve in
/// two stages: exact match on the full requested id, then a semver range
/// search over registrations sharing the name. Among several satisfying
/// versions the highest wins.
///
/// The registry is constructor-instantiated and passed by reference (or
/// `Arc`) to every component that needs it, so multiple isolated hosts can
/// coexist in one process.
#[derive(Default)]
pub struct ModuleRegistry {
    entries: RwLock<HashMap<String, Arc<ModuleEntry>>>,
}

/// Splits `pkg@^1.0.0` into `("pkg", "^1.0.0")`.
///
/// The separator is searched from index 1 so that names with a leading `@`
/// (scoped packages) keep their prefix.
fn split_versioned(id: &str) -> Option<(&str, &str)> {
    let sep = id
        .char_indices()
        .skip(1)
        .find_map(|(i, c)| (c == '@').then_some(i))?;
    let (name, rest) = id.split_at(sep);
    let range = &rest[1..];
    if range.is_empty() {
        return None;
    }
    Some((name, range))
}

impl ModuleRegistry {
    /// Create a new empty module registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn read_entries(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<ModuleEntry>>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<ModuleEntry>>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Stores a registration under `name`, optionally qualified by version.
    ///
    /// Always succeeds. Registering the same `(name, version)` pair twice
    /// overwrites silently (last write wins), which is what hot-swapping a
    /// module during development relies on.
    pub fn register(&self, name: &str, version: Option<&str>, factory: ModuleFactory) {
        let key = match version {
            Some(v) => format!("{name}@{v}"),
            None => name.to_string(),
        };
        log::debug!("registering module '{key}'");
        let entry = Arc::new(ModuleEntry::new(key.clone(), factory));
        self.write_entries().insert(key, entry);
    }

    /// Registers a synchronous factory handing out clones of `value`.
    pub fn register_value(
        &self,
        name: &str,
        version: Option<&str>,
        value: crate::module_registry::exports::SharedValue,
    ) {
        self.register(name, version, ModuleFactory::from_value(value));
    }

    /// Resolves a requested identifier to a registration.
    ///
    /// Stage one is an exact match on the full id. Stage two applies when
    /// the id has a `name@range` shape and the range validates: all
    /// registrations whose name matches are enumerated and the highest
    /// version satisfying the range wins. Invalid ranges and unparsable
    /// stored versions degrade to "no match".
    pub fn resolve(&self, requested: &str) -> Option<ResolvedModule> {
        let entries = self.read_entries();

        if let Some(entry) = entries.get(requested) {
            return Some(ResolvedModule {
                id: requested.to_string(),
                entry: entry.clone(),
            });
        }

        let (name, range) = split_versioned(requested)?;
        let Ok(range) = VersionRange::from_constraint(range) else {
            log::debug!("ignoring invalid version range in request '{requested}'");
            return None;
        };

        let prefix = format!("{name}@");
        let mut best: Option<(Version, &String, &Arc<ModuleEntry>)> = None;
        for (key, entry) in entries.iter() {
            let Some(stored) = key.strip_prefix(&prefix) else {
                continue;
            };
            let Ok(stored) = Version::parse(stored) else {
                continue;
            };
            if !range.includes(&stored) {
                continue;
            }
            match &best {
                Some((current, _, _)) if *current >= stored => {}
                _ => best = Some((stored, key, entry)),
            }
        }

        best.map(|(_, key, entry)| ResolvedModule {
            id: key.clone(),
            entry: entry.clone(),
        })
    }

    /// Non-suspending read: returns the module's exports if the registration
    /// is synchronous or has already been materialized.
    ///
    /// Asynchronous factories that have not completed yield `None`; the
    /// caller is never blocked.
    pub fn get(&self, requested: &str) -> Option<ModuleExports> {
        let resolved = self.resolve(requested)?;
        resolved.entry.materialize_sync()
    }

    /// Like [`get`](Self::get), but a resolution miss is reported as
    /// [`ModuleSystemError::ModuleNotFound`] carrying the requested id.
    pub fn require(&self, requested: &str) -> Result<ModuleExports, ModuleSystemError> {
        self.get(requested)
            .ok_or_else(|| ModuleSystemError::ModuleNotFound {
                id: requested.to_string(),
            })
    }

    /// Suspending import: resolves, invokes the factory (awaiting deferred
    /// ones) and returns the memoized exports.
    ///
    /// Concurrent imports of the same entry share a single factory
    /// invocation.
    pub async fn import(&self, requested: &str) -> Result<ModuleExports, ModuleSystemError> {
        let resolved = self
            .resolve(requested)
            .ok_or_else(|| ModuleSystemError::ModuleNotFound {
                id: requested.to_string(),
            })?;
        log::trace!("importing module '{}' as '{}'", requested, resolved.id());
        resolved.entry.materialize().await
    }

    /// Registered keys, sorted for stable diagnostics output.
    pub fn registrations(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.read_entries().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    /// Whether the registry holds no registrations.
    pub fn is_empty(&self) -> bool {
        self.read_entries().is_empty()
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("entries", &self.len())
            .finish()
    }
}
