use std::any::Any;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::module_registry::error::ModuleSystemError;

/// Type-erased module content shared between host and pilets.
///
/// Consumers recover the concrete type with [`ModuleExports::downcast`],
/// mirroring how kernel components are stored type-erased and retrieved by
/// concrete type.
pub type SharedValue = Arc<dyn Any + Send + Sync>;

/// An owned future producing module exports.
pub type ExportsFuture =
    Pin<Box<dyn Future<Output = Result<ModuleExports, ModuleSystemError>> + Send>>;

/// The canonical exported shape of a registered module.
///
/// Every module exposes both the whole exported `value` and a `default`
/// export so that "import the module" and "import its default" access
/// patterns work uniformly across heterogeneous pilet bundles. When no
/// explicit default is provided, one is synthesized from the whole value.
#[derive(Clone)]
pub struct ModuleExports {
    value: SharedValue,
    default: SharedValue,
}

impl ModuleExports {
    /// Creates exports from a whole value, synthesizing the default export.
    pub fn new(value: SharedValue) -> Self {
        let default = value.clone();
        Self { value, default }
    }

    /// Creates exports with an explicit default export.
    pub fn with_default(value: SharedValue, default: SharedValue) -> Self {
        Self { value, default }
    }

    /// Convenience constructor wrapping a concrete value.
    pub fn of<T: Send + Sync + 'static>(value: T) -> Self {
        Self::new(Arc::new(value))
    }

    /// The whole exported value.
    pub fn value(&self) -> &SharedValue {
        &self.value
    }

    /// The default export.
    pub fn default_export(&self) -> &SharedValue {
        &self.default
    }

    /// Downcasts the whole exported value to a concrete type.
    pub fn downcast<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.value.clone().downcast::<T>().ok()
    }

    /// Downcasts the default export to a concrete type.
    pub fn downcast_default<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.default.clone().downcast::<T>().ok()
    }
}

impl fmt::Debug for ModuleExports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleExports").finish_non_exhaustive()
    }
}

/// What a single factory invocation yields: either a value that is already
/// available, or a deferred computation that must be awaited.
///
/// The distinction is fixed at registration time by [`ModuleFactory`];
/// nothing inspects produced values at runtime to guess their shape.
pub enum ExportedValue {
    Direct(ModuleExports),
    Deferred(ExportsFuture),
}

impl fmt::Debug for ExportedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportedValue::Direct(_) => f.write_str("ExportedValue::Direct"),
            ExportedValue::Deferred(_) => f.write_str("ExportedValue::Deferred"),
        }
    }
}

/// Produces a module's exported value when the module is first materialized.
///
/// Synchronous factories return their exports directly; asynchronous
/// factories return a future the registry awaits during `import`.
pub enum ModuleFactory {
    Sync(Box<dyn Fn() -> ModuleExports + Send + Sync>),
    Async(Box<dyn Fn() -> ExportsFuture + Send + Sync>),
}

impl ModuleFactory {
    /// Synchronous factory from a closure.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn() -> ModuleExports + Send + Sync + 'static,
    {
        ModuleFactory::Sync(Box::new(f))
    }

    /// Asynchronous factory from a future-returning closure.
    pub fn deferred<F>(f: F) -> Self
    where
        F: Fn() -> ExportsFuture + Send + Sync + 'static,
    {
        ModuleFactory::Async(Box::new(f))
    }

    /// Synchronous factory that hands out clones of an existing value.
    ///
    /// This is what shared-dependency seeding uses: the host already owns
    /// the value, so the factory is a pure provider.
    pub fn from_value(value: SharedValue) -> Self {
        ModuleFactory::Sync(Box::new(move || ModuleExports::new(value.clone())))
    }

    /// Whether the factory produces its exports without suspension.
    pub fn is_sync(&self) -> bool {
        matches!(self, ModuleFactory::Sync(_))
    }

    /// Invokes the factory once.
    pub fn produce(&self) -> ExportedValue {
        match self {
            ModuleFactory::Sync(f) => ExportedValue::Direct(f()),
            ModuleFactory::Async(f) => ExportedValue::Deferred(f()),
        }
    }
}

impl fmt::Debug for ModuleFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleFactory::Sync(_) => f.write_str("ModuleFactory::Sync"),
            ModuleFactory::Async(_) => f.write_str("ModuleFactory::Async"),
        }
    }
}
