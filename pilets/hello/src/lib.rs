//! Example pilet for the nacelle host.
//!
//! Registers a greeter module other pilets can import, and picks up the
//! host-provided `greeting` capability when the host installed one.

use std::sync::Arc;

use async_trait::async_trait;

use nacelle_core::module_registry::exports::{ModuleExports, ModuleFactory};
use nacelle_core::pilet_loader::descriptor::PiletDescriptor;
use nacelle_core::pilet_loader::error::PiletSystemError;
use nacelle_core::pilet_loader::traits::Pilet;
use nacelle_core::capability::api::PiletApi;

/// The module name the greeter is published under.
pub const GREETER_MODULE: &str = "hello/greeter";

/// The greeting exported by [`GREETER_MODULE`].
#[derive(Debug, Clone, PartialEq)]
pub struct Greeter {
    pub greeting: String,
}

impl Greeter {
    pub fn greet(&self, subject: &str) -> String {
        format!("{}, {subject}!", self.greeting)
    }
}

/// A minimal pilet: publishes a [`Greeter`] during setup.
#[derive(Debug, Default)]
pub struct HelloPilet;

impl HelloPilet {
    /// Descriptor matching what a feed would announce for this pilet.
    pub fn descriptor() -> PiletDescriptor {
        PiletDescriptor::new("hello", env!("CARGO_PKG_VERSION"))
    }
}

#[async_trait]
impl Pilet for HelloPilet {
    async fn setup(&self, api: PiletApi) -> Result<(), PiletSystemError> {
        // The host may have installed a custom greeting capability.
        let greeting = api
            .extension_as::<String>("greeting")
            .map(|s| s.as_str().to_string())
            .unwrap_or_else(|| "Hello".to_string());

        let greeter = Greeter { greeting };
        log::info!("{}", greeter.greet("nacelle"));

        api.register_module(
            GREETER_MODULE,
            None,
            ModuleFactory::sync(move || ModuleExports::of(greeter.clone())),
        );
        Ok(())
    }

    async fn teardown(&self, _api: PiletApi) -> Result<(), PiletSystemError> {
        log::info!("hello pilet shutting down");
        Ok(())
    }
}

/// Boxed instance for static registration.
pub fn instance() -> Arc<dyn Pilet> {
    Arc::new(HelloPilet)
}

#[cfg(test)]
mod tests {
    use super::*;

    use nacelle_core::capability::composer::CapabilityComposer;
    use nacelle_core::module_registry::registry::ModuleRegistry;

    #[tokio::test]
    async fn setup_publishes_the_greeter() {
        let registry = Arc::new(ModuleRegistry::new());
        let composer = CapabilityComposer::new(registry.clone());
        let api = composer.compose(&HelloPilet::descriptor());

        HelloPilet.setup(api).await.unwrap();

        let greeter = registry
            .get(GREETER_MODULE)
            .and_then(|e| e.downcast::<Greeter>())
            .unwrap();
        assert_eq!(greeter.greet("world"), "Hello, world!");
    }

    #[tokio::test]
    async fn host_greeting_capability_is_honored() {
        let registry = Arc::new(ModuleRegistry::new());
        let composer = CapabilityComposer::new(registry.clone());
        composer.extend(Box::new(|api, _| {
            api.set_extension("greeting", Arc::new("Ahoy".to_string()));
            api
        }));
        let api = composer.compose(&HelloPilet::descriptor());

        HelloPilet.setup(api).await.unwrap();

        let greeter = registry
            .get(GREETER_MODULE)
            .and_then(|e| e.downcast::<Greeter>())
            .unwrap();
        assert_eq!(greeter.greeting, "Ahoy");
    }
}
