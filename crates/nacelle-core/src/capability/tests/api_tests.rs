use std::sync::Arc;

use crate::capability::api::PiletApi;
use crate::module_registry::exports::{ModuleExports, ModuleFactory};
use crate::module_registry::registry::ModuleRegistry;
use crate::pilet_loader::descriptor::PiletDescriptor;

fn api_for(registry: &Arc<ModuleRegistry>, name: &str) -> PiletApi {
    PiletApi::new(registry.clone(), &PiletDescriptor::new(name, "0.1.0"))
}

#[test]
fn owner_metadata_is_exposed() {
    let registry = Arc::new(ModuleRegistry::new());
    let api = api_for(&registry, "sample");
    assert_eq!(api.owner().name, "sample");
    assert_eq!(api.owner().version, "0.1.0");
}

#[test]
fn clones_preserve_identity() {
    let registry = Arc::new(ModuleRegistry::new());
    let api = api_for(&registry, "sample");
    let clone = api.clone();
    assert!(PiletApi::same_instance(&api, &clone));

    clone.set_extension("k", Arc::new(1u32));
    assert!(api.extension("k").is_some());
}

#[tokio::test]
async fn module_operations_go_through_the_shared_registry() {
    let registry = Arc::new(ModuleRegistry::new());
    let producer = api_for(&registry, "producer");
    let consumer = api_for(&registry, "consumer");

    producer.register_module(
        "producer/data",
        Some("1.0.0"),
        ModuleFactory::sync(|| ModuleExports::of("payload".to_string())),
    );

    // Both surfaces see the same registry: what one pilet registers the
    // other can import.
    let exports = consumer.import_module("producer/data@^1.0.0").await.unwrap();
    assert_eq!(exports.downcast::<String>().unwrap().as_str(), "payload");
    assert!(consumer.get_module("producer/data@1.0.0").is_some());
    assert!(consumer.require_module("producer/data@1.0.0").is_ok());
    assert!(consumer.require_module("absent").is_err());
}

#[test]
fn extension_downcast_mismatch_yields_none() {
    let registry = Arc::new(ModuleRegistry::new());
    let api = api_for(&registry, "sample");
    api.set_extension("count", Arc::new(5u32));
    assert!(api.extension_as::<String>("count").is_none());
    assert_eq!(*api.extension_as::<u32>("count").unwrap(), 5);
}
