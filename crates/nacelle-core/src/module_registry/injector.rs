//! Seeding of host-provided shared dependencies.
//!
//! Before any pilet loads, every shared dependency declared by the host is
//! registered as a synchronous factory and then imported once, concurrently,
//! to force early materialization. Broken wiring therefore surfaces during
//! bootstrap instead of inside the first pilet that asks for the module.

use futures::future::try_join_all;

use crate::module_registry::error::ModuleSystemError;
use crate::module_registry::registry::ModuleRegistry;
use crate::module_registry::SharedDependencies;

/// Registers all shared dependencies and awaits their materialization.
///
/// Any failure is fatal for host initialization: pilets cannot operate
/// without the shared modules the host declared for them.
pub async fn seed(
    registry: &ModuleRegistry,
    shared: SharedDependencies,
) -> Result<(), ModuleSystemError> {
    let names: Vec<String> = shared.keys().cloned().collect();
    for (name, value) in shared {
        registry.register_value(&name, None, value);
    }
    log::info!("seeding {} shared dependencies", names.len());

    let imports = names.into_iter().map(|name| async move {
        registry
            .import(&name)
            .await
            .map_err(|e| ModuleSystemError::SeedFailed {
                name: name.clone(),
                source: Box::new(e),
            })
            .map(|_| ())
    });
    try_join_all(imports).await?;
    Ok(())
}
