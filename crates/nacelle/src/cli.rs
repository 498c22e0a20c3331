use std::path::Path;
use std::sync::Arc;

use nacelle_core::host::bootstrap::PluginHost;
use nacelle_core::host::config::HostConfig;
use nacelle_core::host::error::Result;
use nacelle_core::module_registry::version;
use nacelle_core::pilet_loader::descriptor::PiletDescriptor;
use nacelle_core::pilet_loader::hooks::LifecycleHooks;
use nacelle_core::pilet_loader::pipeline::LoadOutcome;
use nacelle_core::pilet_loader::strategy::LoadingStrategy;
use nacelle_core::pilet_loader::traits::{FileFeedSource, StaticFeedSource, StaticPiletLoader};

/// Prints one feed entry per line.
pub fn print_feed(items: &[PiletDescriptor]) {
    if items.is_empty() {
        println!("  Feed lists no pilets.");
        return;
    }
    for item in items {
        let spec = item.spec.as_deref().unwrap_or("default");
        println!(
            "  - {} v{} (spec: {}, link: {})",
            item.name,
            item.version,
            spec,
            if item.link.is_empty() { "<none>" } else { &item.link }
        );
    }
}

/// Validates versions and dependency ranges of every feed entry.
///
/// Returns the number of problems found.
pub fn check_feed(items: &[PiletDescriptor]) -> usize {
    let mut problems = 0;
    for item in items {
        if !version::validate(&item.version) {
            println!("  [!] {}: invalid version '{}'", item.name, item.version);
            problems += 1;
        }
        for (dep, range) in &item.dependencies {
            if !version::validate(range) {
                println!(
                    "  [!] {}: invalid range '{}' for dependency '{}'",
                    item.name, range, dep
                );
                problems += 1;
            }
        }
    }
    problems
}

/// Resolves a requested module id against the feed's registrations.
pub fn resolve_against_feed(items: &[PiletDescriptor], id: &str) -> Option<String> {
    let registry = nacelle_core::module_registry::registry::ModuleRegistry::new();
    for item in items {
        registry.register_value(&item.name, Some(&item.version), Arc::new(item.clone()));
    }
    registry.resolve(id).map(|r| r.id().to_string())
}

/// Assembles the demo host: file feed (when given), statically registered
/// in-tree pilets, a greeting capability and logging lifecycle hooks.
pub fn build_demo_host(
    feed_path: Option<&Path>,
    strategy: LoadingStrategy,
    config: Option<&HostConfig>,
) -> Result<PluginHost> {
    let loader = StaticPiletLoader::new().with("hello", hello_pilet::instance());

    let hooks = LifecycleHooks::new()
        .on_before_setup(|d| log::info!("setting up pilet '{}'", d.name))
        .on_after_setup(|d, err| match err {
            None => log::info!("pilet '{}' set up", d.name),
            Some(e) => log::warn!("pilet '{}' failed: {e}", d.name),
        });

    let mut builder = PluginHost::builder()
        .with_loader(loader)
        .with_hooks(hooks)
        .with_extender(|api, _| {
            api.set_extension("greeting", Arc::new("Hello from nacelle".to_string()));
            api
        });

    // An explicit feed path wins over the configured one; with neither, the
    // host announces the statically linked pilets themselves.
    if let Some(path) = feed_path {
        builder = builder.with_feed(FileFeedSource::new(path));
    }
    if let Some(config) = config {
        builder = builder.with_config(config);
    }
    let has_feed = feed_path.is_some() || config.is_some_and(|c| c.feed.is_some());
    if !has_feed {
        builder = builder.with_feed(StaticFeedSource::new(vec![
            hello_pilet::HelloPilet::descriptor(),
        ]));
    }

    builder.with_strategy(strategy).build()
}

/// Prints the outcome of a load attempt.
pub fn print_outcome(outcome: &LoadOutcome, host: &PluginHost) {
    println!(
        "Load finished: {} active, {} failed.",
        outcome.active.len(),
        outcome.failed.len()
    );
    for pilet in &outcome.active {
        println!("  [ok] {}", pilet.descriptor.qualified_name());
    }
    for failed in &outcome.failed {
        println!(
            "  [failed] {}: {}",
            failed.descriptor.qualified_name(),
            failed.error
        );
    }
    let parked = host.parked_pilets();
    if !parked.is_empty() {
        println!("  Parked for on-demand activation: {}", parked.join(", "));
    }
    let modules = host.registry().registrations();
    if !modules.is_empty() {
        println!("  Registered modules: {}", modules.join(", "));
    }
}
