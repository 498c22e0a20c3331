use std::sync::Arc;

use async_trait::async_trait;

use crate::capability::api::PiletApi;
use crate::host::bootstrap::PluginHost;
use crate::host::config::HostConfig;
use crate::host::error::{Error, HostLifecyclePhase};
use crate::module_registry::exports::SharedValue;
use crate::pilet_loader::descriptor::PiletDescriptor;
use crate::pilet_loader::error::PiletSystemError;
use crate::pilet_loader::strategy::LoadingStrategy;
use crate::pilet_loader::traits::{FeedSource, Pilet, StaticFeedSource, StaticPiletLoader};

struct NoopPilet;

#[async_trait]
impl Pilet for NoopPilet {
    async fn setup(&self, _api: PiletApi) -> Result<(), PiletSystemError> {
        Ok(())
    }
}

/// Imports a seeded shared dependency during setup.
struct ThemedPilet;

#[async_trait]
impl Pilet for ThemedPilet {
    async fn setup(&self, api: PiletApi) -> Result<(), PiletSystemError> {
        let theme = api
            .import_module("theme")
            .await
            .map_err(|e| PiletSystemError::setup_failure(&api.owner().name, e.to_string()))?;
        assert_eq!(theme.downcast::<String>().unwrap().as_str(), "dark");
        Ok(())
    }
}

struct BrokenFeed;

#[async_trait]
impl FeedSource for BrokenFeed {
    async fn fetch_pilets(&self) -> Result<Vec<PiletDescriptor>, PiletSystemError> {
        Err(PiletSystemError::FeedFailure {
            message: "backend unreachable".to_string(),
            source: None,
        })
    }
}

#[test]
fn builder_requires_feed_and_loader() {
    assert!(PluginHost::builder().build().is_err());
    assert!(PluginHost::builder()
        .with_feed(StaticFeedSource::default())
        .build()
        .is_err());
    assert!(PluginHost::builder()
        .with_feed(StaticFeedSource::default())
        .with_loader(StaticPiletLoader::new())
        .build()
        .is_ok());
}

#[tokio::test]
async fn bootstrap_seeds_before_any_pilet_loads() {
    let mut host = PluginHost::builder()
        .share_dependency("theme", Arc::new("dark".to_string()) as SharedValue)
        .with_feed(StaticFeedSource::new(vec![PiletDescriptor::new(
            "themed", "1.0.0",
        )]))
        .with_loader(StaticPiletLoader::new().with("themed", Arc::new(ThemedPilet)))
        .build()
        .unwrap();

    let outcome = host.bootstrap().await.unwrap();
    assert!(outcome.is_fully_active());
    assert!(host.is_bootstrapped());
    assert!(host.registry().get("theme").is_some());
    assert_eq!(host.active_pilets().len(), 1);
}

#[tokio::test]
async fn bootstrap_twice_is_a_lifecycle_error() {
    let mut host = PluginHost::builder()
        .with_feed(StaticFeedSource::default())
        .with_loader(StaticPiletLoader::new())
        .build()
        .unwrap();

    host.bootstrap().await.unwrap();
    assert!(matches!(
        host.bootstrap().await,
        Err(Error::Lifecycle {
            phase: HostLifecyclePhase::Load,
            ..
        })
    ));
}

#[tokio::test]
async fn feed_failure_aborts_bootstrap() {
    let mut host = PluginHost::builder()
        .with_feed(BrokenFeed)
        .with_loader(StaticPiletLoader::new())
        .build()
        .unwrap();

    match host.bootstrap().await {
        Err(Error::Lifecycle { phase, .. }) => assert_eq!(phase, HostLifecyclePhase::Discover),
        other => panic!("expected discover failure, got {other:?}"),
    }
    assert!(!host.is_bootstrapped());
}

#[tokio::test]
async fn extenders_shape_every_pilet_surface() {
    let mut host = PluginHost::builder()
        .with_feed(StaticFeedSource::new(vec![PiletDescriptor::new(
            "plain", "1.0.0",
        )]))
        .with_loader(StaticPiletLoader::new().with("plain", Arc::new(NoopPilet)))
        .with_extender(|api, descriptor| {
            api.set_extension("greeting", Arc::new(format!("hello {}", descriptor.name)));
            api
        })
        .build()
        .unwrap();

    let outcome = host.bootstrap().await.unwrap();
    let api = &outcome.active[0].api;
    assert_eq!(
        api.extension_as::<String>("greeting").unwrap().as_str(),
        "hello plain"
    );
    // The composer's side table records the same surface.
    let recorded = host.composer().composed_for("plain").unwrap();
    assert!(PiletApi::same_instance(api, &recorded));
}

#[tokio::test]
async fn on_demand_pilets_activate_through_the_host() {
    let mut host = PluginHost::builder()
        .with_feed(StaticFeedSource::new(vec![PiletDescriptor::new(
            "lazy", "1.0.0",
        )]))
        .with_loader(StaticPiletLoader::new().with("lazy", Arc::new(NoopPilet)))
        .with_strategy(LoadingStrategy::OnDemand)
        .build()
        .unwrap();

    let outcome = host.bootstrap().await.unwrap();
    assert!(outcome.active.is_empty());
    assert_eq!(host.parked_pilets(), vec!["lazy"]);

    host.request_pilet("lazy").await.unwrap();
    assert_eq!(host.active_pilets().len(), 1);
    assert!(host.parked_pilets().is_empty());
}

#[tokio::test]
async fn shutdown_tears_active_pilets_down() {
    let mut host = PluginHost::builder()
        .with_feed(StaticFeedSource::new(vec![
            PiletDescriptor::new("a", "1.0.0"),
            PiletDescriptor::new("b", "1.0.0"),
        ]))
        .with_loader(
            StaticPiletLoader::new()
                .with("a", Arc::new(NoopPilet))
                .with("b", Arc::new(NoopPilet)),
        )
        .with_strategy(LoadingStrategy::Sequential)
        .build()
        .unwrap();

    host.bootstrap().await.unwrap();
    assert_eq!(host.active_pilets().len(), 2);

    host.shutdown().await.unwrap();
    assert!(host.active_pilets().is_empty());
    assert!(!host.is_bootstrapped());
}

#[tokio::test]
async fn config_applies_strategy_and_timeout() {
    let config = HostConfig::from_json_str(
        r#"{"strategy": "on-demand", "setup_timeout_ms": 100}"#,
    )
    .unwrap();

    let mut host = PluginHost::builder()
        .with_feed(StaticFeedSource::new(vec![PiletDescriptor::new(
            "lazy", "1.0.0",
        )]))
        .with_loader(StaticPiletLoader::new().with("lazy", Arc::new(NoopPilet)))
        .with_config(&config)
        .build()
        .unwrap();

    host.bootstrap().await.unwrap();
    // On-demand strategy from the config file: nothing activates eagerly.
    assert_eq!(host.parked_pilets(), vec!["lazy"]);
}
