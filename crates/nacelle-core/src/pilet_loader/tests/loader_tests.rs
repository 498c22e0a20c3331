use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;

use crate::capability::api::PiletApi;
use crate::pilet_loader::descriptor::PiletDescriptor;
use crate::pilet_loader::error::PiletSystemError;
use crate::pilet_loader::traits::{
    FeedSource, FileFeedSource, Pilet, PiletLoader, StaticFeedSource, StaticPiletLoader,
};

struct NoopPilet;

#[async_trait]
impl Pilet for NoopPilet {
    async fn setup(&self, _api: PiletApi) -> Result<(), PiletSystemError> {
        Ok(())
    }
}

#[tokio::test]
async fn static_loader_serves_registered_instances() {
    let loader = StaticPiletLoader::new().with("known", Arc::new(NoopPilet));

    assert!(loader
        .load(&PiletDescriptor::new("known", "1.0.0"))
        .await
        .is_ok());

    let err = loader
        .load(&PiletDescriptor::new("unknown", "1.0.0"))
        .await
        .err()
        .unwrap();
    match err {
        PiletSystemError::FetchFailure { pilet, .. } => assert_eq!(pilet, "unknown"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn file_feed_reads_wrapped_and_bare_shapes() {
    let mut wrapped = tempfile::NamedTempFile::new().unwrap();
    write!(
        wrapped,
        r#"{{"items": [{{"name": "a", "version": "1.0.0"}}]}}"#
    )
    .unwrap();
    let source = FileFeedSource::new(wrapped.path());
    let items = source.fetch_pilets().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "a");

    let mut bare = tempfile::NamedTempFile::new().unwrap();
    write!(bare, r#"[{{"name": "b", "version": "2.0.0"}}]"#).unwrap();
    let items = FileFeedSource::new(bare.path()).fetch_pilets().await.unwrap();
    assert_eq!(items[0].name, "b");
}

#[tokio::test]
async fn missing_feed_file_is_a_feed_failure() {
    let source = FileFeedSource::new("/definitely/not/here.json");
    let err = source.fetch_pilets().await.unwrap_err();
    assert!(matches!(err, PiletSystemError::FeedFailure { .. }));
}

#[tokio::test]
async fn static_feed_returns_its_items() {
    let source = StaticFeedSource::new(vec![
        PiletDescriptor::new("a", "1.0.0"),
        PiletDescriptor::new("b", "2.0.0"),
    ]);
    let items = source.fetch_pilets().await.unwrap();
    assert_eq!(items.len(), 2);
}
