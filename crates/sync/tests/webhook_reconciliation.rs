//! Reconciler behavior: convergence in one pass, quiescence on the next,
//! best-effort deletes, base URL resolution and re-pointing.

#![allow(clippy::unwrap_used)]

mod common;

use coral_sync::error::SyncError;
use coral_sync::store::SyncStore;
use coral_sync::webhooks::{
    DESIRED_WEBHOOKS, TopicStatus, reconcile, repoint, resolve_base_url,
};
use url::Url;

use common::{MemStore, ScriptedSource, shop_fixture, webhook_fixture};

const BASE_URL: &str = "https://app.example.com";

#[tokio::test]
async fn test_single_pass_converges_then_second_pass_is_quiescent() {
    let source = ScriptedSource::new(shop_fixture());
    // One subscription points at a retired base URL; every desired topic
    // is otherwise missing.
    source.webhooks.lock().unwrap().push(webhook_fixture(
        1,
        "products/create",
        "https://old.example.com/webhooks/products/create",
    ));

    let outcomes = reconcile(&source, BASE_URL).await.unwrap();

    assert_eq!(outcomes.len(), DESIRED_WEBHOOKS.len());
    assert!(outcomes.iter().all(|o| o.status == TopicStatus::Created));
    assert_eq!(source.deleted_webhooks.lock().unwrap().len(), 1);
    assert_eq!(source.created_webhooks.lock().unwrap().len(), 4);

    // Each created callback is the base URL plus the topic's path.
    for ((topic, path), (created_topic, created_url)) in DESIRED_WEBHOOKS
        .iter()
        .zip(source.created_webhooks.lock().unwrap().iter())
    {
        assert_eq!(topic, created_topic);
        assert_eq!(*created_url, format!("{BASE_URL}{path}"));
    }

    // Second pass against the converged state: zero creates, zero deletes.
    let outcomes = reconcile(&source, BASE_URL).await.unwrap();
    assert!(outcomes.iter().all(|o| o.status == TopicStatus::Exists));
    assert_eq!(source.deleted_webhooks.lock().unwrap().len(), 1);
    assert_eq!(source.created_webhooks.lock().unwrap().len(), 4);
}

#[tokio::test]
async fn test_failed_delete_does_not_abort_the_batch() {
    let mut source = ScriptedSource::new(shop_fixture());
    let stuck = webhook_fixture(
        1,
        "products/update",
        "https://old.example.com/webhooks/products/update",
    );
    source.failing_deletes = vec![stuck.id.clone()];
    {
        let mut webhooks = source.webhooks.lock().unwrap();
        webhooks.push(stuck);
        webhooks.push(webhook_fixture(
            2,
            "app/uninstalled",
            "https://old.example.com/webhooks/app/uninstalled",
        ));
    }

    let outcomes = reconcile(&source, BASE_URL).await.unwrap();

    // The deletable stale subscription went away; the stuck one stayed,
    // and the pass still created every desired topic afresh.
    assert_eq!(source.deleted_webhooks.lock().unwrap().len(), 1);
    assert!(outcomes.iter().all(|o| o.status == TopicStatus::Created));
}

#[tokio::test]
async fn test_create_failure_is_reported_per_topic() {
    let mut source = ScriptedSource::new(shop_fixture());
    source.failing_creates = vec!["app/uninstalled".to_string()];
    // One topic is already converged; one refuses to be created.
    source.webhooks.lock().unwrap().push(webhook_fixture(
        1,
        "products/create",
        &format!("{BASE_URL}/webhooks/products/create"),
    ));

    let outcomes = reconcile(&source, BASE_URL).await.unwrap();

    let existing = outcomes
        .iter()
        .find(|o| o.topic == "products/create")
        .unwrap();
    assert_eq!(existing.status, TopicStatus::Exists);

    let failed = outcomes
        .iter()
        .find(|o| o.topic == "app/uninstalled")
        .unwrap();
    assert_eq!(failed.status, TopicStatus::Failed);
    assert!(failed.detail.as_ref().unwrap().contains("Topic not allowed"));

    let created: Vec<_> = outcomes
        .iter()
        .filter(|o| o.status == TopicStatus::Created)
        .collect();
    assert_eq!(created.len(), 2);
}

#[tokio::test]
async fn test_repoint_persists_url_then_converges() {
    let source = ScriptedSource::new(shop_fixture());
    let store = MemStore::new();

    let url = Url::parse("https://app.example.com/").unwrap();
    let outcomes = repoint(&source, &store, &url).await.unwrap();

    assert_eq!(
        store.base_url().await.unwrap().as_deref(),
        Some("https://app.example.com")
    );
    assert_eq!(outcomes.len(), DESIRED_WEBHOOKS.len());
    assert!(outcomes.iter().all(|o| o.status == TopicStatus::Created));
}

#[tokio::test]
async fn test_base_url_resolution_prefers_persisted_setting() {
    let store = MemStore::new();
    store.set_base_url("https://persisted.example.com").await.unwrap();

    let resolved = resolve_base_url(&store, Some("https://fallback.example.com"))
        .await
        .unwrap();
    assert_eq!(resolved, "https://persisted.example.com");

    let store = MemStore::new();
    let resolved = resolve_base_url(&store, Some("https://fallback.example.com"))
        .await
        .unwrap();
    assert_eq!(resolved, "https://fallback.example.com");

    let store = MemStore::new();
    let result = resolve_base_url(&store, None).await;
    assert!(matches!(result, Err(SyncError::BaseUrlUnresolved)));
}
