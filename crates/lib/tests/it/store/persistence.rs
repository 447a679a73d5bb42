//! Tests for the load/save cycle around store operations.

use std::sync::Arc;

use docstash::{
    backend::{Gateway, InMemory},
    store::DocStore,
};
use serde_json::json;
use tempfile::TempDir;

use crate::helpers::*;

#[tokio::test]
async fn test_every_mutation_saves_once() {
    let ctx = TestContext::new().await;

    ctx.store()
        .merge_at_root(value(json!({"a": 1})))
        .await
        .unwrap();
    ctx.store()
        .set_or_merge_at_path(&path("b/c"), value(json!({"d": 1})))
        .await
        .unwrap();
    ctx.store().delete_at_path(&path("a")).await.unwrap();
    assert_eq!(ctx.gateway().save_count(), 3);

    // reads never save
    ctx.store().read_all().await;
    ctx.store().get_at_path(&path("b/c")).await.unwrap();
    assert_eq!(ctx.gateway().save_count(), 3);
}

#[tokio::test]
async fn test_failed_save_rolls_back_memory() {
    let ctx = TestContext::with_document(json!({"a": 1})).await;

    ctx.gateway().set_fail_writes(true);
    let err = ctx
        .store()
        .merge_at_root(value(json!({"b": 2})))
        .await
        .unwrap_err();
    assert!(err.is_persistence_failure());
    assert!(!err.is_not_found());

    let err = ctx.store().delete_at_path(&path("a")).await.unwrap_err();
    assert!(err.is_persistence_failure());

    // in-memory view matches durable state
    assert_eq!(to_json(ctx.store().read_all().await), json!({"a": 1}));
    assert_eq!(ctx.stored_json().await, json!({"a": 1}));

    ctx.gateway().set_fail_writes(false);
    ctx.store()
        .merge_at_root(value(json!({"c": 3})))
        .await
        .unwrap();
    assert_eq!(ctx.stored_json().await, json!({"a": 1, "c": 3}));
}

#[tokio::test]
async fn test_document_loaded_lazily_and_once() {
    let gateway = Arc::new(InMemory::with_contents(r#"{"a": 1}"#));
    let store = DocStore::open(gateway.clone()).await.unwrap();

    // nothing read yet, so a change behind the store's back is picked up
    gateway.save(&doc(json!({"a": 1, "b": 2}))).await.unwrap();
    assert_eq!(store.len().await, 2);

    // once loaded, the in-memory document is authoritative
    gateway.save(&doc(json!({"x": 1}))).await.unwrap();
    assert_eq!(to_json(store.read_all().await), json!({"a": 1, "b": 2}));
}

#[tokio::test]
async fn test_malformed_stored_document_loads_empty() {
    for contents in ["{invalid json", "", "   \n", "[1, 2, 3]", "42"] {
        let gateway = Arc::new(InMemory::with_contents(contents));
        let store = DocStore::open(gateway.clone()).await.unwrap();
        let loaded = store.read_all().await;
        assert!(loaded.is_empty(), "{contents:?} should load empty");

        // the next write replaces the unreadable content
        store.merge_at_root(value(json!({"k": "v"}))).await.unwrap();
        let stored: serde_json::Value =
            serde_json::from_str(&gateway.contents().await.unwrap()).unwrap();
        assert_eq!(stored, json!({"k": "v"}));
    }
}

#[tokio::test]
async fn test_open_creates_backing_file() {
    let dir = TempDir::new().unwrap();
    let (gateway, store) = file_store(&dir).await;

    assert!(gateway.path().exists());
    let text = std::fs::read_to_string(gateway.path()).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(stored, json!({}));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_file_store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let (_, store) = file_store(&dir).await;
        store
            .merge_at_root(value(json!({"alice": {"score": 10}})))
            .await
            .unwrap();
        store
            .set_or_merge_at_path(&path("alice/profile"), value(json!({"level": 3})))
            .await
            .unwrap();
    }

    let (_, reopened) = file_store(&dir).await;
    assert_eq!(
        to_json(reopened.read_all().await),
        json!({"alice": {"score": 10, "profile": {"level": 3}}})
    );
}

#[tokio::test]
async fn test_file_store_delete_missing_key_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    let (gateway, store) = file_store(&dir).await;
    store
        .merge_at_root(value(json!({"a": {"b": 1}})))
        .await
        .unwrap();
    let before = std::fs::read(gateway.path()).unwrap();

    for missing in ["nope", "a/nope"] {
        let err = store.delete_at_path(&path(missing)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    assert_eq!(std::fs::read(gateway.path()).unwrap(), before);
}
