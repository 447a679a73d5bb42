//! End-to-end store scenarios.

use docstash::doc::Value;
use serde_json::json;

use crate::helpers::*;

#[tokio::test]
async fn test_player_profile_lifecycle() {
    let ctx = TestContext::new().await;
    let store = ctx.store();

    store
        .merge_at_root(value(json!({"alice": {"score": 10}})))
        .await
        .unwrap();
    assert_eq!(
        to_json(store.read_all().await),
        json!({"alice": {"score": 10}})
    );

    let err = store
        .set_or_merge_at_path(&path("alice/score"), value(json!({"best": 11})))
        .await
        .unwrap_err();
    assert!(err.is_type_error());
    assert_eq!(
        to_json(store.read_all().await),
        json!({"alice": {"score": 10}})
    );

    store
        .set_or_merge_at_path(&path("alice/profile"), value(json!({"level": 3})))
        .await
        .unwrap();
    assert_eq!(
        store.get_at_path(&path("alice")).await.unwrap(),
        value(json!({"score": 10, "profile": {"level": 3}}))
    );

    store.delete_at_path(&path("alice/profile")).await.unwrap();
    assert_eq!(
        store.get_at_path(&path("alice")).await.unwrap(),
        value(json!({"score": 10}))
    );
    assert_eq!(ctx.stored_json().await, json!({"alice": {"score": 10}}));
}

#[tokio::test]
async fn test_scalar_write_grows_document_by_one() {
    let ctx = TestContext::with_document(json!({"alice": {"score": 10}, "bob": {}})).await;

    let before = ctx.store().len().await;
    let size = ctx.store().merge_at_root(Value::from(42)).await.unwrap();
    assert_eq!(size, before + 1);

    let doc = ctx.store().read_all().await;
    assert_eq!(doc.iter().filter(|(_, v)| **v == 42).count(), 1);
}

#[tokio::test]
async fn test_stored_round_trip_is_stable() {
    let ctx = TestContext::with_document(json!({
        "z": [1, {"nested": true}],
        "a": {"f": 1.5, "n": null, "s": "text"}
    }))
    .await;

    let loaded = ctx.store().read_all().await;
    // an empty merge forces Save(Load())
    ctx.store().merge_at_root(value(json!({}))).await.unwrap();

    assert_eq!(ctx.stored_json().await, to_json(loaded));
}
