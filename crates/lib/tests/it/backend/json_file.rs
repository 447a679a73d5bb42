use std::fs;

use docstash::backend::{BackendError, Gateway, JsonFile};
use serde_json::json;
use tempfile::TempDir;

use crate::helpers::*;

#[tokio::test]
async fn test_ensure_exists_creates_empty_object() {
    let dir = TempDir::new().unwrap();
    let gateway = JsonFile::new(dir.path().join("nested/dirs/data.json"));

    gateway.ensure_exists().await.unwrap();

    let text = fs::read_to_string(gateway.path()).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(stored, json!({}));
}

#[tokio::test]
async fn test_ensure_exists_keeps_existing_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("data.json");
    fs::write(&file, r#"{"kept": true}"#).unwrap();

    JsonFile::new(&file).ensure_exists().await.unwrap();
    assert_eq!(fs::read_to_string(&file).unwrap(), r#"{"kept": true}"#);
}

#[tokio::test]
async fn test_load_missing_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let gateway = JsonFile::new(dir.path().join("absent.json"));
    assert!(gateway.load().await.is_empty());
    // loading never creates the file
    assert!(!gateway.path().exists());
}

#[tokio::test]
async fn test_load_unusable_contents_is_empty() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("data.json");
    let gateway = JsonFile::new(&file);

    let cases: [&[u8]; 6] = [
        b"",
        b"  \n\t",
        b"{invalid json",
        b"[1, 2, 3]",
        b"\"just a string\"",
        &[0xff, 0xfe, 0x00, 0x7b],
    ];
    for contents in cases {
        fs::write(&file, contents).unwrap();
        assert!(
            gateway.load().await.is_empty(),
            "{contents:?} should load as an empty document"
        );
    }
}

#[tokio::test]
async fn test_save_is_pretty_printed_and_atomic() {
    let dir = TempDir::new().unwrap();
    let gateway = JsonFile::new(dir.path().join("data.json"));

    gateway
        .save(&doc(json!({"b": {"c": [1, 2]}, "a": "x"})))
        .await
        .unwrap();

    let text = fs::read_to_string(gateway.path()).unwrap();
    assert!(text.contains('\n'), "output should span multiple lines");
    assert!(text.ends_with('\n'));
    assert!(text.find("\"a\"").unwrap() < text.find("\"b\"").unwrap());

    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(leftovers, vec![std::ffi::OsString::from("data.json")]);
}

#[tokio::test]
async fn test_save_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let gateway = JsonFile::new(dir.path().join("data.json"));
    let original = doc(json!({
        "alice": {"score": 10, "tags": ["a", "b"]},
        "ratio": 0.25,
        "none": null,
        "flag": false
    }));

    gateway.save(&original).await.unwrap();
    let first = fs::read(gateway.path()).unwrap();

    let loaded = gateway.load().await;
    assert_eq!(loaded, original);

    gateway.save(&loaded).await.unwrap();
    assert_eq!(fs::read(gateway.path()).unwrap(), first);
}

#[tokio::test]
async fn test_save_into_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    let gateway = JsonFile::new(dir.path().join("missing/data.json"));

    let err = gateway.save(&doc(json!({"a": 1}))).await.unwrap_err();
    assert!(err.is_persistence_failure());
    assert_eq!(err.module(), "backend");
    match err {
        docstash::Error::Backend(BackendError::FileIo { path, .. }) => {
            assert_eq!(path, dir.path().join("missing/data.json.tmp"));
        }
        other => panic!("Unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_save_replaces_larger_file_completely() {
    let dir = TempDir::new().unwrap();
    let gateway = JsonFile::new(dir.path().join("data.json"));
    let long = "x".repeat(4096);
    let padded = doc(json!({ "padding": long }));
    gateway.save(&padded).await.unwrap();
    // a stale temp file from an earlier crash is truncated, not appended to
    fs::write(dir.path().join("data.json.tmp"), "garbage".repeat(1000)).unwrap();

    gateway.save(&doc(json!({"a": 1}))).await.unwrap();

    let text = fs::read_to_string(gateway.path()).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(stored, json!({"a": 1}));
    assert!(!dir.path().join("data.json.tmp").exists());
}
