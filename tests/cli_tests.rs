//! CLI tests for the `price-feed` binary

mod common;

use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_help_mentions_wire_format() {
    common::price_feed_command()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ws/prices"));
}

#[test]
fn test_items_prints_sample_catalog() {
    let output = common::price_feed_command()
        .arg("items")
        .output()
        .unwrap();

    assert!(output.status.success());
    let items: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(items.as_array().unwrap().len(), 7);
}

#[test]
fn test_items_with_filters() {
    let output = common::price_feed_command()
        .args(["items", "--category", "CLOTHING", "--min-price", "400"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let items: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let items = items.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], "item6");
}

#[test]
fn test_items_from_seed_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(br#"[{"id": "lamp", "name": "Lamp", "price": "$12.00 USD"}]"#)
        .unwrap();

    common::price_feed_command()
        .arg("items")
        .arg("--items")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\": \"lamp\""))
        .stdout(predicate::str::contains("Uncategorized"));
}

#[test]
fn test_items_with_missing_seed_file_fails() {
    common::price_feed_command()
        .args(["items", "--items", "/nonexistent/items.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("INTERNAL_ERROR"));
}

#[test]
fn test_items_with_empty_seed_file_fails() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"[]").unwrap();

    common::price_feed_command()
        .arg("items")
        .arg("--items")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("INVALID_INPUT"));
}

#[test]
fn test_serve_rejects_invalid_env_port() {
    common::price_feed_command()
        .env("PRICE_FEED_PORT", "eighty")
        .arg("serve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("PRICE_FEED_PORT"));
}
