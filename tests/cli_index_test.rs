//! Integration tests for `rlk index` via the CLI.

mod common;

use common::{TestEnv, source_snapshot, target_snapshot};
use predicates::prelude::*;
use serde_json::json;

#[test]
fn test_index_lists_mappings() {
    let source = source_snapshot(json!([]));
    let target = target_snapshot(json!([
        {"id": 500, "title": "a", "source_ref": "100", "links": []},
        {"id": 501, "title": "b", "source_ref": "101", "links": []},
        {"id": 502, "title": "local only", "links": []}
    ]));
    let env = TestEnv::with_snapshots(source, target);

    env.rlk()
        .args(["index"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""source_id": 100"#))
        .stdout(predicate::str::contains(r#""target_id": 500"#))
        .stdout(predicate::str::contains(r#""source_id": 101"#))
        .stdout(predicate::str::contains(r#""duplicates": 0"#));
}

#[test]
fn test_index_rejects_duplicate_provenance() {
    let source = source_snapshot(json!([]));
    let target = target_snapshot(json!([
        {"id": 500, "title": "first claim", "source_ref": "100", "links": []},
        {"id": 600, "title": "second claim", "source_ref": "100", "links": []}
    ]));
    let env = TestEnv::with_snapshots(source, target);

    env.rlk()
        .args(["index"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""target_id": 500"#))
        .stdout(predicate::str::contains(r#""duplicates": 1"#))
        .stdout(predicate::str::contains(r#""target_id": 600"#).not());
}

#[test]
fn test_index_counts_parse_errors() {
    let source = source_snapshot(json!([]));
    let target = target_snapshot(json!([
        {"id": 500, "title": "bad ref", "source_ref": "vstfs:///oops", "links": []}
    ]));
    let env = TestEnv::with_snapshots(source, target);

    env.rlk()
        .args(["index"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""parse_errors": 1"#));
}

#[test]
fn test_index_human_output() {
    let source = source_snapshot(json!([]));
    let target = target_snapshot(json!([
        {"id": 500, "title": "a", "source_ref": "100", "links": []}
    ]));
    let env = TestEnv::with_snapshots(source, target);

    env.rlk()
        .args(["index", "--human"])
        .assert()
        .success()
        .stdout(predicate::str::contains("100 -> 500"))
        .stdout(predicate::str::contains("1 mapped"));
}
