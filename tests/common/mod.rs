//! Common test utilities for relink integration tests.
//!
//! Provides `TestEnv` for isolated test environments: each test gets a
//! temp directory holding the source and target snapshot files plus a
//! settings file, and commands run with the run log redirected into the
//! same directory so nothing touches the user's home.

#![allow(dead_code)]

use assert_cmd::Command;
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

pub struct TestEnv {
    pub dir: TempDir,
}

impl TestEnv {
    /// Create an empty test environment.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Create a test environment with the given snapshots written and a
    /// settings file pointing at them.
    pub fn with_snapshots(source: Value, target: Value) -> Self {
        let env = Self::new();
        env.write_json("source.json", &source);
        env.write_json("target.json", &target);
        fs::write(
            env.path().join("relink.toml"),
            r#"
[source]
snapshot = "source.json"

[target]
snapshot = "target.json"

[scope]
query = "Migrated Items"
project = "Fabrikam"
"#,
        )
        .unwrap();
        env
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_json(&self, name: &str, value: &Value) {
        fs::write(
            self.path().join(name),
            serde_json::to_string_pretty(value).unwrap(),
        )
        .unwrap();
    }

    pub fn read_json(&self, name: &str) -> Value {
        let data = fs::read_to_string(self.path().join(name)).unwrap();
        serde_json::from_str(&data).unwrap()
    }

    /// Get a Command for the rlk binary, rooted in this environment.
    pub fn rlk(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_rlk"));
        cmd.current_dir(self.path());
        cmd.env("RLK_LOG_PATH", self.path().join("run.log"));
        cmd.env_remove("RLK_CONFIG");
        cmd
    }

    pub fn run_log_path(&self) -> PathBuf {
        self.path().join("run.log")
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// A minimal target snapshot: items plus the standard schema, query tree,
/// and empty history.
pub fn target_snapshot(items: Value) -> Value {
    json!({
        "items": items,
        "link_type_ends": [{"name": "Child"}, {"name": "Duplicate"}],
        "changesets": [],
        "checkin_note_fields": [],
        "queries": {
            "name": "Shared Queries",
            "queries": [
                {"id": "q1", "name": "Migrated Items", "text": "project=@project all"}
            ],
            "folders": []
        }
    })
}

/// A minimal source snapshot: items only.
pub fn source_snapshot(items: Value) -> Value {
    json!({
        "items": items,
        "link_type_ends": [],
        "changesets": [],
        "checkin_note_fields": [],
        "queries": {"name": "", "queries": [], "folders": []}
    })
}
