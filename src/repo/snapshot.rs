//! JSON-file-backed repository snapshot.
//!
//! Live tracker connections are out of scope for the core; the snapshot
//! backend stands in for one repository by loading its whole state (items,
//! type schema, changeset history, stored queries) from a single JSON file.
//! Saving an item rewrites the file.
//!
//! Stored-query text is opaque to the core; this backend interprets a tiny
//! selection form of its own:
//!
//! - `all` - every item in the snapshot, in stored order
//! - `ids:1,2,3` - the listed items, in listed order
//!
//! Any other whitespace-separated token (e.g. a substituted
//! `project=Fabrikam`) is ignored by this backend.

use crate::models::{Changeset, LinkTypeEnd, WorkItem};
use crate::repo::{ItemRepository, QueryFolder, QueryStore, VersionControl};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk snapshot of one repository.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub items: Vec<WorkItem>,

    #[serde(default)]
    pub link_type_ends: Vec<LinkTypeEnd>,

    #[serde(default)]
    pub changesets: Vec<Changeset>,

    #[serde(default)]
    pub checkin_note_fields: Vec<String>,

    #[serde(default)]
    pub queries: QueryFolder,
}

/// A repository backed by a snapshot file.
#[derive(Debug)]
pub struct SnapshotRepository {
    path: PathBuf,
    snapshot: Snapshot,
}

impl SnapshotRepository {
    /// Load a snapshot file. Unreadable or malformed files are fatal: a run
    /// cannot proceed without both repositories reachable.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read snapshot {}: {}", path.display(), e)))?;
        let snapshot: Snapshot = serde_json::from_str(&data)
            .map_err(|e| Error::Config(format!("malformed snapshot {}: {}", path.display(), e)))?;
        Ok(Self {
            path: path.to_path_buf(),
            snapshot,
        })
    }

    /// All items in the snapshot, in stored order.
    pub fn items(&self) -> &[WorkItem] {
        &self.snapshot.items
    }

    fn persist(&self) -> Result<()> {
        let data = serde_json::to_string_pretty(&self.snapshot)?;
        fs::write(&self.path, data)?;
        Ok(())
    }

    fn run_query(&self, query_text: &str) -> Result<Vec<WorkItem>> {
        for token in query_text.split_whitespace() {
            if token == "all" {
                return Ok(self.snapshot.items.clone());
            }
            if let Some(list) = token.strip_prefix("ids:") {
                let mut items = Vec::new();
                for part in list.split(',').filter(|p| !p.is_empty()) {
                    let id: u64 = part.parse().map_err(|_| {
                        Error::InvalidInput(format!("bad id in query text: {}", part))
                    })?;
                    if let Some(item) = self.snapshot.items.iter().find(|i| i.id == id) {
                        items.push(item.clone());
                    }
                }
                return Ok(items);
            }
        }
        Err(Error::InvalidInput(format!(
            "unsupported query text: {}",
            query_text
        )))
    }
}

impl ItemRepository for SnapshotRepository {
    fn get_item(&self, id: u64) -> Result<WorkItem> {
        self.snapshot
            .items
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or(Error::ItemNotFound(id))
    }

    fn link_type_ends(&self) -> Result<Vec<LinkTypeEnd>> {
        Ok(self.snapshot.link_type_ends.clone())
    }

    fn query_items(&self, query_text: &str) -> Result<Vec<WorkItem>> {
        self.run_query(query_text)
    }

    fn save_item(&mut self, item: &WorkItem) -> Result<()> {
        let slot = self
            .snapshot
            .items
            .iter_mut()
            .find(|existing| existing.id == item.id)
            .ok_or(Error::ItemNotFound(item.id))?;
        *slot = item.clone();
        self.persist()
    }
}

impl VersionControl for SnapshotRepository {
    fn resolve_changeset(&self, artifact_uri: &str) -> Result<u64> {
        self.snapshot
            .changesets
            .iter()
            .find(|cs| cs.artifact_uri == artifact_uri)
            .map(|cs| cs.id)
            .ok_or_else(|| Error::ChangesetNotFound(artifact_uri.to_string()))
    }

    fn checkin_note_fields(&self) -> Result<Vec<String>> {
        Ok(self.snapshot.checkin_note_fields.clone())
    }

    fn history(&self) -> Result<Vec<Changeset>> {
        // History order is changeset-number order, oldest first.
        let mut history = self.snapshot.changesets.clone();
        history.sort_by_key(|cs| cs.id);
        Ok(history)
    }
}

impl QueryStore for SnapshotRepository {
    fn query_root(&self) -> Result<QueryFolder> {
        Ok(self.snapshot.queries.clone())
    }
}
