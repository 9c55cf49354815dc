//! Repository collaborator interfaces.
//!
//! The reconciliation core talks to the two repositories only through the
//! traits in this module. Connection establishment, authentication, and the
//! selection query language all live behind these seams; the core never
//! interprets query text beyond substituting the project placeholder.
//!
//! [`snapshot::SnapshotRepository`] is the bundled file-backed
//! implementation used by the CLI and the integration tests.

pub mod queries;
pub mod snapshot;

pub use queries::{PROJECT_PLACEHOLDER, QueryFolder, StoredQuery, find_query, substitute_project};
pub use snapshot::SnapshotRepository;

use crate::Result;
use crate::models::{Changeset, LinkTypeEnd, WorkItem};

/// A work-item repository (source or target).
pub trait ItemRepository {
    /// Fetch a single work item by identifier.
    fn get_item(&self, id: u64) -> Result<WorkItem>;

    /// The relationship roles defined by this repository's type schema.
    fn link_type_ends(&self) -> Result<Vec<LinkTypeEnd>>;

    /// Run a selection query and return the matching items in query order.
    /// The query text is opaque to callers.
    fn query_items(&self, query_text: &str) -> Result<Vec<WorkItem>>;

    /// Persist a work item, replacing the stored version.
    fn save_item(&mut self, item: &WorkItem) -> Result<()>;
}

/// A version-control provider attached to a repository.
pub trait VersionControl {
    /// Resolve a changeset artifact URI to its changeset number.
    fn resolve_changeset(&self, artifact_uri: &str) -> Result<u64>;

    /// Field names defined by the repository's checkin-note schema.
    fn checkin_note_fields(&self) -> Result<Vec<String>>;

    /// Full changeset history, ordered from the first changeset to the
    /// latest.
    fn history(&self) -> Result<Vec<Changeset>>;
}

/// Access to the persisted stored-query tree of a repository.
pub trait QueryStore {
    /// The root of the stored-query folder hierarchy.
    fn query_root(&self) -> Result<QueryFolder>;
}
