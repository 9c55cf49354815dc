//! Relink - reconcile work-item links after a repository migration.
//!
//! When work items are copied from a source repository to a target
//! repository, each copy keeps a provenance field naming its source
//! counterpart, but the relationships *between* items (hyperlinks, related
//! links, external artifact links, changeset links) are not carried over.
//! This library computes and applies the missing links:
//!
//! - [`index`] maps source item identifiers to target item identifiers
//! - [`remap`] finds the target-side equivalent of a source changeset
//! - [`reconcile`] diffs one (source, target) item pair into links to add
//! - [`batch`] drives a whole run over a query-selected target scope

pub mod batch;
pub mod cli;
pub mod commands;
pub mod config;
pub mod index;
pub mod models;
pub mod reconcile;
pub mod remap;
pub mod repo;
pub mod run_log;

/// Library-level error type for relink operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings error: {0}")]
    Config(String),

    #[error("Work item not found: {0}")]
    ItemNotFound(u64),

    #[error("Stored query not found: {0}")]
    QueryNotFound(String),

    #[error("No changeset matches artifact URI: {0}")]
    ChangesetNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

/// Result type alias for relink operations.
pub type Result<T> = std::result::Result<T, Error>;
