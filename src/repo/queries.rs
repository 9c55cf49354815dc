//! Stored-query folder tree and name resolution.

use serde::{Deserialize, Serialize};

/// Placeholder in stored-query text replaced by the project scope before the
/// query runs.
pub const PROJECT_PLACEHOLDER: &str = "@project";

/// A persisted selection query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredQuery {
    /// Identifier assigned by the repository
    pub id: String,

    /// Human-readable name, matched case-insensitively
    pub name: String,

    /// Query text in the repository's own selection language
    pub text: String,
}

/// A folder in the stored-query hierarchy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryFolder {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub queries: Vec<StoredQuery>,

    #[serde(default)]
    pub folders: Vec<QueryFolder>,
}

/// Find a stored query by name.
///
/// Walks the folder tree depth-first: a folder's own queries are checked
/// before its subfolders, in stored order. Name matching is
/// case-insensitive and the first match wins.
pub fn find_query<'a>(root: &'a QueryFolder, name: &str) -> Option<&'a StoredQuery> {
    for query in &root.queries {
        if query.name.eq_ignore_ascii_case(name) {
            return Some(query);
        }
    }
    for folder in &root.folders {
        if let Some(query) = find_query(folder, name) {
            return Some(query);
        }
    }
    None
}

/// Substitute the project placeholder in query text.
pub fn substitute_project(text: &str, project: &str) -> String {
    text.replace(PROJECT_PLACEHOLDER, project)
}
