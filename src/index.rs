//! Source-to-target identifier index.
//!
//! Built once per run from the query-selected target items, then consulted
//! read-only during reconciliation.

use crate::models::WorkItem;
use std::collections::HashMap;
use tracing::warn;

/// Mapping from source item identifier to target item identifier.
///
/// Each source identifier maps to at most one target: when a second target
/// item claims the same source provenance, the first claim wins and the
/// duplicate is rejected with a warning.
#[derive(Debug, Default)]
pub struct IdentifierIndex {
    map: HashMap<u64, u64>,
    duplicates: usize,
    parse_errors: usize,
}

impl IdentifierIndex {
    /// Build the index from a collection of target items.
    ///
    /// Items without a provenance field are ignored; items whose provenance
    /// does not parse as an identifier are counted and warned about, the
    /// same way the batch loop treats them later.
    pub fn build(items: &[WorkItem]) -> Self {
        let mut index = Self::default();
        for item in items {
            match item.source_id() {
                Some(Ok(source_id)) => {
                    if let Some(&first) = index.map.get(&source_id) {
                        warn!(
                            source_id,
                            first_target = first,
                            duplicate_target = item.id,
                            "duplicate provenance claim; keeping first"
                        );
                        index.duplicates += 1;
                    } else {
                        index.map.insert(source_id, item.id);
                    }
                }
                Some(Err(raw)) => {
                    warn!(target_id = item.id, raw, "unparseable provenance field");
                    index.parse_errors += 1;
                }
                None => {}
            }
        }
        index
    }

    /// Target identifier mirrored from the given source identifier.
    pub fn get(&self, source_id: u64) -> Option<u64> {
        self.map.get(&source_id).copied()
    }

    /// Iterate all (source, target) pairs, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.map.iter().map(|(&s, &t)| (s, t))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Number of rejected duplicate provenance claims.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Number of provenance fields that failed to parse.
    pub fn parse_errors(&self) -> usize {
        self.parse_errors
    }
}
