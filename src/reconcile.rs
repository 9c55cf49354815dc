//! Link reconciliation engine.
//!
//! Diffs the links on a source work item against its mirrored target item
//! and stages the links missing from the target, with source-side item
//! identifiers remapped into the target identifier space and changeset
//! references remapped through the target's history. Staged links are
//! deduplicated against the target's existing links and capped per item.

use crate::index::IdentifierIndex;
use crate::models::{Link, WorkItem};
use crate::remap::ChangesetRemapper;
use std::collections::HashSet;
use tracing::{debug, error, warn};

/// Hard ceiling on links staged for a single item in one save.
///
/// Bulk saves carrying more simultaneous relationship mutations than this
/// are known to fail on the server side, so staging stops at the cap and
/// the rest of the source links go unexamined for staging purposes.
pub const MAX_LINKS_PER_ITEM: usize = 30;

/// Per-category toggles for the engine. Disabling a category suppresses
/// staging only; found/existing statistics are collected regardless.
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    pub include_related: bool,
    pub include_changesets: bool,
    pub include_external: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            include_related: true,
            include_changesets: true,
            include_external: true,
        }
    }
}

/// Counters collected while reconciling one item pair.
#[derive(Debug, Default, Clone)]
pub struct LinkStats {
    /// Links found on the source item, per category
    pub source_hyperlinks: usize,
    pub source_related: usize,
    pub source_changesets: usize,
    pub source_external: usize,

    /// Links already present on the target item, per category
    pub existing_hyperlinks: usize,
    pub existing_related: usize,
    pub existing_changesets: usize,
    pub existing_external: usize,

    /// Related links whose referenced item was never mirrored
    pub missing_related: usize,

    /// Related links skipped because the counterpart item was already
    /// processed this run
    pub cross_link_skips: usize,

    /// Related links whose type end is unknown to the target schema
    pub unknown_type_ends: usize,

    /// Whether staging hit the per-item cap
    pub capped: bool,
}

/// Result of reconciling one (source, target) pair: the links to add, in
/// source order, plus the statistics gathered along the way.
#[derive(Debug, Default)]
pub struct AddedLinks {
    pub links: Vec<Link>,
    pub stats: LinkStats,
}

impl AddedLinks {
    fn stage(&mut self, target_id: u64, link: Link) {
        if self.links.len() >= MAX_LINKS_PER_ITEM {
            if !self.stats.capped {
                warn!(
                    target_id,
                    cap = MAX_LINKS_PER_ITEM,
                    "link cap reached; dropping remaining candidate links"
                );
            }
            self.stats.capped = true;
            return;
        }
        debug!(target_id, kind = link.kind_name(), "staging link");
        self.links.push(link);
    }
}

/// Compute the links to add to `target` so that it mirrors the links on
/// `source`.
///
/// `processed` holds target identifiers already persisted this run;
/// related links into that set are skipped because the counterpart side of
/// the relationship was very likely created when that item was saved, and
/// the in-memory view of this item may be stale. `type_ends` is the target
/// schema's set of relationship roles.
pub fn reconcile(
    source: &WorkItem,
    target: &WorkItem,
    config: &ReconcileConfig,
    index: &IdentifierIndex,
    remapper: &ChangesetRemapper<'_>,
    processed: &HashSet<u64>,
    type_ends: &HashSet<String>,
) -> AddedLinks {
    let mut result = AddedLinks::default();
    count_existing(target, &mut result.stats);

    for link in &source.links {
        match link {
            Link::Hyperlink { location, comment } => {
                result.stats.source_hyperlinks += 1;
                let present = target
                    .links
                    .iter()
                    .any(|l| matches!(l, Link::Hyperlink { location: loc, .. } if loc == location));
                if !present {
                    result.stage(
                        target.id,
                        Link::Hyperlink {
                            location: location.clone(),
                            comment: comment.clone(),
                        },
                    );
                }
            }

            Link::Related {
                type_end,
                target_id: referenced,
                comment,
            } => {
                result.stats.source_related += 1;
                if !config.include_related {
                    continue;
                }

                let Some(mapped) = index.get(*referenced) else {
                    // The referenced item was never mirrored; nothing to
                    // point the link at.
                    debug!(
                        source_id = source.id,
                        referenced = *referenced,
                        "related item has no mirrored counterpart"
                    );
                    result.stats.missing_related += 1;
                    continue;
                };

                if processed.contains(&mapped) {
                    debug!(
                        target_id = target.id,
                        counterpart = mapped,
                        "counterpart already processed this run; skipping cross-link"
                    );
                    result.stats.cross_link_skips += 1;
                    continue;
                }

                let exact_present = target.links.iter().any(|l| {
                    matches!(l, Link::Related { type_end: te, target_id: id, .. }
                        if te == type_end && *id == mapped)
                });
                if exact_present {
                    continue;
                }

                let other_type_present = target.links.iter().any(|l| {
                    matches!(l, Link::Related { type_end: te, target_id: id, .. }
                        if te != type_end && *id == mapped)
                });
                if other_type_present {
                    // Same referenced item under another role: suspicious,
                    // but only an exact match suppresses the addition.
                    warn!(
                        target_id = target.id,
                        related = mapped,
                        type_end = %type_end,
                        "related link to this item already exists with a different type end"
                    );
                }

                if !type_ends.contains(type_end) {
                    error!(
                        target_id = target.id,
                        type_end = %type_end,
                        "link type end not defined in target schema; skipping"
                    );
                    result.stats.unknown_type_ends += 1;
                    continue;
                }

                result.stage(
                    target.id,
                    Link::Related {
                        type_end: type_end.clone(),
                        target_id: mapped,
                        comment: comment.clone(),
                    },
                );
            }

            Link::External {
                artifact_type,
                uri,
                comment,
            } => {
                if artifact_type.is_changeset() {
                    result.stats.source_changesets += 1;
                    if !config.include_changesets {
                        continue;
                    }

                    // Unsupported, unmatched, or unresolvable changesets are
                    // skipped outright; they are not "missing" links.
                    let resolved = match remapper.remap(uri) {
                        Ok(Some(resolved)) => resolved,
                        Ok(None) => continue,
                        Err(e) => {
                            error!(uri = %uri, error = %e, "changeset remap failed; skipping link");
                            continue;
                        }
                    };

                    let present = target.links.iter().any(|l| {
                        matches!(l, Link::External { artifact_type: at, uri: u, .. }
                            if at == artifact_type && *u == resolved)
                    });
                    if !present {
                        result.stage(
                            target.id,
                            Link::External {
                                artifact_type: artifact_type.clone(),
                                uri: resolved,
                                comment: comment.clone(),
                            },
                        );
                    }
                } else {
                    result.stats.source_external += 1;
                    if !config.include_external {
                        continue;
                    }

                    let present = target.links.iter().any(|l| {
                        matches!(l, Link::External { artifact_type: at, uri: u, .. }
                            if at == artifact_type && u == uri)
                    });
                    if !present {
                        result.stage(
                            target.id,
                            Link::External {
                                artifact_type: artifact_type.clone(),
                                uri: uri.clone(),
                                comment: comment.clone(),
                            },
                        );
                    }
                }
            }
        }
    }

    result
}

fn count_existing(target: &WorkItem, stats: &mut LinkStats) {
    for link in &target.links {
        match link {
            Link::Hyperlink { .. } => stats.existing_hyperlinks += 1,
            Link::Related { .. } => stats.existing_related += 1,
            Link::External { artifact_type, .. } if artifact_type.is_changeset() => {
                stats.existing_changesets += 1;
            }
            Link::External { .. } => stats.existing_external += 1,
        }
    }
}
