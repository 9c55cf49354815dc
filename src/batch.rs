//! Batch orchestration of a reconciliation run.
//!
//! Resolves the target scope from a stored query, builds the identifier
//! index and changeset remapper once, then walks the scope item by item:
//! fetch the source counterpart, reconcile, and persist any staged links.
//! Per-item failures are logged and counted, never fatal; only startup
//! failures (unreadable repository, unknown query) abort the run.
//!
//! The run is single-threaded and synchronous throughout. Before each
//! save the target item is re-fetched so links are appended to the current
//! stored state rather than the possibly stale scope snapshot.

use crate::index::IdentifierIndex;
use crate::models::Link;
use crate::reconcile::{self, LinkStats, ReconcileConfig};
use crate::remap::ChangesetRemapper;
use crate::repo::{ItemRepository, QueryStore, VersionControl, find_query, substitute_project};
use crate::{Error, Result};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{error, info};

/// What a run should process and whether it may write.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Name of the stored query selecting the target scope
    pub query: String,

    /// Project scope substituted into the query text
    pub project: String,

    /// Per-category engine toggles
    pub config: ReconcileConfig,

    /// Compute and report without persisting anything
    pub dry_run: bool,
}

/// End-of-run counters, serialized as the run report.
#[derive(Debug, Default, Clone, Serialize)]
pub struct RunSummary {
    /// Items in scope, processed or skipped
    pub items_processed: usize,
    /// Items that had links persisted (or would have, under dry run)
    pub items_updated: usize,

    /// Items skipped for a missing or unparseable provenance field
    pub provenance_errors: usize,
    /// Items skipped because the source counterpart could not be fetched
    pub fetch_errors: usize,
    /// Items whose save failed
    pub save_errors: usize,

    /// Links added, per category
    pub hyperlinks_added: usize,
    pub related_added: usize,
    pub changesets_added: usize,
    pub external_added: usize,

    /// Links found on source items, per category
    pub source_hyperlinks: usize,
    pub source_related: usize,
    pub source_changesets: usize,
    pub source_external: usize,

    /// Links already present on target items, per category
    pub existing_hyperlinks: usize,
    pub existing_related: usize,
    pub existing_changesets: usize,
    pub existing_external: usize,

    /// Related links whose referenced item was never mirrored
    pub missing_related: usize,
    /// Related links skipped as probable cross-links
    pub cross_link_skips: usize,
    /// Related links with a type end unknown to the target schema
    pub unknown_type_ends: usize,
    /// Items that hit the per-item link cap
    pub capped_items: usize,
}

impl RunSummary {
    fn fold_stats(&mut self, stats: &LinkStats) {
        self.source_hyperlinks += stats.source_hyperlinks;
        self.source_related += stats.source_related;
        self.source_changesets += stats.source_changesets;
        self.source_external += stats.source_external;
        self.existing_hyperlinks += stats.existing_hyperlinks;
        self.existing_related += stats.existing_related;
        self.existing_changesets += stats.existing_changesets;
        self.existing_external += stats.existing_external;
        self.missing_related += stats.missing_related;
        self.cross_link_skips += stats.cross_link_skips;
        self.unknown_type_ends += stats.unknown_type_ends;
        if stats.capped {
            self.capped_items += 1;
        }
    }

    fn count_added(&mut self, links: &[Link]) {
        for link in links {
            match link.kind_name() {
                "hyperlink" => self.hyperlinks_added += 1,
                "related" => self.related_added += 1,
                "changeset" => self.changesets_added += 1,
                _ => self.external_added += 1,
            }
        }
    }

    /// Total links added across all categories.
    pub fn total_added(&self) -> usize {
        self.hyperlinks_added + self.related_added + self.changesets_added + self.external_added
    }
}

/// Run link reconciliation over the configured target scope.
pub fn run<S, T>(source: &S, target: &mut T, opts: &BatchOptions) -> Result<RunSummary>
where
    S: ItemRepository + VersionControl,
    T: ItemRepository + VersionControl + QueryStore,
{
    let root = target.query_root()?;
    let stored = find_query(&root, &opts.query)
        .ok_or_else(|| Error::QueryNotFound(opts.query.clone()))?;
    info!(query = %stored.name, id = %stored.id, "resolved scope query");

    let text = substitute_project(&stored.text, &opts.project);
    let scope = target.query_items(&text)?;
    info!(items = scope.len(), dry_run = opts.dry_run, "target scope resolved");

    let index = IdentifierIndex::build(&scope);
    let type_ends: HashSet<String> = target
        .link_type_ends()?
        .into_iter()
        .map(|te| te.name)
        .collect();
    let remapper = ChangesetRemapper::new(source, &*target)?;

    let mut processed: HashSet<u64> = HashSet::new();
    let mut summary = RunSummary::default();

    for item in &scope {
        summary.items_processed += 1;

        let source_id = match item.source_id() {
            Some(Ok(id)) => id,
            Some(Err(raw)) => {
                error!(target_id = item.id, raw, "unparseable provenance field; skipping item");
                summary.provenance_errors += 1;
                continue;
            }
            None => {
                error!(target_id = item.id, "no provenance field; skipping item");
                summary.provenance_errors += 1;
                continue;
            }
        };

        let source_item = match source.get_item(source_id) {
            Ok(found) => found,
            Err(e) => {
                error!(
                    target_id = item.id,
                    source_id,
                    error = %e,
                    "failed to fetch source item; skipping item"
                );
                summary.fetch_errors += 1;
                continue;
            }
        };

        let added = reconcile::reconcile(
            &source_item,
            item,
            &opts.config,
            &index,
            &remapper,
            &processed,
            &type_ends,
        );
        summary.fold_stats(&added.stats);

        if added.links.is_empty() {
            continue;
        }

        if opts.dry_run {
            info!(
                target_id = item.id,
                links = added.links.len(),
                "dry run: would add links"
            );
            processed.insert(item.id);
            summary.items_updated += 1;
            summary.count_added(&added.links);
            continue;
        }

        // Re-fetch before writing: the stored item may have moved on since
        // the scope query ran.
        let mut fresh = match target.get_item(item.id) {
            Ok(found) => found,
            Err(e) => {
                error!(target_id = item.id, error = %e, "failed to re-fetch item before save");
                summary.save_errors += 1;
                continue;
            }
        };
        fresh.links.extend(added.links.iter().cloned());

        if let Err(e) = target.save_item(&fresh) {
            error!(target_id = item.id, error = %e, "failed to save links; continuing");
            summary.save_errors += 1;
            continue;
        }

        processed.insert(fresh.id);
        summary.items_updated += 1;
        summary.count_added(&added.links);
        info!(target_id = item.id, links = added.links.len(), "links added");
    }

    info!(
        items = summary.items_processed,
        updated = summary.items_updated,
        links = summary.total_added(),
        save_errors = summary.save_errors,
        "reconciliation run complete"
    );
    Ok(summary)
}
