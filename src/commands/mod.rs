//! Command implementations for the relink CLI.
//!
//! Each command resolves its inputs (CLI flag > settings file > default),
//! loads the snapshot repositories, runs the core, and returns a
//! serializable result that renders as JSON (default) or human-readable
//! text.

use crate::batch::{self, BatchOptions, RunSummary};
use crate::config::Settings;
use crate::index::IdentifierIndex;
use crate::reconcile::ReconcileConfig;
use crate::remap::ChangesetRemapper;
use crate::repo::{ItemRepository, QueryStore, SnapshotRepository, find_query, substitute_project};
use crate::{Error, Result};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Command results render as JSON (default) or human-readable text.
pub trait Output: Serialize {
    fn human(&self) -> String;

    fn json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Print a command result in the requested format.
pub fn print(result: &impl Output, human: bool) {
    if human {
        println!("{}", result.human());
    } else {
        println!("{}", result.json());
    }
}

fn resolve_path(flag: Option<PathBuf>, configured: &Option<PathBuf>, role: &str) -> Result<PathBuf> {
    flag.or_else(|| configured.clone())
        .ok_or_else(|| Error::Config(format!("no {} snapshot configured", role)))
}

fn resolve_scope(
    query: Option<String>,
    project: Option<String>,
    settings: &Settings,
) -> Result<(String, String)> {
    let query = query
        .or_else(|| settings.scope.query.clone())
        .ok_or_else(|| Error::Config("no scope query configured".to_string()))?;
    // An absent project is fine when the query text has no placeholder.
    let project = project
        .or_else(|| settings.scope.project.clone())
        .unwrap_or_default();
    Ok((query, project))
}

/// Arguments to the `run` command after CLI parsing.
#[derive(Debug, Default)]
pub struct RunArgs {
    pub source: Option<PathBuf>,
    pub target: Option<PathBuf>,
    pub query: Option<String>,
    pub project: Option<String>,
    pub no_related: bool,
    pub no_changesets: bool,
    pub no_external: bool,
    pub dry_run: bool,
}

/// Result of the `run` command.
#[derive(Debug, Serialize)]
pub struct RunResult {
    pub dry_run: bool,
    pub summary: RunSummary,
}

impl Output for RunResult {
    fn human(&self) -> String {
        let s = &self.summary;
        let mut out = String::new();
        if self.dry_run {
            let _ = writeln!(out, "Dry run - nothing was persisted.");
        }
        let _ = writeln!(out, "Items processed:     {}", s.items_processed);
        let _ = writeln!(out, "Items updated:       {}", s.items_updated);
        let _ = writeln!(
            out,
            "Links added:         {} ({} hyperlink, {} related, {} changeset, {} external)",
            s.total_added(),
            s.hyperlinks_added,
            s.related_added,
            s.changesets_added,
            s.external_added
        );
        let _ = writeln!(
            out,
            "Found on source:     {} hyperlink, {} related, {} changeset, {} external",
            s.source_hyperlinks, s.source_related, s.source_changesets, s.source_external
        );
        let _ = writeln!(
            out,
            "Already on target:   {} hyperlink, {} related, {} changeset, {} external",
            s.existing_hyperlinks, s.existing_related, s.existing_changesets, s.existing_external
        );
        let _ = writeln!(out, "Missing related:     {}", s.missing_related);
        let _ = writeln!(out, "Cross-link skips:    {}", s.cross_link_skips);
        let _ = writeln!(out, "Unknown type ends:   {}", s.unknown_type_ends);
        let _ = writeln!(out, "Capped items:        {}", s.capped_items);
        let _ = writeln!(out, "Provenance errors:   {}", s.provenance_errors);
        let _ = writeln!(out, "Fetch errors:        {}", s.fetch_errors);
        let _ = write!(out, "Save errors:         {}", s.save_errors);
        out
    }
}

/// Reconcile links for every item in the target scope.
pub fn run(args: RunArgs, settings: &Settings) -> Result<RunResult> {
    let source_path = resolve_path(args.source, &settings.source.snapshot, "source")?;
    let target_path = resolve_path(args.target, &settings.target.snapshot, "target")?;
    let (query, project) = resolve_scope(args.query, args.project, settings)?;

    let source = SnapshotRepository::load(&source_path)?;
    let mut target = SnapshotRepository::load(&target_path)?;

    let opts = BatchOptions {
        query,
        project,
        config: ReconcileConfig {
            include_related: settings.reconcile.include_related && !args.no_related,
            include_changesets: settings.reconcile.include_changesets && !args.no_changesets,
            include_external: settings.reconcile.include_external && !args.no_external,
        },
        dry_run: args.dry_run,
    };

    let summary = batch::run(&source, &mut target, &opts)?;
    Ok(RunResult {
        dry_run: args.dry_run,
        summary,
    })
}

/// One entry of the identifier index.
#[derive(Debug, Serialize)]
pub struct IndexEntry {
    pub source_id: u64,
    pub target_id: u64,
}

/// Result of the `index` command.
#[derive(Debug, Serialize)]
pub struct IndexResult {
    pub entries: Vec<IndexEntry>,
    pub duplicates: usize,
    pub parse_errors: usize,
}

impl Output for IndexResult {
    fn human(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            let _ = writeln!(out, "{} -> {}", entry.source_id, entry.target_id);
        }
        let _ = write!(
            out,
            "{} mapped, {} duplicates rejected, {} parse errors",
            self.entries.len(),
            self.duplicates,
            self.parse_errors
        );
        out
    }
}

/// Build the identifier index over the configured target scope.
pub fn index(
    target: Option<PathBuf>,
    query: Option<String>,
    project: Option<String>,
    settings: &Settings,
) -> Result<IndexResult> {
    let target_path = resolve_path(target, &settings.target.snapshot, "target")?;
    let (query, project) = resolve_scope(query, project, settings)?;

    let repo = SnapshotRepository::load(&target_path)?;
    let root = repo.query_root()?;
    let stored = find_query(&root, &query).ok_or_else(|| Error::QueryNotFound(query.clone()))?;
    let scope = repo.query_items(&substitute_project(&stored.text, &project))?;

    let built = IdentifierIndex::build(&scope);
    let mut entries: Vec<IndexEntry> = built
        .iter()
        .map(|(source_id, target_id)| IndexEntry {
            source_id,
            target_id,
        })
        .collect();
    entries.sort_by_key(|e| e.source_id);

    Ok(IndexResult {
        entries,
        duplicates: built.duplicates(),
        parse_errors: built.parse_errors(),
    })
}

/// Result of the `remap` command.
#[derive(Debug, Serialize)]
pub struct RemapResult {
    pub source_uri: String,
    pub supported: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_uri: Option<String>,
}

impl Output for RemapResult {
    fn human(&self) -> String {
        if !self.supported {
            return format!("{}: remapping not supported by target", self.source_uri);
        }
        match &self.target_uri {
            Some(uri) => format!("{} -> {}", self.source_uri, uri),
            None => format!("{}: no migrated counterpart found", self.source_uri),
        }
    }
}

/// Remap a single source changeset artifact URI.
pub fn remap(
    uri: String,
    source: Option<PathBuf>,
    target: Option<PathBuf>,
    settings: &Settings,
) -> Result<RemapResult> {
    let source_path = resolve_path(source, &settings.source.snapshot, "source")?;
    let target_path = resolve_path(target, &settings.target.snapshot, "target")?;

    let source_repo = SnapshotRepository::load(&source_path)?;
    let target_repo = SnapshotRepository::load(&target_path)?;

    let remapper = ChangesetRemapper::new(&source_repo, &target_repo)?;
    let target_uri = remapper.remap(&uri)?;
    Ok(RemapResult {
        source_uri: uri,
        supported: remapper.is_supported(),
        target_uri,
    })
}
