//! CLI argument definitions for relink.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Build metadata baked in by build.rs.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("RLK_GIT_COMMIT"),
    " ",
    env!("RLK_BUILD_TIMESTAMP"),
    ")"
);

/// Relink - reconcile work-item links after a repository migration.
#[derive(Parser, Debug)]
#[command(name = "rlk")]
#[command(author, version, long_version = LONG_VERSION)]
#[command(about = "Reconcile work-item links after a repository migration", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Path to the settings file (default: ./relink.toml).
    /// Can also be set via the RLK_CONFIG environment variable.
    #[arg(short = 'C', long = "config", global = true, env = "RLK_CONFIG")]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconcile links for every item in the target scope
    Run {
        /// Source repository snapshot (overrides settings file)
        #[arg(long)]
        source: Option<PathBuf>,

        /// Target repository snapshot (overrides settings file)
        #[arg(long)]
        target: Option<PathBuf>,

        /// Name of the stored query selecting the target scope
        #[arg(short, long)]
        query: Option<String>,

        /// Project scope substituted into the query text
        #[arg(short, long)]
        project: Option<String>,

        /// Skip related work-item links
        #[arg(long)]
        no_related: bool,

        /// Skip changeset links
        #[arg(long)]
        no_changesets: bool,

        /// Skip generic external links
        #[arg(long)]
        no_external: bool,

        /// Compute and report without persisting anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Build and print the source-to-target identifier index
    Index {
        /// Target repository snapshot (overrides settings file)
        #[arg(long)]
        target: Option<PathBuf>,

        /// Name of the stored query selecting the target scope
        #[arg(short, long)]
        query: Option<String>,

        /// Project scope substituted into the query text
        #[arg(short, long)]
        project: Option<String>,
    },

    /// Remap one source changeset artifact URI to its target equivalent
    Remap {
        /// Source changeset artifact URI
        uri: String,

        /// Source repository snapshot (overrides settings file)
        #[arg(long)]
        source: Option<PathBuf>,

        /// Target repository snapshot (overrides settings file)
        #[arg(long)]
        target: Option<PathBuf>,
    },
}
