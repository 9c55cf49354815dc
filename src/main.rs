//! relink CLI - reconcile work-item links after a repository migration.

use clap::Parser;
use relink::cli::{Cli, Commands};
use relink::commands::{self, RunArgs};
use relink::config::Settings;
use relink::run_log;
use std::env;
use std::process;
use std::time::Instant;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let human = cli.human_readable;
    let (cmd_name, args_json) = describe_command(&cli.command);

    let start = Instant::now();
    let result = run_command(cli);
    let duration = start.elapsed().as_millis() as u64;

    let (success, error) = match &result {
        Ok(_) => (true, None),
        Err(e) => (false, Some(e.to_string())),
    };

    // Audit trail; silently ignored if the log cannot be written.
    let _ = run_log::log_run(&cmd_name, args_json, success, error, duration);

    if let Err(e) = result {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!(r#"{{"error": "{}"}}"#, e);
        }
        process::exit(1);
    }
}

fn run_command(cli: Cli) -> Result<(), relink::Error> {
    let human = cli.human_readable;
    let settings = Settings::load(cli.config_path.as_deref())?;

    match cli.command {
        Commands::Run {
            source,
            target,
            query,
            project,
            no_related,
            no_changesets,
            no_external,
            dry_run,
        } => {
            let result = commands::run(
                RunArgs {
                    source,
                    target,
                    query,
                    project,
                    no_related,
                    no_changesets,
                    no_external,
                    dry_run,
                },
                &settings,
            )?;
            commands::print(&result, human);
        }

        Commands::Index {
            target,
            query,
            project,
        } => {
            let result = commands::index(target, query, project, &settings)?;
            commands::print(&result, human);
        }

        Commands::Remap {
            uri,
            source,
            target,
        } => {
            let result = commands::remap(uri, source, target, &settings)?;
            commands::print(&result, human);
        }
    }

    Ok(())
}

/// Name and coarse argument record for the run log.
fn describe_command(command: &Commands) -> (String, serde_json::Value) {
    match command {
        Commands::Run {
            query,
            project,
            dry_run,
            ..
        } => (
            "run".to_string(),
            serde_json::json!({
                "query": query,
                "project": project,
                "dry_run": dry_run,
            }),
        ),
        Commands::Index { query, project, .. } => (
            "index".to_string(),
            serde_json::json!({
                "query": query,
                "project": project,
            }),
        ),
        Commands::Remap { uri, .. } => (
            "remap".to_string(),
            serde_json::json!({ "uri": uri }),
        ),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("RLK_LOG")
        .unwrap_or_else(|_| EnvFilter::new("relink=info,warn"));

    let format = env::var("RLK_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    // Diagnostics go to stderr; stdout carries command results only.
    let registry = tracing_subscriber::registry().with(filter);
    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}
