//! Run audit log.
//!
//! Every CLI invocation appends one JSONL entry to a log file so that
//! long-running migration cleanups leave an audit trail. Logging never
//! fails loudly; problems writing the log must not break the command.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

/// Environment variable overriding the log file location.
pub const LOG_PATH_ENV: &str = "RLK_LOG_PATH";

/// A single run log entry.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunEntry {
    /// ISO 8601 timestamp when the command finished
    pub timestamp: DateTime<Utc>,

    /// Command name (e.g. "run", "index", "remap")
    pub command: String,

    /// Command arguments as JSON
    pub args: serde_json::Value,

    /// Whether the command succeeded
    pub success: bool,

    /// Error message if the command failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Command execution duration in milliseconds
    pub duration_ms: u64,

    /// User who executed the command
    pub user: String,
}

/// Append a run entry to the log file.
pub fn log_run(
    command: &str,
    args: serde_json::Value,
    success: bool,
    error: Option<String>,
    duration_ms: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = match log_path() {
        Some(path) => path,
        None => return Ok(()),
    };

    let entry = RunEntry {
        timestamp: Utc::now(),
        command: command.to_string(),
        args,
        success,
        error,
        duration_ms,
        user: current_user(),
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string(&entry)?;
    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    writeln!(file, "{}", json)?;
    Ok(())
}

/// Resolve the log file path: env override, else
/// `~/.local/share/relink/run.log`.
fn log_path() -> Option<PathBuf> {
    if let Ok(custom) = std::env::var(LOG_PATH_ENV) {
        return Some(PathBuf::from(custom));
    }
    dirs::home_dir().map(|home| home.join(".local/share/relink/run.log"))
}

fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}
