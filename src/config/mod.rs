//! Settings file for relink runs.
//!
//! Settings live in a TOML file, by default `relink.toml` in the working
//! directory, overridable with `-C/--config` or the `RLK_CONFIG`
//! environment variable. Every value can also be supplied on the command
//! line; precedence is CLI flag > settings file > built-in default.
//!
//! ```toml
//! [source]
//! snapshot = "fixtures/source.json"
//!
//! [target]
//! snapshot = "fixtures/target.json"
//!
//! [scope]
//! query = "Migrated Items"
//! project = "Fabrikam"
//!
//! [reconcile]
//! include_related = true
//! include_changesets = true
//! include_external = true
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default settings file name, looked up in the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "relink.toml";

/// One repository endpoint.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointSettings {
    /// Path to the repository snapshot file
    pub snapshot: Option<PathBuf>,
}

/// Which target items a run covers.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeSettings {
    /// Name of the stored query selecting the target scope
    pub query: Option<String>,

    /// Project scope substituted into the query text
    pub project: Option<String>,
}

/// Per-category reconciliation toggles; everything defaults to enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileSettings {
    pub include_related: bool,
    pub include_changesets: bool,
    pub include_external: bool,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            include_related: true,
            include_changesets: true,
            include_external: true,
        }
    }
}

/// Root of the settings file.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source: EndpointSettings,
    pub target: EndpointSettings,
    pub scope: ScopeSettings,
    pub reconcile: ReconcileSettings,
}

impl Settings {
    /// Load settings.
    ///
    /// An explicitly given path must exist; the default path is optional
    /// and missing means built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "settings file does not exist: {}",
                        path.display()
                    )));
                }
                Self::parse_file(path)
            }
            None => {
                let default = Path::new(DEFAULT_SETTINGS_FILE);
                if default.exists() {
                    Self::parse_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn parse_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let settings = toml::from_str(&data)?;
        Ok(settings)
    }
}
