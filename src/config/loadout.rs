//! Saved loadout documents
//!
//! A loadout is a JSON document holding a signature (file kind and the
//! version of the software that wrote it) plus a list of widgets. Loading a
//! loadout runs every graph widget through the migration registry and
//! re-stamps the signature with the running version.

use loadout_types::{GraphConfig, SchemaVersion, VersionError, WidgetType};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::migration::{GraphMigrations, MigrationError};

/// Signature code identifying loadout documents
pub const LOADOUT_SIGNATURE_CODE: &str = "loadout";

/// Version written into saved loadouts
pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error loading or saving a loadout
#[derive(Debug, Error)]
pub enum LoadoutError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid loadout JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("not a loadout file (signature code '{0}')")]
    Signature(String),
    #[error("invalid loadout version: {0}")]
    Version(#[from] VersionError),
    #[error("widget {index} is not a valid graph: {source}")]
    Widget {
        index: usize,
        source: serde_json::Error,
    },
    #[error("widget {index}: {source}")]
    Migration {
        index: usize,
        #[source]
        source: MigrationError,
    },
    #[error("could not determine config directory")]
    NoConfigDir,
}

impl LoadoutError {
    /// Message to show the user, if a migration refused with a notice
    pub fn notice_message(&self) -> Option<&str> {
        match self {
            LoadoutError::Migration { source, .. } => source.notice_message(),
            _ => None,
        }
    }
}

/// File kind and writer version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub code: String,
    pub version: String,
}

impl Signature {
    /// Signature stamped with the running version
    pub fn current() -> Self {
        Self {
            code: LOADOUT_SIGNATURE_CODE.to_string(),
            version: CURRENT_VERSION.to_string(),
        }
    }
}

/// One widget of a loadout
///
/// Only graphs have a schema here; other widget kinds are carried through
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LoadoutWidget {
    Graph(GraphConfig),
    Other(serde_json::Value),
}

/// A saved set of widgets
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Loadout {
    pub signature: Signature,
    pub widgets: Vec<LoadoutWidget>,
}

/// Result of loading a loadout
#[derive(Debug, Clone)]
pub struct MigratedLoadout {
    pub loadout: Loadout,
    /// Version found in the file before re-stamping
    pub source_version: String,
    /// Total migration rules applied across all graph widgets
    pub rules_applied: usize,
}

#[derive(Deserialize)]
struct RawLoadout {
    signature: Signature,
    #[serde(default)]
    widgets: Vec<serde_json::Value>,
}

fn is_graph(widget: &serde_json::Value) -> bool {
    let graph_tag = serde_json::to_value(WidgetType::Graph).ok();
    widget.get("widgetType").cloned() == graph_tag
}

impl Loadout {
    /// New loadout with the current signature
    pub fn new(widgets: Vec<LoadoutWidget>) -> Self {
        Self {
            signature: Signature::current(),
            widgets,
        }
    }

    /// Graph widgets in document order
    pub fn graphs(&self) -> impl Iterator<Item = &GraphConfig> {
        self.widgets.iter().filter_map(|widget| match widget {
            LoadoutWidget::Graph(graph) => Some(graph),
            LoadoutWidget::Other(_) => None,
        })
    }

    /// Parse a loadout document and migrate its graphs to the current schema
    pub fn from_json(
        content: &str,
        registry: &GraphMigrations,
    ) -> Result<MigratedLoadout, LoadoutError> {
        let raw: RawLoadout = serde_json::from_str(content)?;
        if raw.signature.code != LOADOUT_SIGNATURE_CODE {
            return Err(LoadoutError::Signature(raw.signature.code));
        }
        let source: SchemaVersion = raw.signature.version.parse()?;

        let mut rules_applied = 0;
        let mut widgets = Vec::with_capacity(raw.widgets.len());
        for (index, mut value) in raw.widgets.into_iter().enumerate() {
            if !is_graph(&value) {
                debug!("Keeping non-graph widget {} as-is", index);
                widgets.push(LoadoutWidget::Other(value));
                continue;
            }

            // Migrate the saved form first; old layouts may not decode yet
            rules_applied += registry
                .migrate_from(&mut value, &source)
                .map_err(|source| LoadoutError::Migration { index, source })?;
            let graph: GraphConfig = serde_json::from_value(value)
                .map_err(|source| LoadoutError::Widget { index, source })?;
            widgets.push(LoadoutWidget::Graph(graph));
        }

        Ok(MigratedLoadout {
            loadout: Loadout::new(widgets),
            source_version: raw.signature.version,
            rules_applied,
        })
    }

    /// Load and migrate a loadout from a file
    pub fn load_from_path(
        path: &Path,
        registry: &GraphMigrations,
    ) -> Result<MigratedLoadout, LoadoutError> {
        let content = std::fs::read_to_string(path).map_err(|source| LoadoutError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let migrated = Self::from_json(&content, registry)?;
        info!(
            "Loaded loadout {} (saved by {}, {} widget(s))",
            path.display(),
            migrated.source_version,
            migrated.loadout.widgets.len()
        );
        Ok(migrated)
    }

    pub fn to_json(&self) -> Result<String, LoadoutError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save the loadout to a file
    pub fn save_to_path(&self, path: &Path) -> Result<(), LoadoutError> {
        let write_err = |source| LoadoutError::Write {
            path: path.to_path_buf(),
            source,
        };

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let content = self.to_json()?;
        std::fs::write(path, content).map_err(write_err)?;
        info!("Saved loadout to {}", path.display());
        Ok(())
    }
}

/// Get the default loadout file path
pub fn default_loadout_path() -> Result<PathBuf, LoadoutError> {
    let dirs = directories::ProjectDirs::from("com", "loadout", "loadout")
        .ok_or(LoadoutError::NoConfigDir)?;

    Ok(dirs.config_dir().join("loadouts").join("default.json"))
}
