use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::model::{CurveCatalog, DEFAULT_CURVES};

/// Environment variable naming a config file when no argument is given.
pub const CONFIG_ENV: &str = "WELL_MAP_CONFIG";

// ---------------------------------------------------------------------------
// Column names of the input files
// ---------------------------------------------------------------------------

/// Header names in the well metadata and log files.
/// Defaults follow the FORCE 2020 well-log release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub well_name: String,
    pub partition: String,
    pub latitude: String,
    pub longitude: String,
    pub operator: String,
    pub purpose: String,
    pub completion_year: String,
    pub formation: String,
    /// Well column of the log file.
    pub log_well: String,
    /// Depth column of the log file; never read as a curve.
    pub log_depth: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            well_name: "wlbWellboreName".into(),
            partition: "Dataset".into(),
            latitude: "lat".into(),
            longitude: "lon".into(),
            operator: "wlbDrillingOperator".into(),
            purpose: "wlbPurpose".into(),
            completion_year: "wlbCompletionYear".into(),
            formation: "wlbFormationAtTD".into(),
            log_well: "WELL".into(),
            log_depth: "DEPTH_MD".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Application config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Loaded at startup together with `log_path` when both are set.
    pub metadata_path: Option<PathBuf>,
    pub log_path: Option<PathBuf>,
    /// The curve catalog, in display order.
    pub curves: Vec<String>,
    /// Curves ticked when a dataset is first shown.
    pub required_curves: Vec<String>,
    pub columns: ColumnNames,
    pub window_size: [f32; 2],
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            metadata_path: None,
            log_path: None,
            curves: DEFAULT_CURVES.iter().map(|c| c.to_string()).collect(),
            required_curves: Vec::new(),
            columns: ColumnNames::default(),
            window_size: [1280.0, 820.0],
        }
    }
}

impl AppConfig {
    /// Read a JSON config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Resolve the config from the first CLI argument, then `WELL_MAP_CONFIG`,
    /// falling back to defaults when neither is set or the file is unusable.
    pub fn from_env() -> Self {
        let path = std::env::args_os()
            .nth(1)
            .map(PathBuf::from)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let Some(path) = path else {
            return Self::default();
        };
        match Self::load(&path) {
            Ok(config) => {
                log::info!("Using config {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring config: {e:#}");
                Self::default()
            }
        }
    }

    pub fn catalog(&self) -> CurveCatalog {
        CurveCatalog::new(self.curves.iter().cloned())
    }
}
