//! Validation configuration.
//!
//! An optional `api_validation.{yaml,yml,json}` (dotted or not) found by
//! walking upward from the repository root. Every field has a default, so
//! a partial file only overrides what it names. A file that cannot be
//! decoded is reported and replaced by the defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::MetagateError;
use crate::meta::locate::DEFAULT_IGNORED_DIRS;
use crate::report::render::OutputFormat;
use crate::repo::classify::Category;

pub const CONFIG_FILE_NAMES: [&str; 6] = [
    "api_validation.yaml",
    "api_validation.yml",
    "api_validation.json",
    ".api_validation.yaml",
    ".api_validation.yml",
    ".api_validation.json",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub file_types: FileTypes,
    pub output: OutputConfig,
    pub pcf_rules: CategoryRules,
    pub shp_ikp_rules: CategoryRules,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FileTypes {
    /// Directory names the locator never descends into.
    pub ignore_patterns: Vec<String>,
}

impl Default for FileTypes {
    fn default() -> Self {
        Self {
            ignore_patterns: DEFAULT_IGNORED_DIRS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub verbose: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CategoryRules {
    pub enabled: bool,
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Config {
    /// Load the explicit file if given, else the first file discovered
    /// upward from `start`, else the defaults. Never fails.
    pub fn load(explicit: Option<&Path>, start: &Path) -> Self {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => discover(start),
        };
        let Some(path) = path else {
            debug!("no config file found, using defaults");
            return Self::default();
        };
        match Self::from_file(&path) {
            Ok(config) => {
                debug!(path = %path.display(), "loaded config");
                config
            }
            Err(err) => {
                warn!(error = %err, "using default configuration");
                Self::default()
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, MetagateError> {
        let content = fs::read_to_string(path).map_err(|e| MetagateError::io(path, e))?;
        let name = path.to_string_lossy().to_ascii_lowercase();
        let invalid = |reason: String| MetagateError::Config {
            path: path.to_path_buf(),
            reason,
        };
        if name.ends_with(".json") {
            serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))
        } else if name.ends_with(".yaml") || name.ends_with(".yml") {
            if content.trim().is_empty() {
                return Ok(Self::default());
            }
            serde_yaml::from_str(&content).map_err(|e| invalid(e.to_string()))
        } else {
            Err(invalid("unsupported config file format".to_string()))
        }
    }

    /// Whether the category's extension rules run.
    pub fn extensions_enabled(&self, category: Category) -> bool {
        match category {
            Category::Pcf => self.pcf_rules.enabled,
            Category::ShpIkp => self.shp_ikp_rules.enabled,
            Category::None => false,
        }
    }

    pub fn to_yaml(&self) -> Result<String, MetagateError> {
        serde_yaml::to_string(self).map_err(|e| MetagateError::Config {
            path: PathBuf::from("<default>"),
            reason: e.to_string(),
        })
    }
}

/// First config file in `start` or any ancestor, in [`CONFIG_FILE_NAMES`] order.
pub fn discover(start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    })
}
