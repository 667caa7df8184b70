//! Repository classification.
//!
//! Decides whether a repository is in scope for metadata validation.
//! Both signals must agree: the top-level layout and the repository name.
//!
//!   - `SHP` or `IKP` directory at the root, name contains `-ds-`  → SHP_IKP
//!   - no such directory, name contains `-decision-service-`       → PCF
//!   - anything else                                               → NONE
//!
//! Classification never fails; an unreadable root has no marker directory.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

pub const SHP_IKP_DIRS: [&str; 2] = ["SHP", "IKP"];
pub const SHP_IKP_NAME_MARKER: &str = "-ds-";
pub const PCF_NAME_MARKER: &str = "-decision-service-";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Pcf,
    ShpIkp,
    None,
}

impl Category {
    pub fn in_scope(self) -> bool {
        self != Category::None
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::Pcf => "PCF",
            Category::ShpIkp => "SHP_IKP",
            Category::None => "NONE",
        })
    }
}

/// Classify the repository rooted at `root` whose identifying name is `name`.
pub fn classify(root: &Path, name: &str) -> Category {
    let has_marker_dir = has_shp_ikp_dir(root);
    let category = if has_marker_dir {
        if name.contains(SHP_IKP_NAME_MARKER) {
            Category::ShpIkp
        } else {
            Category::None
        }
    } else if name.contains(PCF_NAME_MARKER) {
        Category::Pcf
    } else {
        Category::None
    };
    debug!(root = %root.display(), name, has_marker_dir, %category, "classified repository");
    category
}

/// Exact-name match, so case-insensitive filesystems do not accept `shp`.
fn has_shp_ikp_dir(root: &Path) -> bool {
    let Ok(entries) = fs::read_dir(root) else {
        return false;
    };
    entries.filter_map(|e| e.ok()).any(|entry| {
        entry.file_type().map(|t| t.is_dir()).unwrap_or(false)
            && entry
                .file_name()
                .to_str()
                .is_some_and(|n| SHP_IKP_DIRS.iter().any(|d| *d == n))
    })
}

/// Repository facts fixed for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoContext {
    pub root: PathBuf,
    pub name: String,
    pub category: Category,
}

impl RepoContext {
    pub fn new(root: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        let root = root.into();
        let name = name.into();
        let category = classify(&root, &name);
        Self {
            root,
            name,
            category,
        }
    }

    /// Path shown in findings: relative to the root when possible.
    pub fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}
