//! Metadata file discovery.
//!
//! Responsibilities:
//! - Enumerate candidate metadata files below a repository root
//! - Skip deny-listed directories (VCS internals, dependency caches, build output)
//! - Answer "closest meta file" queries for changed source files
//!
//! Filesystem errors never propagate: an unreadable directory simply
//! contributes no files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

/// Accepted metadata file names, lowercase, in same-directory preference order.
pub const META_FILE_NAMES: [&str; 4] = ["api.meta", "api.meta.yaml", "api.meta.yml", "api.meta.json"];

/// Directory names skipped when no config overrides them.
pub const DEFAULT_IGNORED_DIRS: [&str; 9] = [
    "__pycache__",
    ".git",
    "node_modules",
    ".pytest_cache",
    "venv",
    ".venv",
    "target",
    "build",
    "dist",
];

fn meta_rank(name: &str) -> Option<usize> {
    let lower = name.to_ascii_lowercase();
    META_FILE_NAMES.iter().position(|n| *n == lower)
}

pub fn is_meta_file_name(name: &str) -> bool {
    meta_rank(name).is_some()
}

fn is_meta_path(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(is_meta_file_name)
}

/// Recursively list metadata files below `root`.
///
/// Output is sorted by path so repeated scans of an unchanged tree agree.
/// The root directory itself is never filtered, even if its name is on
/// the deny-list.
pub fn find_meta_files(root: &Path, ignored_dirs: &[String]) -> Vec<PathBuf> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !ignored_dirs
                    .iter()
                    .any(|d| entry.file_name().to_str() == Some(d.as_str()))
        });

    let mut found = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!(error = %err, "skipping unreadable entry during scan");
                continue;
            }
        };
        if entry.file_type().is_file() && is_meta_path(entry.path()) {
            found.push(entry.into_path());
        }
    }
    found.sort();
    found
}

/// Find the metadata file governing `file`.
///
/// Walks from the file's directory up to `root` (inclusive) and returns the
/// first directory's metadata file. A changed metadata file governs itself.
/// When one directory holds several metadata files the name order of
/// [`META_FILE_NAMES`] decides. Files outside `root` have no closest file.
pub fn closest_meta_file(root: &Path, file: &Path) -> Option<PathBuf> {
    let file = if file.is_absolute() {
        file.to_path_buf()
    } else {
        root.join(file)
    };
    if !file.starts_with(root) {
        return None;
    }
    if is_meta_path(&file) && file.is_file() {
        return Some(file);
    }

    let mut dir = file.parent();
    while let Some(current) = dir {
        if !current.starts_with(root) {
            break;
        }
        if let Some(found) = meta_file_in(current) {
            return Some(found);
        }
        if current == root {
            break;
        }
        dir = current.parent();
    }
    None
}

fn meta_file_in(dir: &Path) -> Option<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!(dir = %dir.display(), error = %err, "cannot list directory");
            return None;
        }
    };
    entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|e| {
            let rank = meta_rank(e.file_name().to_str()?)?;
            Some((rank, e.path()))
        })
        .min_by_key(|(rank, _)| *rank)
        .map(|(_, path)| path)
}
