//! Thin wrapper over the `git` command line.
//!
//! Every call runs with an explicit working directory, the repository
//! root, rather than the process's current directory.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::MetagateError;
use crate::history::annotate::CommitMessageStore;

#[derive(Debug, Clone)]
pub struct GitRepo {
    root: PathBuf,
}

impl GitRepo {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Top level of the work tree containing `start`.
    pub fn discover(start: &Path) -> Result<Self, MetagateError> {
        let top = git_output(start, &["rev-parse", "--show-toplevel"])?;
        Ok(Self::new(top.trim()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn run(&self, args: &[&str]) -> Result<String, MetagateError> {
        git_output(&self.root, args)
    }

    /// Identifying name: last segment of `remote.origin.url` when set,
    /// otherwise the work tree directory name.
    pub fn name(&self) -> String {
        self.run(&["config", "--get", "remote.origin.url"])
            .ok()
            .and_then(|url| name_from_remote(url.trim()))
            .unwrap_or_else(|| dir_name(&self.root))
    }

    pub fn staged_files(&self) -> Result<Vec<PathBuf>, MetagateError> {
        let out = self.run(&["diff", "--cached", "--name-only", "--diff-filter=ACMR"])?;
        Ok(self.paths(&out))
    }

    /// Files touched between two commits.
    pub fn changed_between(&self, from: &str, to: &str) -> Result<Vec<PathBuf>, MetagateError> {
        let out = self.run(&["diff", "--name-only", from, to])?;
        Ok(self.paths(&out))
    }

    /// Files touched by a single commit, root commits included.
    pub fn changed_in_commit(&self, commit: &str) -> Result<Vec<PathBuf>, MetagateError> {
        let out = self.run(&["diff-tree", "--no-commit-id", "--name-only", "-r", "--root", commit])?;
        Ok(self.paths(&out))
    }

    /// Commits reachable from `tip` that no remote-tracking ref contains,
    /// newest first.
    pub fn unpushed_commits(&self, tip: &str) -> Result<Vec<String>, MetagateError> {
        let out = self.run(&["rev-list", tip, "--not", "--remotes"])?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    pub fn head_commit(&self) -> Result<String, MetagateError> {
        Ok(self.run(&["rev-parse", "HEAD"])?.trim().to_string())
    }

    fn paths(&self, out: &str) -> Vec<PathBuf> {
        out.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| self.root.join(l))
            .collect()
    }
}

impl CommitMessageStore for GitRepo {
    fn head_message(&self) -> Result<String, MetagateError> {
        self.run(&["log", "-1", "--pretty=format:%B"])
    }

    fn amend_head_message(&mut self, message: &str) -> Result<(), MetagateError> {
        let args = ["commit", "--amend", "--no-verify", "-F", "-"];
        let mut child = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(MetagateError::GitSpawn)?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(message.as_bytes())
                .map_err(MetagateError::GitSpawn)?;
        }
        let output = child.wait_with_output().map_err(MetagateError::GitSpawn)?;
        if !output.status.success() {
            return Err(MetagateError::Git {
                args: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

fn git_output(dir: &Path, args: &[&str]) -> Result<String, MetagateError> {
    debug!(dir = %dir.display(), args = %args.join(" "), "running git");
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(MetagateError::GitSpawn)?;
    if !output.status.success() {
        return Err(MetagateError::Git {
            args: args.join(" "),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// `git@host:org/pay-ds-core.git` and `https://host/org/pay-ds-core` both
/// give `pay-ds-core`.
pub fn name_from_remote(url: &str) -> Option<String> {
    let trimmed = url.trim().trim_end_matches('/');
    let last = trimmed.rsplit(['/', ':']).next()?;
    let name = last.strip_suffix(".git").unwrap_or(last);
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

pub fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
