//! Push hook input protocol.
//!
//! Git feeds the pre-push hook one line per ref being pushed:
//! `<local ref> <local sha> <remote ref> <remote sha>`.

use std::path::PathBuf;

use tracing::warn;

use crate::git::GitRepo;
use crate::util::deterministic::dedup_preserving_order;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushUpdate {
    pub local_ref: String,
    pub local_sha: String,
    pub remote_ref: String,
    pub remote_sha: String,
}

/// What a push line asks the validator to look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushRange<'a> {
    /// Branch deletion: nothing to validate.
    Delete,
    /// New branch: validate the local commit on its own.
    NewBranch { local: &'a str },
    Update { from: &'a str, to: &'a str },
}

pub fn is_zero_sha(sha: &str) -> bool {
    !sha.is_empty() && sha.chars().all(|c| c == '0')
}

impl PushUpdate {
    /// `None` for anything other than exactly four tokens.
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        let update = Self {
            local_ref: tokens.next()?.to_string(),
            local_sha: tokens.next()?.to_string(),
            remote_ref: tokens.next()?.to_string(),
            remote_sha: tokens.next()?.to_string(),
        };
        if tokens.next().is_some() {
            return None;
        }
        Some(update)
    }

    pub fn range(&self) -> PushRange<'_> {
        if is_zero_sha(&self.local_sha) {
            PushRange::Delete
        } else if is_zero_sha(&self.remote_sha) {
            PushRange::NewBranch {
                local: &self.local_sha,
            }
        } else {
            PushRange::Update {
                from: &self.remote_sha,
                to: &self.local_sha,
            }
        }
    }
}

/// Parse every non-blank line; malformed lines are logged and skipped.
pub fn parse_push_lines(input: &str) -> Vec<PushUpdate> {
    input
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|line| {
            let parsed = PushUpdate::parse(line);
            if parsed.is_none() {
                warn!(line, "ignoring malformed push line");
            }
            parsed
        })
        .collect()
}

/// Union of files changed by every pushed ref, first occurrence first.
///
/// Never fails: a range git cannot resolve is narrowed to what exists
/// locally, and a commit whose files cannot be listed contributes nothing.
pub fn changed_files(git: &GitRepo, updates: &[PushUpdate]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for update in updates {
        match update.range() {
            PushRange::Delete => {}
            PushRange::NewBranch { local } => files.extend(commit_files(git, local)),
            PushRange::Update { from, to } => match git.changed_between(from, to) {
                Ok(changed) => files.extend(changed),
                Err(err) => {
                    warn!(
                        remote_sha = from,
                        error = %err,
                        "remote commit unknown locally, checking unpushed commits instead"
                    );
                    files.extend(unpushed_files(git, to));
                }
            },
        }
    }
    dedup_preserving_order(files)
}

/// Files of every commit on `local` missing from all remote-tracking refs,
/// or of `local` alone when that list is empty or unavailable.
fn unpushed_files(git: &GitRepo, local: &str) -> Vec<PathBuf> {
    match git.unpushed_commits(local) {
        Ok(commits) if !commits.is_empty() => commits
            .iter()
            .flat_map(|commit| commit_files(git, commit))
            .collect(),
        Ok(_) => commit_files(git, local),
        Err(err) => {
            warn!(error = %err, "cannot list unpushed commits");
            commit_files(git, local)
        }
    }
}

fn commit_files(git: &GitRepo, commit: &str) -> Vec<PathBuf> {
    git.changed_in_commit(commit).unwrap_or_else(|err| {
        warn!(commit, error = %err, "cannot list files of pushed commit");
        Vec::new()
    })
}
