use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by the collaborators around the rule engine.
///
/// None of these escape the validation pass itself: the locator turns
/// `Io` into "no files", the parser turns decode problems into
/// `parse-error` findings, and config problems fall back to defaults.
/// They surface to the caller only from git plumbing and report output.
#[derive(Debug, Error)]
pub enum MetagateError {
    #[error("git {args} failed: {stderr}")]
    Git { args: String, stderr: String },

    #[error("failed to launch git: {0}")]
    GitSpawn(#[source] std::io::Error),

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("presentation surface failed: {0}")]
    Surface(String),
}

impl MetagateError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
