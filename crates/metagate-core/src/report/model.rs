use serde::{Deserialize, Serialize};

use crate::{RULE_CATALOG_VERSION, SCHEMA_VERSION};
use crate::orchestrator::Outcome;
use crate::repo::classify::{Category, RepoContext};
use crate::rules::finding::FindingsSet;

/// Top-level run report.
///
/// Serialised as the `--format json` output. Field order and finding order
/// are stable for identical inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub schema_version: String,
    pub rule_catalog_version: String,
    pub tool: ToolInfo,
    pub repository: RepositoryInfo,
    pub mode: String,
    pub meta_files: Vec<String>,
    pub findings: FindingsSet,
    pub summary: Summary,
    pub verdict: Verdict,
}

impl Report {
    pub fn new(tool: ToolInfo, ctx: &RepoContext, outcome: Outcome) -> Self {
        let summary = Summary {
            files_checked: outcome.meta_files.len(),
            errors: outcome.findings.errors().count(),
            warnings: outcome.findings.warnings().count(),
        };
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            rule_catalog_version: RULE_CATALOG_VERSION.to_string(),
            tool,
            repository: RepositoryInfo {
                root: ctx.root.display().to_string(),
                name: ctx.name.clone(),
                category: ctx.category,
            },
            mode: outcome.mode.to_string(),
            meta_files: outcome
                .meta_files
                .iter()
                .map(|p| ctx.display_path(p))
                .collect(),
            findings: outcome.findings,
            summary,
            verdict: outcome.verdict,
        }
    }
}

/// Tool metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub root: String,
    pub name: String,
    pub category: Category,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Summary {
    pub files_checked: usize,
    pub errors: usize,
    pub warnings: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictStatus {
    Pass,
    Fail,
}

/// Final pass/fail decision and the exit code that goes with it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Verdict {
    pub status: VerdictStatus,
    pub reason: String,
    pub exit_code: i32,
    /// Set when the user overrode failures.
    pub justification: Option<String>,
    /// Whether the override was written into the commit message.
    pub annotated: bool,
}

impl Verdict {
    pub fn pass(reason: impl Into<String>) -> Self {
        Self {
            status: VerdictStatus::Pass,
            reason: reason.into(),
            exit_code: 0,
            justification: None,
            annotated: false,
        }
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            status: VerdictStatus::Fail,
            reason: reason.into(),
            exit_code: 1,
            justification: None,
            annotated: false,
        }
    }

    pub fn overridden(justification: String, annotated: bool) -> Self {
        Self {
            status: VerdictStatus::Pass,
            reason: "validation failures overridden".to_string(),
            exit_code: 0,
            justification: Some(justification),
            annotated,
        }
    }

    pub fn passed(&self) -> bool {
        self.status == VerdictStatus::Pass
    }
}
