//! Validation orchestration.
//!
//! Responsibilities:
//! - Short-circuit out-of-scope repositories before touching any file
//! - Select the metadata files a mode cares about
//! - Parse and evaluate each file once, collecting one findings set
//! - Turn findings into a verdict according to the mode's enforcement
//!
//! Non-responsibilities:
//! - Working out which files changed (the caller supplies them)
//! - Rendering reports or choosing exit codes for hooks

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::gate::surface::PresentationSurface;
use crate::gate::workflow::run_override;
use crate::history::annotate::{CommitMessageStore, annotate};
use crate::meta::locate::{closest_meta_file, find_meta_files};
use crate::meta::parse::parse_file;
use crate::report::model::Verdict;
use crate::repo::classify::RepoContext;
use crate::rules::catalog::RuleId;
use crate::rules::eval::{evaluate, evaluate_rules};
use crate::rules::extensions::extension_rules;
use crate::rules::finding::{Finding, FindingsSet};
use crate::util::deterministic::dedup_preserving_order;

/// What one invocation is asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    IdentifyOnly,
    FindMeta,
    /// Evaluate every metadata file in the tree, report only.
    ComplianceOnly,
    /// Explicit changed-file list, enforcing.
    Files {
        files: Vec<PathBuf>,
        interactive: bool,
    },
    /// Commit-time: staged files, advisory.
    StagedFiles { files: Vec<PathBuf> },
    /// Push-time or manual range check, enforcing.
    CommitRange {
        files: Vec<PathBuf>,
        interactive: bool,
    },
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::IdentifyOnly => "identify-only",
            Mode::FindMeta => "find-meta",
            Mode::ComplianceOnly => "compliance-only",
            Mode::Files { .. } => "files",
            Mode::StagedFiles { .. } => "staged-files",
            Mode::CommitRange { .. } => "commit-range",
        }
    }
}

/// Collaborators needed to collect and record an override.
pub struct Interaction<'a> {
    pub surface: &'a mut dyn PresentationSurface,
    pub store: &'a mut dyn CommitMessageStore,
}

#[derive(Debug, Clone)]
pub struct Outcome {
    pub mode: &'static str,
    pub meta_files: Vec<PathBuf>,
    pub findings: FindingsSet,
    pub verdict: Verdict,
}

pub struct Orchestrator<'a> {
    ctx: &'a RepoContext,
    config: &'a Config,
}

impl<'a> Orchestrator<'a> {
    pub fn new(ctx: &'a RepoContext, config: &'a Config) -> Self {
        Self { ctx, config }
    }

    pub fn run(&self, mode: &Mode, interaction: Option<&mut Interaction<'_>>) -> Outcome {
        let mut outcome = Outcome {
            mode: mode.name(),
            meta_files: Vec::new(),
            findings: FindingsSet::new(),
            verdict: Verdict::pass("repository not in scope"),
        };
        if !self.ctx.category.in_scope() {
            info!(name = %self.ctx.name, "repository not in scope, skipping validation");
            return outcome;
        }
        info!(category = %self.ctx.category, mode = mode.name(), "validating repository");

        match mode {
            Mode::IdentifyOnly => {
                outcome.verdict = Verdict::pass("repository identified");
            }
            Mode::FindMeta => {
                outcome.meta_files = self.locate();
                outcome.verdict = Verdict::pass("metadata files listed");
            }
            Mode::ComplianceOnly => {
                outcome.meta_files = self.locate();
                outcome.findings = self.evaluate_files(&outcome.meta_files);
                outcome.verdict = Verdict::pass("report only");
            }
            Mode::StagedFiles { files } => {
                outcome.meta_files = self.meta_files_for(files);
                outcome.findings = self.evaluate_files(&outcome.meta_files);
                outcome.verdict = Verdict::pass("advisory check");
            }
            Mode::Files { files, interactive } | Mode::CommitRange { files, interactive } => {
                outcome.meta_files = self.meta_files_for(files);
                outcome.findings = self.evaluate_files(&outcome.meta_files);
                outcome.verdict = self.enforce(&outcome.findings, *interactive, interaction);
            }
        }
        outcome
    }

    /// Every metadata file in the work tree.
    pub fn locate(&self) -> Vec<PathBuf> {
        let files = find_meta_files(&self.ctx.root, &self.config.file_types.ignore_patterns);
        debug!(count = files.len(), "located metadata files");
        files
    }

    /// Closest metadata file for each changed file, each listed once.
    pub fn meta_files_for(&self, changed: &[PathBuf]) -> Vec<PathBuf> {
        let found = changed.iter().filter_map(|file| {
            let meta = closest_meta_file(&self.ctx.root, file);
            if meta.is_none() {
                debug!(file = %file.display(), "no metadata file governs changed file");
            }
            meta
        });
        dedup_preserving_order(found)
    }

    pub fn evaluate_files(&self, files: &[PathBuf]) -> FindingsSet {
        files.iter().flat_map(|f| self.evaluate_file(f)).collect()
    }

    /// Parse and evaluate one file. A decode failure is the file's only finding.
    pub fn evaluate_file(&self, path: &Path) -> Vec<Finding> {
        let rel = self.ctx.display_path(path);
        let doc = match parse_file(path) {
            Ok(doc) => doc,
            Err(err) => {
                warn!(file = %rel, error = %err, "cannot parse metadata file");
                return vec![Finding::error(rel, RuleId::ParseError, err.to_string())];
            }
        };
        let mut findings = evaluate(&doc, &rel);
        let category = self.ctx.category;
        if self.config.extensions_enabled(category) {
            findings.extend(evaluate_rules(extension_rules(category), &doc, &rel));
        }
        debug!(file = %rel, findings = findings.len(), "evaluated metadata file");
        findings
    }

    fn enforce(
        &self,
        findings: &FindingsSet,
        interactive: bool,
        interaction: Option<&mut Interaction<'_>>,
    ) -> Verdict {
        if findings.is_empty() {
            return Verdict::pass("validation passed");
        }
        if !interactive {
            return Verdict::fail("validation failed");
        }
        let Some(interaction) = interaction else {
            return Verdict::fail("validation failed and no prompt is available");
        };

        let workflow = run_override(findings, &mut *interaction.surface);
        let decision = match workflow.decision {
            Some(decision) if decision.proceed => decision,
            _ => return Verdict::fail("push cancelled"),
        };
        let annotated = match annotate(&mut *interaction.store, &decision, findings) {
            Ok(message) => message.is_some(),
            Err(err) => {
                warn!(error = %err, "could not record override in commit message");
                false
            }
        };
        Verdict::overridden(decision.justification.unwrap_or_default(), annotated)
    }
}
