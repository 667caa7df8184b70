//! Commit message audit block for overridden pushes.
//!
//! The block is appended after the author's message, which is kept as-is
//! apart from trailing whitespace. Layout:
//!
//! ```text
//! <original message>
//! ==================================================
//!             VALIDATION OVERRIDE NOTICE
//! ==================================================
//!
//! JUSTIFICATION:
//!   <justification>
//!
//! VALIDATION ERRORS (<count>):
//!   • <file> - <message>
//!
//! This commit was pushed despite validation failures.
//! Review and address these issues in a follow-up commit.
//! ==================================================
//! ```
//!
//! A `VALIDATION WARNINGS (<count>):` section follows the errors when any
//! finding is a warning. Empty sections are omitted.

use tracing::info;

use crate::error::MetagateError;
use crate::gate::workflow::OverrideDecision;
use crate::rules::finding::{Finding, FindingsSet};

pub const DELIMITER_WIDTH: usize = 50;
pub const NOTICE_HEADER: &str = "VALIDATION OVERRIDE NOTICE";

/// Where the outgoing commit's message is read from and written back to.
pub trait CommitMessageStore {
    fn head_message(&self) -> Result<String, MetagateError>;
    fn amend_head_message(&mut self, message: &str) -> Result<(), MetagateError>;
}

/// Store kept entirely in memory, for dry runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryCommitStore {
    pub message: String,
    pub amendments: usize,
}

impl InMemoryCommitStore {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            amendments: 0,
        }
    }
}

impl CommitMessageStore for InMemoryCommitStore {
    fn head_message(&self) -> Result<String, MetagateError> {
        Ok(self.message.clone())
    }

    fn amend_head_message(&mut self, message: &str) -> Result<(), MetagateError> {
        self.message = message.to_string();
        self.amendments += 1;
        Ok(())
    }
}

pub fn audit_block(justification: &str, findings: &FindingsSet) -> String {
    let delimiter = "=".repeat(DELIMITER_WIDTH);
    let pad = (DELIMITER_WIDTH.saturating_sub(NOTICE_HEADER.len())) / 2;

    let mut lines = vec![
        delimiter.clone(),
        format!("{}{}", " ".repeat(pad), NOTICE_HEADER),
        delimiter.clone(),
        String::new(),
        "JUSTIFICATION:".to_string(),
    ];
    lines.extend(justification.lines().map(|l| format!("  {l}")));
    lines.push(String::new());

    let errors: Vec<&Finding> = findings.errors().collect();
    let warnings: Vec<&Finding> = findings.warnings().collect();
    push_section(&mut lines, "VALIDATION ERRORS", &errors);
    push_section(&mut lines, "VALIDATION WARNINGS", &warnings);

    lines.push("This commit was pushed despite validation failures.".to_string());
    lines.push("Review and address these issues in a follow-up commit.".to_string());
    lines.push(delimiter);
    lines.join("\n")
}

fn push_section(lines: &mut Vec<String>, title: &str, findings: &[&Finding]) {
    if findings.is_empty() {
        return;
    }
    lines.push(format!("{title} ({}):", findings.len()));
    lines.extend(
        findings
            .iter()
            .map(|f| format!("  \u{2022} {} - {}", f.file, f.message)),
    );
    lines.push(String::new());
}

/// Original message with the audit block appended on the next line.
pub fn annotated_message(original: &str, justification: &str, findings: &FindingsSet) -> String {
    format!("{}\n{}", original.trim_end(), audit_block(justification, findings))
}

/// Append the audit block for a proceed decision and persist it.
///
/// Returns the new message, or `None` when the decision does not call for
/// an annotation (cancelled, or no justification).
pub fn annotate(
    store: &mut dyn CommitMessageStore,
    decision: &OverrideDecision,
    findings: &FindingsSet,
) -> Result<Option<String>, MetagateError> {
    let Some(justification) = decision.justification.as_deref().filter(|_| decision.proceed) else {
        return Ok(None);
    };
    let original = store.head_message()?;
    let message = annotated_message(&original, justification, findings);
    store.amend_head_message(&message)?;
    info!(findings = findings.len(), "override recorded in commit message");
    Ok(Some(message))
}
