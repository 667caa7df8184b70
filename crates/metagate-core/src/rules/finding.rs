use serde::{Deserialize, Serialize};

use crate::rules::catalog::{RuleId, Severity};

/// One rule violation for one metadata file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    /// Path of the metadata file, relative to the repository root when possible.
    pub file: String,
    pub rule_id: RuleId,
    pub message: String,
}

impl Finding {
    pub fn error(file: impl Into<String>, rule_id: RuleId, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            file: file.into(),
            rule_id,
            message: message.into(),
        }
    }
}

/// Findings for a whole run, in discovery order.
///
/// A `(file, rule_id)` pair is kept at most once; later duplicates are
/// dropped so the first report of a violation wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct FindingsSet {
    items: Vec<Finding>,
}

impl FindingsSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if an equivalent finding was already recorded.
    pub fn push(&mut self, finding: Finding) -> bool {
        let duplicate = self
            .items
            .iter()
            .any(|f| f.file == finding.file && f.rule_id == finding.rule_id);
        if duplicate {
            return false;
        }
        self.items.push(finding);
        true
    }

    pub fn extend(&mut self, findings: impl IntoIterator<Item = Finding>) {
        for finding in findings {
            self.push(finding);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Finding> {
        self.items.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.items.iter().filter(|f| f.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.items.iter().filter(|f| f.severity == Severity::Warning)
    }

    /// Findings grouped by file, files in first-seen order.
    pub fn by_file(&self) -> Vec<(&str, Vec<&Finding>)> {
        let mut groups: Vec<(&str, Vec<&Finding>)> = Vec::new();
        for finding in &self.items {
            match groups.iter_mut().find(|(file, _)| *file == finding.file) {
                Some((_, list)) => list.push(finding),
                None => groups.push((finding.file.as_str(), vec![finding])),
            }
        }
        groups
    }
}

impl<'a> IntoIterator for &'a FindingsSet {
    type Item = &'a Finding;
    type IntoIter = std::slice::Iter<'a, Finding>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<Finding> for FindingsSet {
    fn from_iter<I: IntoIterator<Item = Finding>>(iter: I) -> Self {
        let mut set = FindingsSet::new();
        set.extend(iter);
        set
    }
}
