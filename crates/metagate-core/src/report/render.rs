use serde::{Deserialize, Serialize};

use crate::TOOL_NAME;
use crate::report::model::Report;
use crate::rules::finding::FindingsSet;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} {}\n", TOOL_NAME, report.tool.version));
    out.push_str(&format!(
        "Repository: {} ({})\n",
        report.repository.name, report.repository.category
    ));
    out.push_str(&format!("Mode: {}\n", report.mode));
    if !report.meta_files.is_empty() {
        out.push_str("Metadata files:\n");
        for file in &report.meta_files {
            out.push_str(&format!("  - {file}\n"));
        }
    }
    if report.findings.is_empty() {
        out.push_str("No validation findings.\n");
    } else {
        out.push_str(&render_findings(&report.findings));
    }
    out.push_str(&format!(
        "Verdict: {:?} ({})\n",
        report.verdict.status, report.verdict.reason
    ));
    out
}

/// Findings grouped under their file, one line per finding.
pub fn render_findings(findings: &FindingsSet) -> String {
    let mut out = String::new();
    out.push_str(&format!("Findings ({}):\n", findings.len()));
    for (file, group) in findings.by_file() {
        out.push_str(&format!("  {file}\n"));
        for f in group {
            out.push_str(&format!("    [{}] {}: {}\n", f.severity, f.rule_id, f.message));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::catalog::RuleId;
    use crate::rules::finding::Finding;

    #[test]
    fn findings_are_grouped_by_file() {
        let findings: FindingsSet = vec![
            Finding::error("a/api.meta", RuleId::AssetName, "assetName is missing"),
            Finding::error("b/api.meta", RuleId::Ignore, "ignore is missing"),
            Finding::error("a/api.meta", RuleId::Gbgf, "GBGF is missing"),
        ]
        .into_iter()
        .collect();

        let text = render_findings(&findings);
        let expected = "Findings (3):\n  a/api.meta\n    [error] asset-name: assetName is missing\n    [error] gbgf: GBGF is missing\n  b/api.meta\n    [error] ignore: ignore is missing\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn output_format_defaults_to_text() {
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
        assert_eq!(serde_json::to_string(&OutputFormat::Json).unwrap(), "\"json\"");
    }
}
