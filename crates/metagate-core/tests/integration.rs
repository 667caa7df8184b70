use std::fs;
use std::path::{Path, PathBuf};

use metagate_core::config::Config;
use metagate_core::error::MetagateError;
use metagate_core::gate::surface::{Action, JustificationReply, PresentationSurface};
use metagate_core::gate::workflow::{WorkflowState, run_override};
use metagate_core::history::annotate::{InMemoryCommitStore, NOTICE_HEADER};
use metagate_core::orchestrator::{Interaction, Mode};
use metagate_core::report::model::{Report, ToolInfo, VerdictStatus};
use metagate_core::repo::classify::{Category, RepoContext};
use metagate_core::rules::catalog::RuleId;
use metagate_core::rules::finding::FindingsSet;
use tempfile::TempDir;

const PCF_NAME: &str = "acme-decision-service-payments";

const COMPLIANT_JSON: &str = r#"{
  "metaDataVersion": "6.2.0",
  "assetName": "payments-api",
  "assetVersion": "1.0.0.17",
  "autoIncrementAssetVersion": true,
  "contractFileName": "openapi.yaml",
  "ignore": false,
  "API": {
    "layer": "sAPI",
    "audience": "internal",
    "version": {
      "contractVersion": "v1.4.0",
      "status": "live",
      "privateAPI": false,
      "apiStyle": "Request-Response",
      "architecturalStyle": "REST",
      "dataClassification": "confidential",
      "transactionNames": ["createPayment"]
    },
    "contract": {"GBGF": "WPB"},
    "contractOwner": {
      "serviceLine": "Payments",
      "teamName": "Rails",
      "teamEmailAddress": "rails@example.com"
    }
  }
}"#;

const JUSTIFICATION: &str = "Incident 4411 hotfix, metadata fix tracked in API-982.";

/// Surface that replays a fixed sequence of answers.
struct Scripted {
    actions: Vec<Action>,
    replies: Vec<JustificationReply>,
    presented: usize,
    rejections_seen: Vec<String>,
}

impl Scripted {
    fn new(actions: Vec<Action>, replies: Vec<&str>) -> Self {
        Self {
            actions,
            replies: replies
                .into_iter()
                .map(|r| JustificationReply::Text(r.to_string()))
                .collect(),
            presented: 0,
            rejections_seen: Vec::new(),
        }
    }
}

impl PresentationSurface for Scripted {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn present(&mut self, _: &FindingsSet, _: &str) -> Result<Action, MetagateError> {
        self.presented += 1;
        if self.actions.is_empty() {
            return Ok(Action::Cancel);
        }
        Ok(self.actions.remove(0))
    }

    fn justify(&mut self, rejection: Option<&str>) -> Result<JustificationReply, MetagateError> {
        if let Some(reason) = rejection {
            self.rejections_seen.push(reason.to_string());
        }
        if self.replies.is_empty() {
            return Ok(JustificationReply::Cancel);
        }
        Ok(self.replies.remove(0))
    }
}

fn tool() -> ToolInfo {
    ToolInfo {
        name: "metagate".into(),
        version: "0.1.0-test".into(),
    }
}

fn write(root: &Path, rel: &str, body: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, body).unwrap();
    path
}

fn run_mode(ctx: &RepoContext, mode: &Mode) -> Report {
    metagate_core::run(ctx, &Config::default(), mode, None, tool())
}

fn rule_ids(report: &Report) -> Vec<RuleId> {
    report.findings.iter().map(|f| f.rule_id).collect()
}

#[test]
fn compliant_repository_passes_every_mode() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "api.meta.json", COMPLIANT_JSON);
    let src = write(tmp.path(), "src/lib.rs", "");
    let ctx = RepoContext::new(tmp.path(), PCF_NAME);
    assert_eq!(ctx.category, Category::Pcf);

    for mode in [
        Mode::ComplianceOnly,
        Mode::StagedFiles {
            files: vec![src.clone()],
        },
        Mode::CommitRange {
            files: vec![src.clone()],
            interactive: false,
        },
    ] {
        let report = run_mode(&ctx, &mode);
        assert!(report.findings.is_empty(), "{}: {:?}", report.mode, report.findings);
        assert_eq!(report.verdict.exit_code, 0);
    }
}

#[test]
fn known_bad_values_each_fire_once() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "api.meta",
        r#"{"metaDataVersion":"5.0.0","assetVersion":"2.0.0","API":{"layer":"pAPI"},"GBGF":"INVALID"}"#,
    );
    let ctx = RepoContext::new(tmp.path(), PCF_NAME);
    let report = run_mode(&ctx, &Mode::ComplianceOnly);
    let ids = rule_ids(&report);

    for expected in [
        RuleId::MetaDataVersion,
        RuleId::AssetName,
        RuleId::AssetVersion,
        RuleId::ApiLayer,
        RuleId::Gbgf,
    ] {
        assert_eq!(ids.iter().filter(|id| **id == expected).count(), 1, "{expected}");
    }
    assert!(report.findings.iter().all(|f| f.file == "api.meta"));
}

#[test]
fn layer_specific_rules_follow_layer() {
    let tmp = TempDir::new().unwrap();
    let mut doc: serde_json::Value = serde_json::from_str(COMPLIANT_JSON).unwrap();
    doc["API"]["layer"] = "xAPI".into();
    write(tmp.path(), "api.meta.json", &doc.to_string());
    let ctx = RepoContext::new(tmp.path(), PCF_NAME);

    let ids = rule_ids(&run_mode(&ctx, &Mode::ComplianceOnly));
    assert_eq!(ids, vec![RuleId::BusinessModels]);

    doc["API"]["layer"] = "eAPI".into();
    doc["API"]["version"]
        .as_object_mut()
        .unwrap()
        .remove("transactionNames");
    write(tmp.path(), "api.meta.json", &doc.to_string());
    assert!(run_mode(&ctx, &Mode::ComplianceOnly).findings.is_empty());
}

#[test]
fn every_encoding_is_understood() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "json/api.meta", COMPLIANT_JSON);
    write(
        tmp.path(),
        "props/api.meta",
        "metaDataVersion=6.1.0\nassetName=orders\n# comment\nAPI.layer=sAPI\n",
    );
    write(tmp.path(), "yaml/api.meta.yml", "metaDataVersion: 7.0.0\nAPI:\n  layer: xAPI\n");
    let ctx = RepoContext::new(tmp.path(), PCF_NAME);

    let report = run_mode(&ctx, &Mode::ComplianceOnly);
    assert_eq!(report.meta_files.len(), 3);
    assert!(!rule_ids(&report).contains(&RuleId::ParseError));
    assert!(!report.findings.iter().any(|f| f.file == "json/api.meta"));
    assert!(
        !report
            .findings
            .iter()
            .any(|f| f.rule_id == RuleId::MetaDataVersion)
    );
}

#[test]
fn parse_failure_does_not_affect_other_files() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "good/api.meta.json", COMPLIANT_JSON);
    write(tmp.path(), "bad/api.meta.json", "{ nope");
    let ctx = RepoContext::new(tmp.path(), PCF_NAME);

    let report = run_mode(&ctx, &Mode::ComplianceOnly);
    assert_eq!(report.findings.len(), 1);
    let finding = report.findings.iter().next().unwrap();
    assert_eq!(finding.rule_id, RuleId::ParseError);
    assert_eq!(finding.file, "bad/api.meta.json");
}

#[test]
fn closest_meta_file_governs_nested_changes() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "api.meta.json", COMPLIANT_JSON);
    write(tmp.path(), "svc/orders/api.meta", "{}");
    let nested = write(tmp.path(), "svc/orders/src/handler.rs", "");
    let top = write(tmp.path(), "README.md", "");
    let ctx = RepoContext::new(tmp.path(), PCF_NAME);

    let report = run_mode(
        &ctx,
        &Mode::StagedFiles {
            files: vec![nested, top],
        },
    );
    assert_eq!(report.meta_files, vec!["svc/orders/api.meta", "api.meta.json"]);
    assert!(report.findings.iter().all(|f| f.file == "svc/orders/api.meta"));
    assert_eq!(report.verdict.status, VerdictStatus::Pass);
}

#[test]
fn out_of_scope_repository_is_never_read() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "api.meta.json", "{ nope");
    fs::create_dir(tmp.path().join("SHP")).unwrap();
    let ctx = RepoContext::new(tmp.path(), PCF_NAME);
    assert_eq!(ctx.category, Category::None);

    let report = run_mode(&ctx, &Mode::ComplianceOnly);
    assert!(report.meta_files.is_empty());
    assert!(report.findings.is_empty());
    assert_eq!(report.verdict.exit_code, 0);
}

#[test]
fn override_with_justification_annotates_commit() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "api.meta", "{}");
    let src = write(tmp.path(), "src/lib.rs", "");
    let ctx = RepoContext::new(tmp.path(), PCF_NAME);
    let mut surface = Scripted::new(vec![Action::Proceed], vec!["n/a", "tbd", JUSTIFICATION]);
    let mut store = InMemoryCommitStore::new("Add refunds endpoint\n");

    let report = {
        let mut interaction = Interaction {
            surface: &mut surface,
            store: &mut store,
        };
        metagate_core::run(
            &ctx,
            &Config::default(),
            &Mode::CommitRange {
                files: vec![src],
                interactive: true,
            },
            Some(&mut interaction),
            tool(),
        )
    };

    assert_eq!(report.verdict.exit_code, 0);
    assert_eq!(report.verdict.justification.as_deref(), Some(JUSTIFICATION));
    assert!(report.verdict.annotated);
    assert_eq!(surface.rejections_seen.len(), 2);
    assert_eq!(store.amendments, 1);
    assert!(store.message.starts_with("Add refunds endpoint\n====="));
    assert_eq!(store.message.matches(NOTICE_HEADER).count(), 1);
    assert!(store.message.contains(&format!("  {JUSTIFICATION}")));
    assert!(store.message.contains("VALIDATION ERRORS (18):"));
}

#[test]
fn cancel_blocks_and_leaves_history_alone() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "api.meta", "{}");
    let src = write(tmp.path(), "src/lib.rs", "");
    let ctx = RepoContext::new(tmp.path(), PCF_NAME);
    let mut surface = Scripted::new(vec![Action::Cancel], vec![]);
    let mut store = InMemoryCommitStore::new("Add refunds endpoint");

    let report = {
        let mut interaction = Interaction {
            surface: &mut surface,
            store: &mut store,
        };
        metagate_core::run(
            &ctx,
            &Config::default(),
            &Mode::Files {
                files: vec![src],
                interactive: true,
            },
            Some(&mut interaction),
            tool(),
        )
    };

    assert_eq!(report.verdict.status, VerdictStatus::Fail);
    assert_eq!(report.verdict.exit_code, 1);
    assert_eq!(store.amendments, 0);
    assert_eq!(store.message, "Add refunds endpoint");
}

#[test]
fn override_is_skipped_when_nothing_failed() {
    let findings = FindingsSet::new();
    let mut surface = Scripted::new(vec![Action::Proceed], vec![JUSTIFICATION]);
    let outcome = run_override(&findings, &mut surface);
    assert_eq!(outcome.state(), WorkflowState::Passed);
    assert!(outcome.decision.is_none());
    assert_eq!(surface.presented, 0);
}

#[test]
fn repeated_runs_are_identical() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "a/api.meta", r#"{"API":{"layer":"eAPI"}}"#);
    write(tmp.path(), "b/api.meta.yaml", "assetName: x\n");
    let ctx = RepoContext::new(tmp.path(), PCF_NAME);

    let first = serde_json::to_string(&run_mode(&ctx, &Mode::ComplianceOnly)).unwrap();
    let second = serde_json::to_string(&run_mode(&ctx, &Mode::ComplianceOnly)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn disabled_extensions_keep_core_rules() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "api.meta", "{}");
    let ctx = RepoContext::new(tmp.path(), PCF_NAME);
    let mut config = Config::default();
    config.pcf_rules.enabled = false;

    let report = metagate_core::run(&ctx, &config, &Mode::ComplianceOnly, None, tool());
    assert_eq!(report.findings.len(), 18);
}
