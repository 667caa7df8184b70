//! Rule evaluation against one parsed metadata document.
//!
//! Responsibilities:
//! - Resolve each rule's field through its primary/alternate paths
//! - Apply the rule's check and produce at most one finding per rule
//! - Skip conditional rules whose trigger does not hold
//!
//! Non-responsibilities:
//! - Locating or decoding files (`meta::locate`, `meta::parse`)
//! - Deciding pass/fail for a run (`orchestrator`, `gate`)
//!
//! Evaluation is pure: the same document always yields the same findings
//! in catalog order. A value of the wrong shape fails its own rule and
//! never stops the remaining rules from running.

use serde_json::Value;
use tracing::warn;

use crate::meta::document::MetadataDocument;
use crate::rules::catalog::{Check, Condition, LAYER_PATH, RULES, RuleDef};
use crate::rules::finding::Finding;

/// Evaluate the full catalog.
pub fn evaluate(doc: &MetadataDocument, file: &str) -> Vec<Finding> {
    evaluate_rules(&RULES, doc, file)
}

/// Evaluate an arbitrary rule list, in order.
pub fn evaluate_rules(rules: &[RuleDef], doc: &MetadataDocument, file: &str) -> Vec<Finding> {
    rules
        .iter()
        .filter(|rule| applies(rule.when, doc))
        .filter_map(|rule| {
            check_rule(rule, doc).err().map(|message| Finding {
                severity: rule.severity,
                file: file.to_string(),
                rule_id: rule.id,
                message,
            })
        })
        .collect()
}

fn applies(when: Condition, doc: &MetadataDocument) -> bool {
    match when {
        Condition::Always => true,
        Condition::LayerIs(layer) => doc.get(LAYER_PATH).and_then(Value::as_str) == Some(layer),
    }
}

fn check_rule(rule: &RuleDef, doc: &MetadataDocument) -> Result<(), String> {
    let Some((path, value)) = doc.resolve(rule.paths) else {
        return Err(missing_message(rule));
    };
    flag_conflicting_alternates(rule, path, value, doc);
    check_value(&rule.check, value).map_err(|problem| format!("{} {}", rule.field, problem))
}

/// The first populated path wins. A later path holding a different value
/// is reported in the log only; no precedence rule exists between them.
fn flag_conflicting_alternates(rule: &RuleDef, used: &str, value: &Value, doc: &MetadataDocument) {
    for other in rule.paths.iter().filter(|p| **p != used) {
        if let Some(other_value) = doc.get(other) {
            if other_value != value {
                warn!(
                    rule = %rule.id,
                    used,
                    ignored = *other,
                    "conflicting values at alternate paths, using the first"
                );
            }
        }
    }
}

fn missing_message(rule: &RuleDef) -> String {
    if rule.paths.len() > 1 {
        format!(
            "{} is missing (looked in {})",
            rule.field,
            rule.paths.join(", ")
        )
    } else {
        format!("{} is missing", rule.field)
    }
}

fn check_value(check: &Check, value: &Value) -> Result<(), String> {
    match check {
        Check::MinVersion(major, minor, patch) => {
            let text = scalar_text(value)?;
            let Some(found) = parse_version(&text) else {
                return Err(format!("`{text}` is not a semantic version"));
            };
            let minimum = (*major, *minor, *patch);
            if found.core < minimum || (found.core == minimum && found.pre_release) {
                return Err(format!(
                    "`{text}` is below the minimum {major}.{minor}.{patch}"
                ));
            }
            Ok(())
        }
        Check::Pattern(re) => {
            let text = as_text(value)?;
            if re.is_match(text) {
                Ok(())
            } else {
                Err(format!("`{text}` does not match {}", re.as_str()))
            }
        }
        Check::VersionPrefix(prefix) => {
            let text = as_text(value)?;
            let ok = text == *prefix
                || text
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('.'));
            if ok {
                Ok(())
            } else {
                Err(format!("`{text}` must start with {prefix}"))
            }
        }
        Check::IsBool(expected) => match value {
            Value::Bool(b) if b == expected => Ok(()),
            Value::Bool(b) => Err(format!("is {b}, expected {expected}")),
            other => Err(format!("expected boolean {expected}, found {}", kind(other))),
        },
        Check::NonEmpty => match value {
            Value::String(s) if !s.trim().is_empty() => Ok(()),
            Value::Array(items) if !items.is_empty() => Ok(()),
            Value::Object(map) if !map.is_empty() => Ok(()),
            Value::String(_) | Value::Array(_) | Value::Object(_) => Err("is empty".to_string()),
            other => Err(format!("expected text or a list, found {}", kind(other))),
        },
        Check::OneOf(allowed) => {
            let text = as_text(value)?;
            if allowed.iter().any(|a| *a == text) {
                Ok(())
            } else {
                Err(format!("`{text}` is not one of {}", allowed.join(", ")))
            }
        }
        Check::Present => match value {
            Value::String(s) if s.trim().is_empty() => Err("is empty".to_string()),
            _ => Ok(()),
        },
        Check::Exists => Ok(()),
    }
}

fn as_text(value: &Value) -> Result<&str, String> {
    value
        .as_str()
        .ok_or_else(|| format!("expected text, found {}", kind(value)))
}

/// Strings and bare numbers (YAML `6` or `6.0`) both count as version text.
fn scalar_text(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(format!("expected a version, found {}", kind(other))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "text",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

#[derive(Debug, PartialEq, Eq)]
struct ParsedVersion {
    core: (u64, u64, u64),
    pre_release: bool,
}

/// `MAJOR[.MINOR[.PATCH]][-pre][+build]`, optional leading `v`.
fn parse_version(input: &str) -> Option<ParsedVersion> {
    let trimmed = input.trim();
    let trimmed = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    let without_build = trimmed.split('+').next()?;
    let (core, pre_release) = match without_build.split_once('-') {
        Some((core, pre)) if !pre.is_empty() => (core, true),
        Some(_) => return None,
        None => (without_build, false),
    };

    let mut parts = core.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = match parts.next() {
        Some(p) => p.parse().ok()?,
        None => 0,
    };
    let patch = match parts.next() {
        Some(p) => p.parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }
    Some(ParsedVersion {
        core: (major, minor, patch),
        pre_release,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::catalog::RuleId;
    use serde_json::json;

    fn doc(value: Value) -> MetadataDocument {
        match value {
            Value::Object(map) => MetadataDocument::new(map),
            _ => panic!("fixture must be an object"),
        }
    }

    fn compliant() -> Value {
        json!({
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
        })
    }

    fn ids(findings: &[Finding]) -> Vec<RuleId> {
        findings.iter().map(|f| f.rule_id).collect()
    }

    #[test]
    fn compliant_document_has_no_findings() {
        let findings = evaluate(&doc(compliant()), "api.meta");
        assert!(findings.is_empty(), "unexpected: {findings:?}");
    }

    #[test]
    fn empty_document_fails_every_unconditional_rule() {
        let findings = evaluate(&doc(json!({})), "api.meta");
        assert_eq!(findings.len(), 18);
        assert!(!ids(&findings).contains(&RuleId::BusinessModels));
        assert!(!ids(&findings).contains(&RuleId::TransactionNames));
        assert!(findings.iter().all(|f| f.file == "api.meta"));
    }

    #[test]
    fn known_bad_values_each_fire_once() {
        let d = doc(json!({
            "metaDataVersion": "5.0.0",
            "assetVersion": "2.0.0",
            "API": {"layer": "pAPI"},
            "GBGF": "INVALID"
        }));
        let found = ids(&evaluate(&d, "api.meta"));
        for expected in [
            RuleId::MetaDataVersion,
            RuleId::AssetVersion,
            RuleId::ApiLayer,
            RuleId::Gbgf,
        ] {
            assert_eq!(found.iter().filter(|id| **id == expected).count(), 1);
        }
    }

    #[test]
    fn business_models_only_checked_for_xapi() {
        let mut value = compliant();
        value["API"]["layer"] = json!("xAPI");
        value["API"]["version"]["businessModels"] = json!([]);
        let found = ids(&evaluate(&doc(value.clone()), "api.meta"));
        assert_eq!(found, vec![RuleId::BusinessModels]);

        value["API"]["layer"] = json!("eAPI");
        let found = ids(&evaluate(&doc(value), "api.meta"));
        assert!(found.is_empty());
    }

    #[test]
    fn transaction_names_required_for_sapi() {
        let mut value = compliant();
        value["API"]["version"]
            .as_object_mut()
            .unwrap()
            .remove("transactionNames");
        assert_eq!(
            ids(&evaluate(&doc(value), "api.meta")),
            vec![RuleId::TransactionNames]
        );
    }

    #[test]
    fn owner_fields_resolve_from_alternate_path() {
        let mut value = compliant();
        value["API"].as_object_mut().unwrap().remove("contractOwner");
        value["contractOwner"] = json!({
            "serviceLine": "Payments",
            "teamName": "Rails",
            "teamEmailAddress": "rails@example.com",
            "GBGF": "CMB"
        });
        value["API"].as_object_mut().unwrap().remove("contract");
        assert!(evaluate(&doc(value), "api.meta").is_empty());
    }

    #[test]
    fn empty_primary_path_wins_over_alternate() {
        let mut value = compliant();
        value["API"]["contractOwner"]["teamName"] = json!("");
        value["contractOwner"] = json!({"teamName": "Rails"});
        let findings = evaluate(&doc(value), "api.meta");
        assert_eq!(ids(&findings), vec![RuleId::TeamName]);
        assert_eq!(findings[0].message, "teamName is empty");
    }

    #[test]
    fn wrong_shape_fails_only_its_rule() {
        let mut value = compliant();
        value["API"]["layer"] = json!(["sAPI"]);
        value["autoIncrementAssetVersion"] = json!("true");
        let findings = evaluate(&doc(value), "api.meta");
        assert_eq!(
            ids(&findings),
            vec![RuleId::AutoIncrementAssetVersion, RuleId::ApiLayer]
        );
        assert_eq!(findings[1].message, "API.layer expected text, found a list");
    }

    #[test]
    fn missing_api_section_does_not_abort() {
        let mut value = compliant();
        value.as_object_mut().unwrap().remove("API");
        let findings = evaluate(&doc(value), "api.meta");
        assert!(ids(&findings).contains(&RuleId::ApiLayer));
        assert!(ids(&findings).contains(&RuleId::TeamEmailAddress));
    }

    #[test]
    fn asset_version_prefix_is_exact() {
        for (version, ok) in [
            ("1.0.0", true),
            ("1.0.0.3", true),
            ("1.0.01", false),
            ("1.0", false),
            ("2.0.0", false),
        ] {
            let mut value = compliant();
            value["assetVersion"] = json!(version);
            assert_eq!(evaluate(&doc(value), "api.meta").is_empty(), ok, "{version}");
        }
    }

    #[test]
    fn meta_data_version_accepts_numbers_and_short_forms() {
        for (version, ok) in [
            (json!("6.0.0"), true),
            (json!("v6.1"), true),
            (json!(7), true),
            (json!(6.5), true),
            (json!("5.9.9"), false),
            (json!("6.0.0-rc.1"), false),
            (json!("six"), false),
        ] {
            let mut value = compliant();
            value["metaDataVersion"] = version.clone();
            assert_eq!(evaluate(&doc(value), "api.meta").is_empty(), ok, "{version}");
        }
    }

    #[test]
    fn private_api_accepts_any_present_value() {
        for value in [json!(""), json!("yes"), json!(true), json!(0), json!([])] {
            let mut d = compliant();
            d["API"]["version"]["privateAPI"] = value.clone();
            assert!(evaluate(&doc(d), "api.meta").is_empty(), "{value}");
        }

        let mut d = compliant();
        d["API"]["version"]["privateAPI"] = Value::Null;
        assert_eq!(ids(&evaluate(&doc(d), "api.meta")), vec![RuleId::PrivateApi]);
    }

    #[test]
    fn owner_fields_still_reject_empty_text() {
        let mut d = compliant();
        d["API"]["contractOwner"]["teamName"] = json!("  ");
        assert_eq!(ids(&evaluate(&doc(d), "api.meta")), vec![RuleId::TeamName]);
    }

    #[test]
    fn evaluation_is_repeatable() {
        let d = doc(json!({"API": {"layer": "xAPI"}}));
        assert_eq!(evaluate(&d, "api.meta"), evaluate(&d, "api.meta"));
    }

    #[test]
    fn version_parser_handles_suffixes() {
        assert_eq!(
            parse_version("6.1.2+build.5"),
            Some(ParsedVersion { core: (6, 1, 2), pre_release: false })
        );
        assert_eq!(parse_version("6.1.2.3"), None);
        assert_eq!(parse_version("6-"), None);
    }
}
