//! The fixed rule catalog.
//!
//! Every rule is a row of data: which field it reads (with an optional
//! alternate path), what check applies, and when it applies. Evaluation
//! lives in `rules::eval`; nothing here touches a document.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RuleId {
    MetaDataVersion,
    AssetName,
    AssetVersion,
    AutoIncrementAssetVersion,
    ContractFileName,
    Ignore,
    ApiLayer,
    ApiAudience,
    ContractVersion,
    VersionStatus,
    PrivateApi,
    ApiStyle,
    ArchitecturalStyle,
    BusinessModels,
    DataClassification,
    Gbgf,
    ServiceLine,
    TeamName,
    TeamEmailAddress,
    TransactionNames,
    /// Not a catalog rule: the file could not be decoded at all.
    ParseError,
}

impl RuleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::MetaDataVersion => "meta-data-version",
            RuleId::AssetName => "asset-name",
            RuleId::AssetVersion => "asset-version",
            RuleId::AutoIncrementAssetVersion => "auto-increment-asset-version",
            RuleId::ContractFileName => "contract-file-name",
            RuleId::Ignore => "ignore",
            RuleId::ApiLayer => "api-layer",
            RuleId::ApiAudience => "api-audience",
            RuleId::ContractVersion => "contract-version",
            RuleId::VersionStatus => "version-status",
            RuleId::PrivateApi => "private-api",
            RuleId::ApiStyle => "api-style",
            RuleId::ArchitecturalStyle => "architectural-style",
            RuleId::BusinessModels => "business-models",
            RuleId::DataClassification => "data-classification",
            RuleId::Gbgf => "gbgf",
            RuleId::ServiceLine => "service-line",
            RuleId::TeamName => "team-name",
            RuleId::TeamEmailAddress => "team-email-address",
            RuleId::TransactionNames => "transaction-names",
            RuleId::ParseError => "parse-error",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// What a rule asserts about the resolved field value.
#[derive(Debug)]
pub enum Check {
    /// Semantic version at or above the given `(major, minor, patch)`.
    MinVersion(u64, u64, u64),
    Pattern(&'static LazyLock<Regex>),
    /// Equal to the prefix, or the prefix followed by `.`.
    VersionPrefix(&'static str),
    IsBool(bool),
    /// Non-empty string or list.
    NonEmpty,
    OneOf(&'static [&'static str]),
    /// Any value other than an empty string.
    Present,
    /// Any value at all; only absence fails.
    Exists,
}

/// Gate deciding whether a rule applies to a document at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Always,
    /// Only when `API.layer` is exactly this value.
    LayerIs(&'static str),
}

#[derive(Debug)]
pub struct RuleDef {
    pub number: u8,
    pub id: RuleId,
    /// Logical field name used in messages.
    pub field: &'static str,
    /// Concrete paths, primary first.
    pub paths: &'static [&'static str],
    pub check: Check,
    pub when: Condition,
    pub severity: Severity,
    pub description: &'static str,
}

pub const LAYER_PATH: &str = "API.layer";

pub const LAYERS: &[&str] = &["xAPI", "sAPI", "eAPI"];
pub const AUDIENCES: &[&str] = &["internal", "external"];
pub const STATUSES: &[&str] = &["develop", "test", "prelive", "live", "deprecated", "demised"];
pub const API_STYLES: &[&str] = &[
    "Request-Response",
    "Event-Driven",
    "Publish-Subscribe",
    "Streaming",
    "Batch",
    "Webhook",
    "Query",
    "Command",
    "File-Transfer",
];
pub const ARCHITECTURAL_STYLES: &[&str] = &["REST", "GRAPHQL", "SOAP", "RPC"];
pub const DATA_CLASSIFICATIONS: &[&str] =
    &["public", "internal", "confidential", "restricted", "secret"];
pub const GBGF_VALUES: &[&str] = &[
    "WPB",
    "CMB",
    "GBM",
    "GPB",
    "MSS",
    "GPS",
    "GTS",
    "AMG",
    "INS",
    "DBS",
    "CTO",
    "RISK",
    "COMPLIANCE",
    "FINANCE",
    "HR",
    "LEGAL",
    "AUDIT",
    "MARKETING",
    "STRATEGY",
    "OPERATIONS",
];

static ASSET_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]+(?:-?[a-z0-9]+)*$").unwrap());

static CONTRACT_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[vV]?[0-9]+(?:\.[0-9]+){1,2}$").unwrap());

const OWNER_SERVICE_LINE: &[&str] = &["API.contractOwner.serviceLine", "contractOwner.serviceLine"];
const OWNER_TEAM_NAME: &[&str] = &["API.contractOwner.teamName", "contractOwner.teamName"];
const OWNER_TEAM_EMAIL: &[&str] = &[
    "API.contractOwner.teamEmailAddress",
    "contractOwner.teamEmailAddress",
];

/// The twenty rules, in evaluation and display order.
pub static RULES: [RuleDef; 20] = [
    RuleDef {
        number: 1,
        id: RuleId::MetaDataVersion,
        field: "metaDataVersion",
        paths: &["metaDataVersion"],
        check: Check::MinVersion(6, 0, 0),
        when: Condition::Always,
        severity: Severity::Error,
        description: "must be a semantic version of at least 6.0.0",
    },
    RuleDef {
        number: 2,
        id: RuleId::AssetName,
        field: "assetName",
        paths: &["assetName"],
        check: Check::Pattern(&ASSET_NAME_RE),
        when: Condition::Always,
        severity: Severity::Error,
        description: "must be lowercase words optionally joined by single hyphens",
    },
    RuleDef {
        number: 3,
        id: RuleId::AssetVersion,
        field: "assetVersion",
        paths: &["assetVersion"],
        check: Check::VersionPrefix("1.0.0"),
        when: Condition::Always,
        severity: Severity::Error,
        description: "must start with 1.0.0",
    },
    RuleDef {
        number: 4,
        id: RuleId::AutoIncrementAssetVersion,
        field: "autoIncrementAssetVersion",
        paths: &["autoIncrementAssetVersion"],
        check: Check::IsBool(true),
        when: Condition::Always,
        severity: Severity::Error,
        description: "must be true",
    },
    RuleDef {
        number: 5,
        id: RuleId::ContractFileName,
        field: "contractFileName",
        paths: &["contractFileName"],
        check: Check::NonEmpty,
        when: Condition::Always,
        severity: Severity::Error,
        description: "must be present and non-empty",
    },
    RuleDef {
        number: 6,
        id: RuleId::Ignore,
        field: "ignore",
        paths: &["ignore"],
        check: Check::IsBool(false),
        when: Condition::Always,
        severity: Severity::Error,
        description: "must be false",
    },
    RuleDef {
        number: 7,
        id: RuleId::ApiLayer,
        field: "API.layer",
        paths: &[LAYER_PATH],
        check: Check::OneOf(LAYERS),
        when: Condition::Always,
        severity: Severity::Error,
        description: "must be one of xAPI, sAPI, eAPI",
    },
    RuleDef {
        number: 8,
        id: RuleId::ApiAudience,
        field: "API.audience",
        paths: &["API.audience"],
        check: Check::OneOf(AUDIENCES),
        when: Condition::Always,
        severity: Severity::Error,
        description: "must be one of internal, external",
    },
    RuleDef {
        number: 9,
        id: RuleId::ContractVersion,
        field: "API.version.contractVersion",
        paths: &["API.version.contractVersion"],
        check: Check::Pattern(&CONTRACT_VERSION_RE),
        when: Condition::Always,
        severity: Severity::Error,
        description: "must look like 1.2 or v1.2.3",
    },
    RuleDef {
        number: 10,
        id: RuleId::VersionStatus,
        field: "API.version.status",
        paths: &["API.version.status"],
        check: Check::OneOf(STATUSES),
        when: Condition::Always,
        severity: Severity::Error,
        description: "must be one of develop, test, prelive, live, deprecated, demised",
    },
    RuleDef {
        number: 11,
        id: RuleId::PrivateApi,
        field: "API.version.privateAPI",
        paths: &["API.version.privateAPI"],
        check: Check::Exists,
        when: Condition::Always,
        severity: Severity::Error,
        description: "must be present",
    },
    RuleDef {
        number: 12,
        id: RuleId::ApiStyle,
        field: "API.version.apiStyle",
        paths: &["API.version.apiStyle"],
        check: Check::OneOf(API_STYLES),
        when: Condition::Always,
        severity: Severity::Error,
        description: "must be a recognised API interaction style",
    },
    RuleDef {
        number: 13,
        id: RuleId::ArchitecturalStyle,
        field: "API.version.architecturalStyle",
        paths: &["API.version.architecturalStyle"],
        check: Check::OneOf(ARCHITECTURAL_STYLES),
        when: Condition::Always,
        severity: Severity::Error,
        description: "must be one of REST, GRAPHQL, SOAP, RPC",
    },
    RuleDef {
        number: 14,
        id: RuleId::BusinessModels,
        field: "API.version.businessModels",
        paths: &["API.version.businessModels"],
        check: Check::NonEmpty,
        when: Condition::LayerIs("xAPI"),
        severity: Severity::Error,
        description: "must be non-empty when API.layer is xAPI",
    },
    RuleDef {
        number: 15,
        id: RuleId::DataClassification,
        field: "API.version.dataClassification",
        paths: &["API.version.dataClassification"],
        check: Check::OneOf(DATA_CLASSIFICATIONS),
        when: Condition::Always,
        severity: Severity::Error,
        description: "must be one of public, internal, confidential, restricted, secret",
    },
    RuleDef {
        number: 16,
        id: RuleId::Gbgf,
        field: "GBGF",
        paths: &["API.contract.GBGF", "contractOwner.GBGF"],
        check: Check::OneOf(GBGF_VALUES),
        when: Condition::Always,
        severity: Severity::Error,
        description: "must be a recognised global business or function code",
    },
    RuleDef {
        number: 17,
        id: RuleId::ServiceLine,
        field: "serviceLine",
        paths: OWNER_SERVICE_LINE,
        check: Check::Present,
        when: Condition::Always,
        severity: Severity::Error,
        description: "must be present under API.contractOwner or contractOwner",
    },
    RuleDef {
        number: 18,
        id: RuleId::TeamName,
        field: "teamName",
        paths: OWNER_TEAM_NAME,
        check: Check::Present,
        when: Condition::Always,
        severity: Severity::Error,
        description: "must be present under API.contractOwner or contractOwner",
    },
    RuleDef {
        number: 19,
        id: RuleId::TeamEmailAddress,
        field: "teamEmailAddress",
        paths: OWNER_TEAM_EMAIL,
        check: Check::Present,
        when: Condition::Always,
        severity: Severity::Error,
        description: "must be present under API.contractOwner or contractOwner",
    },
    RuleDef {
        number: 20,
        id: RuleId::TransactionNames,
        field: "API.version.transactionNames",
        paths: &["API.version.transactionNames"],
        check: Check::NonEmpty,
        when: Condition::LayerIs("sAPI"),
        severity: Severity::Error,
        description: "must be non-empty when API.layer is sAPI",
    },
];

/// Human-readable listing of every rule, shown next to findings when
/// asking for an override.
pub fn reference_text() -> String {
    let mut out = String::new();
    for rule in RULES.iter() {
        let paths = if rule.paths.len() > 1 {
            format!(" ({})", rule.paths.join(" or "))
        } else {
            String::new()
        };
        out.push_str(&format!(
            "{:>2}. {}{}: {}\n",
            rule.number, rule.field, paths, rule.description
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_numbers_are_sequential() {
        let numbers: Vec<u8> = RULES.iter().map(|r| r.number).collect();
        assert_eq!(numbers, (1..=20).collect::<Vec<u8>>());
    }

    #[test]
    fn rule_ids_are_unique() {
        let mut ids: Vec<RuleId> = RULES.iter().map(|r| r.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), RULES.len());
        assert!(!ids.contains(&RuleId::ParseError));
    }

    #[test]
    fn rule_id_serializes_as_display_string() {
        for id in RULES.iter().map(|r| r.id).chain([RuleId::ParseError]) {
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json.trim_matches('"'), id.as_str());
        }
    }

    #[test]
    fn enumerations_have_documented_sizes() {
        assert_eq!(API_STYLES.len(), 9);
        assert_eq!(GBGF_VALUES.len(), 20);
    }

    #[test]
    fn patterns_accept_and_reject() {
        assert!(ASSET_NAME_RE.is_match("payments-api"));
        assert!(ASSET_NAME_RE.is_match("orders2"));
        assert!(!ASSET_NAME_RE.is_match("Payments"));
        assert!(!ASSET_NAME_RE.is_match("pay--ments"));
        assert!(!ASSET_NAME_RE.is_match("2orders"));

        assert!(CONTRACT_VERSION_RE.is_match("1.0"));
        assert!(CONTRACT_VERSION_RE.is_match("v2.3.4"));
        assert!(!CONTRACT_VERSION_RE.is_match("1"));
        assert!(!CONTRACT_VERSION_RE.is_match("1.2.3.4"));
    }

    #[test]
    fn reference_text_lists_every_rule() {
        let text = reference_text();
        assert_eq!(text.lines().count(), 20);
        assert!(text.contains("16. GBGF (API.contract.GBGF or contractOwner.GBGF)"));
    }
}
