//! Metadata decoding.
//!
//! Turns the bytes of a located `api.meta` file into a [`MetadataDocument`]
//! whatever its concrete encoding. Decode failures are returned as
//! [`ParseError`] and never panic; the caller converts them into a single
//! `parse-error` finding for the file.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::meta::document::MetadataDocument;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("cannot read file: {0}")]
    Read(String),

    #[error("invalid JSON: {0}")]
    Json(String),

    #[error("invalid YAML: {0}")]
    Yaml(String),

    #[error("line {line}: expected `key=value`")]
    Properties { line: usize },

    #[error("line {line}: key `{key}` conflicts with an earlier entry")]
    PropertyConflict { line: usize, key: String },

    #[error("top level must be a mapping, found {0}")]
    NotAMapping(&'static str),
}

/// Encoding inferred from the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Json,
    Yaml,
    /// Bare `api.meta`: sniff JSON, then YAML mapping, then properties.
    Sniff,
}

impl Encoding {
    pub fn for_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        if name.ends_with(".json") {
            Encoding::Json
        } else if name.ends_with(".yaml") || name.ends_with(".yml") {
            Encoding::Yaml
        } else {
            Encoding::Sniff
        }
    }
}

pub fn parse_file(path: &Path) -> Result<MetadataDocument, ParseError> {
    let content = fs::read_to_string(path).map_err(|e| ParseError::Read(e.to_string()))?;
    parse_str(&content, Encoding::for_path(path))
}

pub fn parse_str(content: &str, encoding: Encoding) -> Result<MetadataDocument, ParseError> {
    match encoding {
        Encoding::Json => parse_json(content),
        Encoding::Yaml => parse_yaml(content),
        Encoding::Sniff => sniff(content),
    }
}

fn sniff(content: &str) -> Result<MetadataDocument, ParseError> {
    if content.trim_start().starts_with('{') {
        return parse_json(content);
    }
    match parse_yaml(content) {
        Ok(doc) => Ok(doc),
        Err(_) => parse_properties(content),
    }
}

fn parse_json(content: &str) -> Result<MetadataDocument, ParseError> {
    let value: Value =
        serde_json::from_str(content).map_err(|e| ParseError::Json(e.to_string()))?;
    into_document(value)
}

fn parse_yaml(content: &str) -> Result<MetadataDocument, ParseError> {
    let value: Value =
        serde_yaml::from_str(content).map_err(|e| ParseError::Yaml(e.to_string()))?;
    into_document(value)
}

fn into_document(value: Value) -> Result<MetadataDocument, ParseError> {
    match value {
        Value::Object(map) => Ok(MetadataDocument::new(map)),
        Value::Null => Err(ParseError::NotAMapping("nothing")),
        Value::Bool(_) => Err(ParseError::NotAMapping("a boolean")),
        Value::Number(_) => Err(ParseError::NotAMapping("a number")),
        Value::String(_) => Err(ParseError::NotAMapping("a string")),
        Value::Array(_) => Err(ParseError::NotAMapping("a list")),
    }
}

/// Flat `key=value` lines; dotted keys build nested sections.
///
/// Blank lines and lines starting with `#` or `!` are skipped. `true` and
/// `false` become booleans, everything else stays a string.
fn parse_properties(content: &str) -> Result<MetadataDocument, ParseError> {
    let mut root = Map::new();
    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        let (key, value) = line
            .split_once('=')
            .ok_or(ParseError::Properties { line: idx + 1 })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(ParseError::Properties { line: idx + 1 });
        }
        let value = match value.trim() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            other => Value::String(other.to_string()),
        };
        if !insert_dotted(&mut root, key, value) {
            return Err(ParseError::PropertyConflict {
                line: idx + 1,
                key: key.to_string(),
            });
        }
    }
    Ok(MetadataDocument::new(root))
}

fn insert_dotted(root: &mut Map<String, Value>, key: &str, value: Value) -> bool {
    let mut segments: Vec<&str> = key.split('.').collect();
    let Some(leaf) = segments.pop() else {
        return false;
    };
    let mut current = root;
    for segment in segments {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        match entry {
            Value::Object(map) => current = map,
            _ => return false,
        }
    }
    if matches!(current.get(leaf), Some(Value::Object(_))) {
        return false;
    }
    current.insert(leaf.to_string(), value);
    true
}
