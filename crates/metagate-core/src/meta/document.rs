use serde_json::{Map, Value};

/// Parsed content of one metadata file.
///
/// The tree is kept as a JSON value regardless of the source encoding so
/// that rule evaluation sees one shape for JSON, YAML and properties files.
/// The top level is always a mapping.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetadataDocument {
    root: Map<String, Value>,
}

impl MetadataDocument {
    pub fn new(root: Map<String, Value>) -> Self {
        Self { root }
    }

    /// Look up a dotted path such as `API.version.status`.
    ///
    /// Explicit `null` values are reported as missing, same as an absent key.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.root.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        if current.is_null() { None } else { Some(current) }
    }

    /// Resolve a logical field readable from several concrete paths.
    ///
    /// The first present path wins, even if its value later fails a check.
    pub fn resolve<'a>(&self, paths: &[&'a str]) -> Option<(&'a str, &Value)> {
        paths
            .iter()
            .find_map(|path| self.get(path).map(|value| (*path, value)))
    }
}

impl From<Map<String, Value>> for MetadataDocument {
    fn from(root: Map<String, Value>) -> Self {
        Self::new(root)
    }
}
