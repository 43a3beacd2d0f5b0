//! Named parameter sources.
//!
//! A [`ParamSource`] answers "what is the raw value of parameter `name`?".
//! Sources are combined with [`Layered`], where the first source that knows a
//! parameter wins.

use std::collections::HashMap;
use std::path::Path;

use crate::{ConfigError, Result};

/// A lookup of raw, unparsed parameter values by name.
pub trait ParamSource: Send + Sync {
    /// Return the raw value for `name`, or `None` if this source has no opinion.
    fn param(&self, name: &str) -> Option<String>;
}

/// Reads parameters from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl ParamSource for EnvSource {
    fn param(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// In-memory parameters, mostly useful for hosts that already parsed their
/// own configuration and for tests.
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    params: HashMap<String, String>,
}

impl MapSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapSource {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl ParamSource for MapSource {
    fn param(&self, name: &str) -> Option<String> {
        self.params.get(name).cloned()
    }
}

/// Top-level keys of a TOML document.
///
/// String values are taken verbatim; any other scalar is rendered in its TOML
/// form (so `MAX = 12` reads as `"12"`). Nested tables are ignored.
#[derive(Debug, Clone, Default)]
pub struct TomlSource {
    params: HashMap<String, String>,
}

impl TomlSource {
    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        let table: toml::Table = content.parse()?;
        let params = table
            .into_iter()
            .filter_map(|(key, value)| {
                let raw = match value {
                    toml::Value::String(s) => s,
                    toml::Value::Table(_) => return None,
                    other => other.to_string(),
                };
                Some((key, raw))
            })
            .collect();
        Ok(Self { params })
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }
}

impl ParamSource for TomlSource {
    fn param(&self, name: &str) -> Option<String> {
        self.params.get(name).cloned()
    }
}

/// Ordered chain of sources; the first one that knows a parameter wins.
#[derive(Default)]
pub struct Layered {
    sources: Vec<Box<dyn ParamSource>>,
}

impl Layered {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a lower-precedence source.
    pub fn then(mut self, source: impl ParamSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Number of chained sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Check if no sources are chained.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl ParamSource for Layered {
    fn param(&self, name: &str) -> Option<String> {
        self.sources.iter().find_map(|source| source.param(name))
    }
}

impl std::fmt::Debug for Layered {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layered")
            .field("sources", &self.sources.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_source() {
        let source = MapSource::new().with("A", "1");
        assert_eq!(source.param("A").as_deref(), Some("1"));
        assert_eq!(source.param("B"), None);
    }

    #[test]
    fn test_map_source_from_iter() {
        let source: MapSource = [("A", "1"), ("B", "2")].into_iter().collect();
        assert_eq!(source.param("B").as_deref(), Some("2"));
    }

    #[test]
    fn test_env_source_missing_variable() {
        assert_eq!(EnvSource.param("VIEWSTASH_TEST_SURELY_UNSET_7F3A"), None);
    }

    #[test]
    fn test_toml_source_scalars() {
        let toml = r#"
VIEWSTASH_MAX_ACTIVE_SCOPES = 12
VIEWSTASH_LOGICAL_VIEWS = "15"
FLAG = true

[nested]
IGNORED = 1
"#;
        let source = TomlSource::from_toml(toml).unwrap();
        assert_eq!(source.param("VIEWSTASH_MAX_ACTIVE_SCOPES").as_deref(), Some("12"));
        assert_eq!(source.param("VIEWSTASH_LOGICAL_VIEWS").as_deref(), Some("15"));
        assert_eq!(source.param("FLAG").as_deref(), Some("true"));
        assert_eq!(source.param("nested"), None);
        assert_eq!(source.param("IGNORED"), None);
    }

    #[test]
    fn test_toml_source_parse_error() {
        let result = TomlSource::from_toml("not = [valid");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_toml_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = TomlSource::load(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }

    #[test]
    fn test_toml_source_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewstash.toml");
        std::fs::write(&path, "VIEWSTASH_VIEWS_IN_SESSION = 4\n").unwrap();

        let source = TomlSource::load(&path).unwrap();
        assert_eq!(source.param("VIEWSTASH_VIEWS_IN_SESSION").as_deref(), Some("4"));
    }

    #[test]
    fn test_layered_first_hit_wins() {
        let layered = Layered::new()
            .then(MapSource::new().with("A", "first"))
            .then(MapSource::new().with("A", "second").with("B", "only-second"));

        assert_eq!(layered.len(), 2);
        assert_eq!(layered.param("A").as_deref(), Some("first"));
        assert_eq!(layered.param("B").as_deref(), Some("only-second"));
        assert_eq!(layered.param("C"), None);
    }
}
