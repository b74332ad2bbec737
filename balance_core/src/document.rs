use crate::profile::Domain;
use crate::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// A balance document: partial profiles keyed by version
///
/// ```json
/// { "version": "v2", "profiles": { "v1": {}, "v2": { "damageMultiplier": 1.1 } } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceDocument {
    /// Latest version the document was authored for; informational only
    pub version: String,
    pub profiles: Map<String, Value>,
}

/// Outcome of looking up a version in a document
#[derive(Debug, PartialEq)]
pub(crate) enum ProfileChoice<'a> {
    Exact(&'a Value),
    /// Requested version absent, first key in sorted order used instead
    Fallback { key: &'a str, partial: &'a Value },
    Empty,
}

impl BalanceDocument {
    pub fn from_json_str(content: &str, origin: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::Json {
            error: e,
            origin: origin.to_string(),
        })
    }

    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Toml {
            error: e,
            origin: origin.to_string(),
        })
    }

    /// Read `<dir>/<stem>.json`, or `<dir>/<stem>.toml` when no JSON file exists
    pub fn load(dir: &Path, domain: Domain) -> Result<Self, ConfigError> {
        let json_path = dir.join(format!("{}.json", domain.file_stem()));
        let toml_path = dir.join(format!("{}.toml", domain.file_stem()));

        if !json_path.exists() && toml_path.exists() {
            let content = read_file(&toml_path)?;
            return Self::from_toml_str(&content, &toml_path.display().to_string());
        }

        let content = read_file(&json_path)?;
        Self::from_json_str(&content, &json_path.display().to_string())
    }

    /// The compiled-in document for a domain
    pub fn embedded(domain: Domain) -> Result<Self, ConfigError> {
        let content = match domain {
            Domain::Level => include_str!("../data/level_curve.json"),
            Domain::Equipment => include_str!("../data/equipment_curve.json"),
            Domain::Skill => include_str!("../data/skill_curve.json"),
            Domain::Pve => include_str!("../data/pve_curve.json"),
            Domain::Pvp => include_str!("../data/pvp_config.json"),
        };
        Self::from_json_str(content, &format!("embedded:{}", domain.file_stem()))
    }

    pub(crate) fn choose(&self, version: &str) -> ProfileChoice<'_> {
        if let Some(partial) = self.profiles.get(version) {
            return ProfileChoice::Exact(partial);
        }

        match self.profiles.iter().min_by(|a, b| a.0.cmp(b.0)) {
            Some((key, partial)) => ProfileChoice::Fallback {
                key: key.as_str(),
                partial,
            },
            None => ProfileChoice::Empty,
        }
    }
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        error: e,
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_embedded_documents_parse() {
        for domain in Domain::all() {
            let doc = BalanceDocument::embedded(*domain).unwrap();
            assert!(doc.profiles.contains_key("v1"), "{domain}");
            assert!(doc.profiles.contains_key("v2"), "{domain}");
        }
    }

    #[test]
    fn test_choose_exact_and_fallback() {
        let doc = BalanceDocument::from_json_str(
            r#"{"version": "v3", "profiles": {"v3": {"a": 1}, "v2": {"b": 2}}}"#,
            "test",
        )
        .unwrap();

        assert_eq!(doc.choose("v3"), ProfileChoice::Exact(&json!({"a": 1})));
        assert_eq!(
            doc.choose("v9"),
            ProfileChoice::Fallback {
                key: "v2",
                partial: &json!({"b": 2})
            }
        );
    }

    #[test]
    fn test_choose_empty() {
        let doc = BalanceDocument::from_json_str(r#"{"version": "v1"}"#, "test").unwrap();
        assert_eq!(doc.choose("v1"), ProfileChoice::Empty);
    }

    #[test]
    fn test_load_prefers_json_then_toml() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "pvp_config.toml",
            r#"
version = "v1"

[profiles.v1]
roundLimit = 12
"#,
        );

        let doc = BalanceDocument::load(dir.path(), Domain::Pvp).unwrap();
        assert_eq!(doc.profiles["v1"], json!({"roundLimit": 12}));

        write_file(
            dir.path(),
            "pvp_config.json",
            r#"{"version": "v1", "profiles": {"v1": {"roundLimit": 15}}}"#,
        );
        let doc = BalanceDocument::load(dir.path(), Domain::Pvp).unwrap();
        assert_eq!(doc.profiles["v1"], json!({"roundLimit": 15}));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = BalanceDocument::load(dir.path(), Domain::Skill);
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_load_bad_json() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "skill_curve.json", "{ not json");
        let result = BalanceDocument::load(dir.path(), Domain::Skill);
        assert!(matches!(result, Err(ConfigError::Json { .. })));
    }
}
