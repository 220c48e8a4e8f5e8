//! Configuration types for the Arbor console.
//!
//! Configuration is loaded from a single YAML file (`arbor.yaml`). Every field
//! has a default, so an empty file yields the stock console behaviour.
//!
//! ```yaml
//! primary_schema: druid
//! lookup_schema: lookup
//! default_schema: druid
//! default_tables: [wikipedia]
//! default_where: "__time >= CURRENT_TIMESTAMP - INTERVAL '1' DAY"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Console configuration shared by the tree and the query crates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Schema holding the data store's own datasources. Its tables are
    /// referenced without a schema prefix and receive `default_where`.
    #[serde(default = "default_primary_schema")]
    pub primary_schema: String,

    /// Schema holding joinable lookup tables.
    #[serde(default = "default_lookup_schema")]
    pub lookup_schema: String,

    /// Schema selected when the tree is (re)built.
    #[serde(default)]
    pub default_schema: Option<String>,

    /// Tables expanded when the tree is first shown.
    #[serde(default)]
    pub default_tables: Vec<String>,

    /// Table rendered with a highlight marker.
    #[serde(default)]
    pub highlight_table: Option<String>,

    /// Filter expression applied to fresh queries on primary-schema tables.
    #[serde(default)]
    pub default_where: Option<String>,

    /// ISO-8601 period used to bucket timestamp columns.
    #[serde(default = "default_time_bucket")]
    pub time_bucket: String,

    /// Search input is truncated to this many characters.
    #[serde(default = "default_max_search_length")]
    pub max_search_length: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            primary_schema: default_primary_schema(),
            lookup_schema: default_lookup_schema(),
            default_schema: None,
            default_tables: Vec::new(),
            highlight_table: None,
            default_where: None,
            time_bucket: default_time_bucket(),
            max_search_length: default_max_search_length(),
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // serde_yaml rejects an empty document, treat it as all defaults.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.primary_schema.is_empty() {
            return Err(ConfigError::Config("primary_schema must not be empty".into()));
        }
        if self.max_search_length == 0 {
            return Err(ConfigError::Config(
                "max_search_length must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn is_primary_schema(&self, schema: &str) -> bool {
        self.primary_schema == schema
    }
}

/// Error type for configuration and metadata loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

fn default_primary_schema() -> String {
    "druid".to_string()
}

fn default_lookup_schema() -> String {
    "lookup".to_string()
}

fn default_time_bucket() -> String {
    "PT1H".to_string()
}

fn default_max_search_length() -> usize {
    100
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ConsoleConfig::default();
        assert_eq!(config.primary_schema, "druid");
        assert_eq!(config.lookup_schema, "lookup");
        assert_eq!(config.time_bucket, "PT1H");
        assert_eq!(config.max_search_length, 100);
        assert!(config.default_tables.is_empty());
        assert!(config.default_where.is_none());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(ConsoleConfig::from_yaml("").unwrap(), ConsoleConfig::default());
    }

    #[test]
    fn test_partial_yaml() {
        let config = ConsoleConfig::from_yaml(
            "default_schema: druid\ndefault_tables: [wikipedia, koalas]\n",
        )
        .unwrap();
        assert_eq!(config.default_schema.as_deref(), Some("druid"));
        assert_eq!(config.default_tables, vec!["wikipedia", "koalas"]);
        assert_eq!(config.primary_schema, "druid");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = ConsoleConfig::from_yaml("max_search_length: 0\n");
        assert!(matches!(result, Err(ConfigError::Config(_))));

        let result = ConsoleConfig::from_yaml("primary_schema: [oops]\n");
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "lookup_schema: lkp").unwrap();
        writeln!(file, "default_where: \"country = 'NZ'\"").unwrap();

        let config = ConsoleConfig::from_file(file.path()).unwrap();
        assert_eq!(config.lookup_schema, "lkp");
        assert_eq!(config.default_where.as_deref(), Some("country = 'NZ'"));
    }
}
