//! # arbor-core
//!
//! Shared types for the Arbor column browser:
//! - [`ColumnMetadataRow`]: one catalog row as reported by `INFORMATION_SCHEMA.COLUMNS`
//! - [`ColumnKind`]: the declared SQL type resolved once into a closed set of kinds
//! - [`SearchMode`]: which part of the catalog a search string is matched against
//! - [`config`]: console configuration loaded from YAML

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

pub mod config;

pub use config::{ConfigError, ConsoleConfig};

/// Name of the timestamp column every datasource carries.
pub const TIME_COLUMN: &str = "__time";

/// The kind of a column, resolved from its declared SQL type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum ColumnKind {
    /// `TIMESTAMP`
    Timestamp,
    /// Integral and floating point types.
    Number,
    /// `VARCHAR` and friends.
    String,
    /// `COMPLEX<name>`; holds the name between the angle brackets.
    Complex(String),
    /// Anything else (arrays, booleans, unknown types); holds the raw type.
    Other(String),
}

impl ColumnKind {
    /// Resolve a declared type such as `VARCHAR` or `COMPLEX<hyperUnique>`.
    pub fn from_data_type(data_type: &str) -> Self {
        const COMPLEX: &str = "COMPLEX<";
        let trimmed = data_type.trim();

        if trimmed
            .get(..COMPLEX.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(COMPLEX))
            && let Some(inner) = trimmed[COMPLEX.len()..].strip_suffix('>')
        {
            return ColumnKind::Complex(inner.to_string());
        }

        match trimmed.to_ascii_uppercase().as_str() {
            "TIMESTAMP" => ColumnKind::Timestamp,
            "BIGINT" | "INTEGER" | "SMALLINT" | "TINYINT" | "FLOAT" | "DOUBLE" | "REAL"
            | "DECIMAL" => ColumnKind::Number,
            "VARCHAR" | "CHAR" => ColumnKind::String,
            _ => ColumnKind::Other(trimmed.to_string()),
        }
    }

    pub fn is_timestamp(&self) -> bool {
        matches!(self, ColumnKind::Timestamp)
    }
}

/// A single `(schema, table, column, type)` tuple from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawColumnMetadataRow", into = "RawColumnMetadataRow")]
pub struct ColumnMetadataRow {
    pub schema: String,
    pub table: String,
    pub column: String,
    pub data_type: String,
    /// Resolved from `data_type` when the row is created.
    pub kind: ColumnKind,
}

impl ColumnMetadataRow {
    pub fn new(
        schema: impl Into<String>,
        table: impl Into<String>,
        column: impl Into<String>,
        data_type: impl Into<String>,
    ) -> Self {
        let data_type = data_type.into();
        Self {
            schema: schema.into(),
            table: table.into(),
            column: column.into(),
            kind: ColumnKind::from_data_type(&data_type),
            data_type,
        }
    }
}

/// Wire shape of a catalog row. Accepts both the upper-case
/// `INFORMATION_SCHEMA` column names and plain lower-case names.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawColumnMetadataRow {
    #[serde(rename = "TABLE_SCHEMA", alias = "schema")]
    schema: String,
    #[serde(rename = "TABLE_NAME", alias = "table")]
    table: String,
    #[serde(rename = "COLUMN_NAME", alias = "column")]
    column: String,
    #[serde(rename = "DATA_TYPE", alias = "data_type", alias = "type")]
    data_type: String,
}

impl From<RawColumnMetadataRow> for ColumnMetadataRow {
    fn from(raw: RawColumnMetadataRow) -> Self {
        ColumnMetadataRow::new(raw.schema, raw.table, raw.column, raw.data_type)
    }
}

impl From<ColumnMetadataRow> for RawColumnMetadataRow {
    fn from(row: ColumnMetadataRow) -> Self {
        Self {
            schema: row.schema,
            table: row.table,
            column: row.column,
            data_type: row.data_type,
        }
    }
}

/// Parse catalog rows from a JSON array.
pub fn metadata_from_json(content: &str) -> Result<Vec<ColumnMetadataRow>, ConfigError> {
    serde_json::from_str(content).map_err(ConfigError::from)
}

/// Load catalog rows from a JSON file.
pub fn load_metadata(path: impl AsRef<Path>) -> Result<Vec<ColumnMetadataRow>, ConfigError> {
    let content = fs::read_to_string(path.as_ref())?;
    metadata_from_json(&content)
}

/// Which names a search string is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchMode {
    #[default]
    TablesAndColumns,
    TablesOnly,
    ColumnsOnly,
}

impl SearchMode {
    pub const ALL: [SearchMode; 3] = [
        SearchMode::TablesAndColumns,
        SearchMode::TablesOnly,
        SearchMode::ColumnsOnly,
    ];

    /// Human readable title for the search settings menu.
    pub fn title(&self) -> &'static str {
        match self {
            SearchMode::TablesAndColumns => "Tables and columns",
            SearchMode::TablesOnly => "Tables only",
            SearchMode::ColumnsOnly => "Columns only",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::TablesAndColumns => "tables-and-columns",
            SearchMode::TablesOnly => "tables-only",
            SearchMode::ColumnsOnly => "columns-only",
        }
    }

    /// Whether a row survives the filter. `lower_search` must already be lowercased.
    pub fn matches(&self, table: &str, column: &str, lower_search: &str) -> bool {
        let table_hit = || table.to_lowercase().contains(lower_search);
        let column_hit = || column.to_lowercase().contains(lower_search);
        match self {
            SearchMode::TablesAndColumns => table_hit() || column_hit(),
            SearchMode::TablesOnly => table_hit(),
            SearchMode::ColumnsOnly => column_hit(),
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| ConfigError::Config(format!("unknown search mode: {s}")))
    }
}
