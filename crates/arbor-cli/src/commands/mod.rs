//! CLI command implementations.

pub mod explain;
pub mod query;
pub mod tree;

use anyhow::{Context, Result};
use std::path::Path;

use arbor_core::{ColumnMetadataRow, ConsoleConfig, load_metadata};
use arbor_query::{ColumnContext, SqlQuery, TableContext};

/// Metadata rows plus the console configuration they are browsed with.
pub struct Session {
    pub rows: Vec<ColumnMetadataRow>,
    pub config: ConsoleConfig,
}

impl Session {
    pub fn load(metadata: &Path, config: Option<&Path>) -> Result<Self> {
        let config = match config {
            Some(path) => ConsoleConfig::from_file(path)
                .with_context(|| format!("Failed to load configuration from {:?}", path))?,
            None => ConsoleConfig::default(),
        };
        let rows = load_metadata(metadata)
            .with_context(|| format!("Failed to load metadata from {:?}", metadata))?;

        tracing::debug!(rows = rows.len(), path = %metadata.display(), "Loaded metadata");
        Ok(Self { rows, config })
    }

    /// Resolve `schema.table`, or a bare table name (primary schema first).
    pub fn table(&self, reference: &str) -> Result<TableContext> {
        let exists = |schema: &str, table: &str| {
            self.rows
                .iter()
                .any(|r| r.schema == schema && r.table == table)
        };

        if let Some((schema, table)) = reference.split_once('.')
            && exists(schema, table)
        {
            return Ok(TableContext::from_rows(&self.rows, schema, table));
        }

        let schema = self
            .rows
            .iter()
            .filter(|r| r.table == reference)
            .map(|r| r.schema.as_str())
            .min_by_key(|schema| !self.config.is_primary_schema(schema))
            .with_context(|| format!("Table not found: {reference}"))?;

        Ok(TableContext::from_rows(&self.rows, schema, reference))
    }

    pub fn column(&self, table: &str, column: &str) -> Result<ColumnContext> {
        let ctx = self.table(table)?;
        let row = self
            .rows
            .iter()
            .find(|r| r.schema == ctx.schema && r.table == ctx.table && r.column == column)
            .with_context(|| format!("Column not found: {column} in {}.{}", ctx.schema, ctx.table))?;

        Ok(ColumnContext::new(ctx, column, row.kind.clone()))
    }
}

/// Parse the `--query` argument, if given.
pub fn parse_query(sql: Option<&str>) -> Result<Option<SqlQuery>> {
    sql.map(|s| SqlQuery::parse(s).context("Failed to parse --query"))
        .transpose()
}
