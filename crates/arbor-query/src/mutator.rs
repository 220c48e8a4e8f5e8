//! Derive new queries from a click on a schema, table or column.
//!
//! Every transform takes the current query (if any) by reference and returns
//! a fresh [`QueryChange`]. Nothing is executed here; `run` only tells the
//! host whether to execute the new query right away or stage it for editing.

use arbor_core::{ColumnKind, ColumnMetadataRow, ConsoleConfig, TIME_COLUMN};
use sqlparser::ast::{BinaryOperator, Expr, Join, JoinConstraint, JoinOperator};

use crate::error::QueryError;
use crate::query::{
    SelectTemplate, SqlQuery, SqlTable, parse_expression, parse_join, parse_relation,
    parse_select_item, quote_ident,
};

/// Select item injected when there is no aggregate to carry over.
pub const COUNT_STAR: &str = r#"COUNT(*) AS "Count""#;

/// Lookup-side join column used when the current join says nothing better.
pub const FALLBACK_LOOKUP_COLUMN: &str = "k";

/// Main-table join column used when the current join says nothing better.
pub const FALLBACK_ORIGINAL_COLUMN: &str = "XXX";

/// Result of a transform: the new query and whether to run it immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryChange {
    pub query: SqlQuery,
    pub run: bool,
}

/// The table a menu was opened on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableContext {
    pub schema: String,
    pub table: String,
    /// Column names of the table, in catalog order.
    pub columns: Vec<String>,
}

impl TableContext {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
            columns: Vec::new(),
        }
    }

    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Context for `schema.table`, with its columns taken from the catalog.
    pub fn from_rows(rows: &[ColumnMetadataRow], schema: &str, table: &str) -> Self {
        Self::new(schema, table).with_columns(
            rows.iter()
                .filter(|r| r.schema == schema && r.table == table)
                .map(|r| r.column.clone()),
        )
    }
}

/// The column a menu was opened on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnContext {
    pub table: TableContext,
    pub column: String,
    pub kind: ColumnKind,
}

impl ColumnContext {
    pub fn new(table: TableContext, column: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            table,
            column: column.into(),
            kind,
        }
    }

    /// Context for one catalog row, with its sibling columns.
    pub fn from_row(rows: &[ColumnMetadataRow], row: &ColumnMetadataRow) -> Self {
        Self::new(
            TableContext::from_rows(rows, &row.schema, &row.table),
            row.column.clone(),
            row.kind.clone(),
        )
    }
}

/// Join flavour offered for lookup tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Left,
    Inner,
}

impl JoinKind {
    fn keyword(&self) -> &'static str {
        match self {
            JoinKind::Left => "LEFT",
            JoinKind::Inner => "INNER",
        }
    }
}

/// Columns on either side of a lookup join condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinColumns {
    pub lookup_column: String,
    pub original_column: String,
}

/// Derives queries from clicks in the column tree.
#[derive(Debug, Clone)]
pub struct QueryMutator {
    primary_schema: String,
    lookup_schema: String,
    time_bucket: String,
    default_where: Option<Expr>,
}

impl Default for QueryMutator {
    fn default() -> Self {
        Self {
            primary_schema: "druid".to_string(),
            lookup_schema: "lookup".to_string(),
            time_bucket: "PT1H".to_string(),
            default_where: None,
        }
    }
}

impl QueryMutator {
    /// Create a mutator from the console configuration, parsing its default filter.
    pub fn new(config: &ConsoleConfig) -> Result<Self, QueryError> {
        let default_where = config
            .default_where
            .as_deref()
            .map(parse_expression)
            .transpose()?;

        Ok(Self {
            primary_schema: config.primary_schema.clone(),
            lookup_schema: config.lookup_schema.clone(),
            time_bucket: config.time_bucket.clone(),
            default_where,
        })
    }

    pub fn with_default_where(mut self, default_where: Option<Expr>) -> Self {
        self.default_where = default_where;
        self
    }

    pub fn is_primary_schema(&self, schema: &str) -> bool {
        self.primary_schema == schema
    }

    pub fn is_lookup_schema(&self, schema: &str) -> bool {
        self.lookup_schema == schema
    }

    /// Reference to a table; tables of the primary schema stay unqualified.
    pub fn table_reference(&self, ctx: &TableContext) -> SqlTable {
        let schema = (!self.is_primary_schema(&ctx.schema)).then(|| ctx.schema.clone());
        SqlTable::new(ctx.table.clone(), schema)
    }

    /// Filter for a fresh query on `ctx`: the current filter when the current
    /// query is on the same table, otherwise the default filter for primary
    /// tables unless `all_time` is asked for.
    pub(crate) fn applicable_where(
        &self,
        ctx: &TableContext,
        current: Option<&SqlQuery>,
        all_time: bool,
    ) -> Option<Expr> {
        if let Some(query) = current.filter(|q| q.targets(&ctx.table)) {
            return query.where_expression().cloned();
        }
        if self.is_primary_schema(&ctx.schema) && !all_time {
            return self.default_where.clone();
        }
        None
    }

    /// `SELECT <col>, <aggregates> FROM <table> GROUP BY 1 ORDER BY 2 DESC`,
    /// or an hourly time histogram for primary-schema timestamp columns.
    pub fn show_column(
        &self,
        ctx: &ColumnContext,
        current: Option<&SqlQuery>,
    ) -> Result<QueryChange, QueryError> {
        let table = &ctx.table;
        let primary = self.is_primary_schema(&table.schema);

        let (from, selection, mut aggregates) = match current.filter(|q| q.targets(&table.table)) {
            Some(query) => (
                query
                    .first_from_relation()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| self.table_reference(table).to_string()),
                query.where_expression().cloned(),
                query
                    .aggregate_select_items()
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>(),
            ),
            None if primary => (
                SqlTable::bare(table.table.clone()).to_string(),
                self.default_where.clone(),
                Vec::new(),
            ),
            None => (self.table_reference(table).to_string(), None, Vec::new()),
        };

        if aggregates.is_empty() {
            aggregates.push(count_expression(&table.columns));
        }

        let column = quote_ident(&ctx.column);
        let template = if primary && ctx.kind.is_timestamp() {
            let bucket = format!(
                r#"TIME_FLOOR({column}, '{}') AS "Time""#,
                self.time_bucket.replace('\'', "''")
            );
            SelectTemplate::new(from)
                .items(std::iter::once(bucket).chain(aggregates).collect())
                .group_by(&["1"])
                .order_by(&["1 ASC"])
        } else {
            SelectTemplate::new(from)
                .items(std::iter::once(column).chain(aggregates).collect())
                .group_by(&["1"])
                .order_by(&["2 DESC"])
        };

        let query = template.selection(selection.as_ref()).parse()?;
        Ok(changed("show_column", &table.table, query, true))
    }

    /// `SELECT <every column> FROM <table>`.
    pub fn select_columns(
        &self,
        ctx: &TableContext,
        current: Option<&SqlQuery>,
    ) -> Result<QueryChange, QueryError> {
        let items = ctx.columns.iter().map(|c| quote_ident(c)).collect();
        let query = SelectTemplate::new(self.table_reference(ctx).to_string())
            .items(items)
            .selection(self.applicable_where(ctx, current, false).as_ref())
            .parse()?;
        Ok(changed("select_columns", &ctx.table, query, true))
    }

    /// `SELECT * FROM <table>`.
    pub fn select_star(
        &self,
        ctx: &TableContext,
        current: Option<&SqlQuery>,
    ) -> Result<QueryChange, QueryError> {
        let query = SqlQuery::select_star_from(&self.table_reference(ctx))?
            .change_where(self.applicable_where(ctx, current, false));
        Ok(changed("select_star", &ctx.table, query, true))
    }

    /// `SELECT COUNT(*) AS "Count" FROM <table>` over all time.
    pub fn count(
        &self,
        ctx: &TableContext,
        current: Option<&SqlQuery>,
    ) -> Result<QueryChange, QueryError> {
        let query = SqlQuery::select_star_from(&self.table_reference(ctx))?
            .change_select(0, parse_select_item(&count_expression(&ctx.columns))?)
            .clear_group_by()
            .change_where(self.applicable_where(ctx, current, true));
        Ok(changed("count", &ctx.table, query, true))
    }

    /// `SELECT MIN(__time), MAX(__time) FROM <table>` over all time.
    pub fn min_max_time(
        &self,
        ctx: &TableContext,
        current: Option<&SqlQuery>,
    ) -> Result<QueryChange, QueryError> {
        let query = SqlQuery::select_star_from(&self.table_reference(ctx))?
            .change_select_items(vec![
                parse_select_item(&format!("MIN({TIME_COLUMN}) AS min_time"))?,
                parse_select_item(&format!("MAX({TIME_COLUMN}) AS max_time"))?,
            ])
            .clear_group_by()
            .change_where(self.applicable_where(ctx, current, true))
            .remove_column_from_where(TIME_COLUMN);
        Ok(changed("min_max_time", &ctx.table, query, true))
    }

    /// Point the current query at the bare name of `ctx` instead of its
    /// current table.
    pub fn replace_from(
        &self,
        ctx: &TableContext,
        current: Option<&SqlQuery>,
    ) -> Result<QueryChange, QueryError> {
        let query = current.ok_or(QueryError::MissingQuery {
            action: "Replace FROM",
        })?;
        let relation = parse_relation(&SqlTable::bare(ctx.table.clone()).to_string())?;
        Ok(changed(
            "replace_from",
            &ctx.table,
            query.clone().change_from(relation),
            true,
        ))
    }

    /// Join the lookup table `ctx` onto the current query. A left join
    /// replaces any existing join, an inner join is added next to them.
    pub fn join(
        &self,
        ctx: &TableContext,
        current: Option<&SqlQuery>,
        kind: JoinKind,
    ) -> Result<QueryChange, QueryError> {
        let query = current.ok_or(QueryError::MissingQuery { action: "Join" })?;
        let JoinColumns {
            lookup_column,
            original_column,
        } = self.join_columns(query);

        let lookup_side = format!(
            "{}.{}.{}",
            quote_ident(&self.lookup_schema),
            quote_ident(&ctx.table),
            quote_ident(&lookup_column)
        );
        let original_side = match query.first_table_name() {
            Some(table) => format!("{}.{}", quote_ident(&table), quote_ident(&original_column)),
            None => quote_ident(&original_column),
        };

        let join = parse_join(
            kind.keyword(),
            &self.table_reference(ctx).to_string(),
            &format!("{lookup_side} = {original_side}"),
        )?;

        let query = match kind {
            JoinKind::Left => query.clone().remove_all_joins(),
            JoinKind::Inner => query.clone(),
        };
        Ok(changed("join", &ctx.table, query.add_join(join), false))
    }

    /// Drop every join from the current query.
    pub fn remove_join(&self, current: Option<&SqlQuery>) -> Result<QueryChange, QueryError> {
        let action = "Remove join";
        let query = current.ok_or(QueryError::MissingQuery { action })?;
        if !query.has_join() {
            return Err(QueryError::MissingJoin { action });
        }
        let table = query.first_table_name().unwrap_or_default();
        Ok(changed(
            "remove_join",
            &table,
            query.clone().remove_all_joins(),
            false,
        ))
    }

    /// Append `COUNT(*) AS "Count"` to the current query.
    pub fn add_count_aggregate(
        &self,
        current: Option<&SqlQuery>,
    ) -> Result<QueryChange, QueryError> {
        let query = current.ok_or(QueryError::MissingQuery {
            action: "Aggregate COUNT(*)",
        })?;
        let table = query.first_table_name().unwrap_or_default();
        Ok(changed(
            "add_count_aggregate",
            &table,
            query.clone().add_select(parse_select_item(COUNT_STAR)?),
            true,
        ))
    }

    /// Join key columns taken from the first join's `=` condition, falling
    /// back to [`FALLBACK_LOOKUP_COLUMN`] / [`FALLBACK_ORIGINAL_COLUMN`].
    pub fn join_columns(&self, query: &SqlQuery) -> JoinColumns {
        let mut lookup_column = None;
        let mut original_column = None;

        if let Some(Expr::BinaryOp {
            left,
            op: BinaryOperator::Eq,
            right,
        }) = query.joins().first().and_then(join_condition)
        {
            if let Expr::CompoundIdentifier(parts) = left.as_ref()
                && parts.len() >= 3
                && parts[0].value == self.lookup_schema
            {
                lookup_column = parts.last().map(|p| p.value.clone());
            }
            original_column = match right.as_ref() {
                Expr::Identifier(ident) => Some(ident.value.clone()),
                Expr::CompoundIdentifier(parts) => parts.last().map(|p| p.value.clone()),
                _ => None,
            };
        }

        JoinColumns {
            lookup_column: lookup_column.unwrap_or_else(|| FALLBACK_LOOKUP_COLUMN.to_string()),
            original_column: original_column
                .unwrap_or_else(|| FALLBACK_ORIGINAL_COLUMN.to_string()),
        }
    }
}

/// `SUM(count) AS "Count"` when the table carries a pre-aggregated count
/// column, `COUNT(*) AS "Count"` otherwise.
pub fn count_expression(columns: &[String]) -> String {
    columns
        .iter()
        .find(|c| *c == "count" || *c == "__count")
        .map(|c| format!(r#"SUM({}) AS "Count""#, quote_ident(c)))
        .unwrap_or_else(|| COUNT_STAR.to_string())
}

fn join_condition(join: &Join) -> Option<&Expr> {
    let constraint = match &join.join_operator {
        JoinOperator::Inner(c) | JoinOperator::Left(c) | JoinOperator::LeftOuter(c) => c,
        _ => return None,
    };
    match constraint {
        JoinConstraint::On(expr) => Some(expr),
        _ => None,
    }
}

fn changed(action: &'static str, table: &str, query: SqlQuery, run: bool) -> QueryChange {
    tracing::debug!(action, table, run, sql = %query, "Derived query");
    QueryChange { query, run }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sqlparser::ast::SelectItem;

    fn sql(s: &str) -> String {
        SqlQuery::parse(s).unwrap().to_string()
    }

    fn wiki() -> TableContext {
        TableContext::new("druid", "wiki").with_columns(["__time", "page", "added"])
    }

    fn column(name: &str, data_type: &str) -> ColumnContext {
        ColumnContext::new(wiki(), name, ColumnKind::from_data_type(data_type))
    }

    fn mutator() -> QueryMutator {
        QueryMutator::default()
    }

    #[test]
    fn test_show_string_column_without_query() {
        let change = mutator().show_column(&column("page", "VARCHAR"), None).unwrap();
        assert!(change.run);
        assert_eq!(
            change.query.to_string(),
            sql(r#"SELECT page, COUNT(*) AS "Count" FROM wiki GROUP BY 1 ORDER BY 2 DESC"#)
        );
    }

    #[test]
    fn test_show_time_column() {
        let change = mutator().show_column(&column("__time", "TIMESTAMP"), None).unwrap();
        assert_eq!(
            change.query.to_string(),
            sql(
                r#"SELECT TIME_FLOOR(__time, 'PT1H') AS "Time", COUNT(*) AS "Count" FROM wiki GROUP BY 1 ORDER BY 1 ASC"#
            )
        );
    }

    #[test]
    fn test_show_time_column_outside_primary_schema_is_not_bucketed() {
        let ctx = ColumnContext::new(
            TableContext::new("sys", "tasks").with_columns(["created_time"]),
            "created_time",
            ColumnKind::Timestamp,
        );
        let change = mutator().show_column(&ctx, None).unwrap();
        assert_eq!(
            change.query.to_string(),
            sql(
                r#"SELECT created_time, COUNT(*) AS "Count" FROM sys.tasks GROUP BY 1 ORDER BY 2 DESC"#
            )
        );
    }

    #[test]
    fn test_show_column_carries_aggregates_and_filter() {
        let current = SqlQuery::parse(
            r#"SELECT channel, SUM(count) AS "Count" FROM wiki WHERE country = 'NZ' GROUP BY 1"#,
        )
        .unwrap();
        let change = mutator()
            .show_column(&column("page", "VARCHAR"), Some(&current))
            .unwrap();
        assert_eq!(
            change.query.to_string(),
            sql(
                r#"SELECT page, SUM(count) AS "Count" FROM wiki WHERE country = 'NZ' GROUP BY 1 ORDER BY 2 DESC"#
            )
        );
    }

    #[test]
    fn test_show_column_on_other_table_ignores_current_query() {
        let current =
            SqlQuery::parse(r#"SELECT SUM(x) AS s FROM koalas WHERE a = 1"#).unwrap();
        let change = mutator()
            .show_column(&column("page", "VARCHAR"), Some(&current))
            .unwrap();
        assert_eq!(
            change.query.to_string(),
            sql(r#"SELECT page, COUNT(*) AS "Count" FROM wiki GROUP BY 1 ORDER BY 2 DESC"#)
        );
    }

    #[test]
    fn test_show_column_quotes_keyword_columns() {
        let ctx = ColumnContext::new(
            TableContext::new("druid", "wiki").with_columns(["__time", "trim", "current_date"]),
            "trim",
            ColumnKind::String,
        );
        let change = mutator().show_column(&ctx, None).unwrap();
        assert_eq!(
            change.query.to_string(),
            sql(r#"SELECT "trim", COUNT(*) AS "Count" FROM wiki GROUP BY 1 ORDER BY 2 DESC"#)
        );

        let ctx = ColumnContext::new(ctx.table, "current_date", ColumnKind::String);
        let change = mutator().show_column(&ctx, None).unwrap();
        match &change.query.select_items()[0] {
            SelectItem::UnnamedExpr(Expr::Identifier(ident)) => {
                assert_eq!(ident.value, "current_date");
            }
            other => panic!("expected a column reference, got {other:?}"),
        }
    }

    #[test]
    fn test_show_column_uses_count_column() {
        let ctx = ColumnContext::new(
            TableContext::new("druid", "rollup").with_columns(["__time", "page", "count"]),
            "page",
            ColumnKind::String,
        );
        let change = mutator().show_column(&ctx, None).unwrap();
        assert_eq!(
            change.query.to_string(),
            sql(r#"SELECT page, SUM("count") AS "Count" FROM "rollup" GROUP BY 1 ORDER BY 2 DESC"#)
        );
    }

    #[test]
    fn test_default_where_only_for_primary_schema() {
        let mutator = mutator()
            .with_default_where(Some(parse_expression("__time >= CURRENT_TIMESTAMP - INTERVAL '1' DAY").unwrap()));

        let change = mutator.select_star(&wiki(), None).unwrap();
        assert_eq!(
            change.query.to_string(),
            sql("SELECT * FROM wiki WHERE __time >= CURRENT_TIMESTAMP - INTERVAL '1' DAY")
        );

        let lookup = TableContext::new("lookup", "countries").with_columns(["k", "v"]);
        let change = mutator.select_star(&lookup, None).unwrap();
        assert_eq!(change.query.to_string(), sql("SELECT * FROM lookup.countries"));
    }

    #[test]
    fn test_select_columns_keeps_current_filter() {
        let current = SqlQuery::parse("SELECT * FROM wiki WHERE page = 'Main'").unwrap();
        let change = mutator().select_columns(&wiki(), Some(&current)).unwrap();
        assert_eq!(
            change.query.to_string(),
            sql("SELECT __time, page, added FROM wiki WHERE page = 'Main'")
        );
    }

    #[test]
    fn test_count_is_all_time() {
        let mutator = mutator().with_default_where(Some(parse_expression("a = 1").unwrap()));
        let change = mutator.count(&wiki(), None).unwrap();
        assert_eq!(
            change.query.to_string(),
            sql(r#"SELECT COUNT(*) AS "Count" FROM wiki"#)
        );
    }

    #[test]
    fn test_min_max_time_strips_time_filter() {
        let current = SqlQuery::parse(
            "SELECT * FROM wiki WHERE __time >= TIMESTAMP '2020-01-01' AND page = 'Main'",
        )
        .unwrap();
        let change = mutator().min_max_time(&wiki(), Some(&current)).unwrap();
        assert_eq!(
            change.query.to_string(),
            sql("SELECT MIN(__time) AS min_time, MAX(__time) AS max_time FROM wiki WHERE page = 'Main'")
        );
    }

    #[test]
    fn test_replace_from() {
        let current = SqlQuery::parse("SELECT page FROM koalas WHERE a = 1").unwrap();
        let change = mutator().replace_from(&wiki(), Some(&current)).unwrap();
        assert!(change.run);
        assert_eq!(
            change.query.to_string(),
            sql("SELECT page FROM wiki WHERE a = 1")
        );

        let countries = TableContext::new("lookup", "countries");
        let change = mutator().replace_from(&countries, Some(&current)).unwrap();
        assert_eq!(
            change.query.to_string(),
            sql("SELECT page FROM countries WHERE a = 1")
        );

        assert!(matches!(
            mutator().replace_from(&wiki(), None),
            Err(QueryError::MissingQuery { .. })
        ));
    }

    #[test]
    fn test_join_with_fallback_columns() {
        let current = SqlQuery::parse("SELECT page FROM wiki").unwrap();
        let countries = TableContext::new("lookup", "countries");

        let change = mutator()
            .join(&countries, Some(&current), JoinKind::Left)
            .unwrap();
        assert!(!change.run);
        assert_eq!(
            change.query.to_string(),
            sql("SELECT page FROM wiki LEFT JOIN lookup.countries ON lookup.countries.k = wiki.XXX")
        );
    }

    #[test]
    fn test_inner_join_reuses_existing_keys_and_keeps_join() {
        let current = SqlQuery::parse(
            "SELECT page FROM wiki LEFT JOIN lookup.countries ON lookup.countries.code = wiki.country",
        )
        .unwrap();
        let cities = TableContext::new("lookup", "cities");

        assert_eq!(
            mutator().join_columns(&current),
            JoinColumns {
                lookup_column: "code".to_string(),
                original_column: "country".to_string(),
            }
        );

        let change = mutator()
            .join(&cities, Some(&current), JoinKind::Inner)
            .unwrap();
        assert_eq!(
            change.query.to_string(),
            sql("SELECT page FROM wiki LEFT JOIN lookup.countries ON lookup.countries.code = wiki.country INNER JOIN lookup.cities ON lookup.cities.code = wiki.country")
        );
    }

    #[test]
    fn test_left_join_replaces_existing_join() {
        let current = SqlQuery::parse(
            "SELECT page FROM wiki LEFT JOIN lookup.countries ON lookup.countries.code = wiki.country",
        )
        .unwrap();
        let cities = TableContext::new("lookup", "cities");

        let change = mutator()
            .join(&cities, Some(&current), JoinKind::Left)
            .unwrap();
        assert_eq!(
            change.query.to_string(),
            sql("SELECT page FROM wiki LEFT JOIN lookup.cities ON lookup.cities.code = wiki.country")
        );
    }

    #[test]
    fn test_join_columns_ignore_non_lookup_condition() {
        let current = SqlQuery::parse(
            "SELECT * FROM wiki INNER JOIN koalas ON koalas.id = wiki.koala_id",
        )
        .unwrap();
        assert_eq!(
            mutator().join_columns(&current),
            JoinColumns {
                lookup_column: "k".to_string(),
                original_column: "koala_id".to_string(),
            }
        );
    }

    #[test]
    fn test_remove_join() {
        let current = SqlQuery::parse(
            "SELECT page FROM wiki LEFT JOIN lookup.countries ON lookup.countries.k = wiki.country",
        )
        .unwrap();
        let change = mutator().remove_join(Some(&current)).unwrap();
        assert!(!change.run);
        assert_eq!(change.query.to_string(), sql("SELECT page FROM wiki"));

        assert!(matches!(
            mutator().remove_join(Some(&change.query)),
            Err(QueryError::MissingJoin { .. })
        ));
    }

    #[test]
    fn test_add_count_aggregate() {
        let current = SqlQuery::parse("SELECT page FROM wiki GROUP BY 1").unwrap();
        let change = mutator().add_count_aggregate(Some(&current)).unwrap();
        assert_eq!(
            change.query.to_string(),
            sql(r#"SELECT page, COUNT(*) AS "Count" FROM wiki GROUP BY 1"#)
        );
    }

    #[test]
    fn test_count_expression() {
        assert_eq!(count_expression(&[]), COUNT_STAR);
        assert_eq!(
            count_expression(&["page".to_string(), "__count".to_string()]),
            r#"SUM(__count) AS "Count""#
        );
    }

    #[test]
    fn test_new_parses_default_where() {
        let config = ConsoleConfig {
            default_where: Some("country = 'NZ'".to_string()),
            ..ConsoleConfig::default()
        };
        let mutator = QueryMutator::new(&config).unwrap();
        let change = mutator.select_star(&wiki(), None).unwrap();
        assert_eq!(
            change.query.to_string(),
            sql("SELECT * FROM wiki WHERE country = 'NZ'")
        );

        let config = ConsoleConfig {
            default_where: Some("country = ".to_string()),
            ..ConsoleConfig::default()
        };
        assert!(QueryMutator::new(&config).is_err());
    }
}
