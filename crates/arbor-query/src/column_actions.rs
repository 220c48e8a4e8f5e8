//! Kind-specific column transforms: aggregates, recency filters and filter
//! removal.

use std::fmt;
use std::str::FromStr;

use arbor_core::ColumnKind;
use serde::{Serialize, Serializer};
use sqlparser::ast::Ident;

use crate::error::QueryError;
use crate::mutator::{ColumnContext, QueryChange, QueryMutator};
use crate::query::{SqlQuery, parse_expression, parse_select_item, quote_ident};

/// Aggregate functions offered on a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFn {
    Sum,
    Min,
    Max,
    Avg,
    CountDistinct,
    /// `hyperUnique` columns.
    ApproxCountDistinct,
    /// `HLLSketch` columns.
    ApproxCountDistinctHll,
    /// `thetaSketch` columns.
    ApproxCountDistinctTheta,
    /// Median of a `quantilesDoublesSketch` column.
    ApproxMedian,
}

impl AggregateFn {
    /// SQL expression applying the aggregate to `column`.
    pub fn expression(&self, column: &str) -> String {
        let column = quote_ident(column);
        match self {
            AggregateFn::Sum => format!("SUM({column})"),
            AggregateFn::Min => format!("MIN({column})"),
            AggregateFn::Max => format!("MAX({column})"),
            AggregateFn::Avg => format!("AVG({column})"),
            AggregateFn::CountDistinct => format!("COUNT(DISTINCT {column})"),
            AggregateFn::ApproxCountDistinct => format!("APPROX_COUNT_DISTINCT({column})"),
            AggregateFn::ApproxCountDistinctHll => {
                format!("APPROX_COUNT_DISTINCT_DS_HLL({column})")
            }
            AggregateFn::ApproxCountDistinctTheta => {
                format!("APPROX_COUNT_DISTINCT_DS_THETA({column})")
            }
            AggregateFn::ApproxMedian => format!("APPROX_QUANTILE_DS({column}, 0.5)"),
        }
    }

    /// Output column name, e.g. `sum_added`.
    pub fn alias(&self, column: &str) -> String {
        let prefix = match self {
            AggregateFn::Sum => "sum",
            AggregateFn::Min => "min",
            AggregateFn::Max => "max",
            AggregateFn::Avg => "avg",
            AggregateFn::CountDistinct
            | AggregateFn::ApproxCountDistinct
            | AggregateFn::ApproxCountDistinctHll
            | AggregateFn::ApproxCountDistinctTheta => "dist",
            AggregateFn::ApproxMedian => "median",
        };
        format!("{prefix}_{column}")
    }
}

/// Window of a "latest ..." filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Hour,
    Day,
    Week,
}

impl TimeUnit {
    fn keyword(&self) -> &'static str {
        match self {
            TimeUnit::Hour => "HOUR",
            TimeUnit::Day => "DAY",
            TimeUnit::Week => "WEEK",
        }
    }
}

/// A kind-specific action on a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnAction {
    /// Append `<fn>(<col>) AS "<alias>"` to the select list.
    Aggregate(AggregateFn),
    /// Keep only rows from the latest unit of time.
    FilterLatest(TimeUnit),
    /// Drop every filter condition on the column.
    RemoveFilter,
}

impl ColumnAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnAction::Aggregate(AggregateFn::Sum) => "sum",
            ColumnAction::Aggregate(AggregateFn::Min) => "min",
            ColumnAction::Aggregate(AggregateFn::Max) => "max",
            ColumnAction::Aggregate(AggregateFn::Avg) => "avg",
            ColumnAction::Aggregate(AggregateFn::CountDistinct) => "count-distinct",
            ColumnAction::Aggregate(AggregateFn::ApproxCountDistinct) => "approx-count-distinct",
            ColumnAction::Aggregate(AggregateFn::ApproxCountDistinctHll) => {
                "approx-count-distinct-hll"
            }
            ColumnAction::Aggregate(AggregateFn::ApproxCountDistinctTheta) => {
                "approx-count-distinct-theta"
            }
            ColumnAction::Aggregate(AggregateFn::ApproxMedian) => "approx-median",
            ColumnAction::FilterLatest(TimeUnit::Hour) => "latest-hour",
            ColumnAction::FilterLatest(TimeUnit::Day) => "latest-day",
            ColumnAction::FilterLatest(TimeUnit::Week) => "latest-week",
            ColumnAction::RemoveFilter => "remove-filter",
        }
    }

    /// Menu label for the action on `column`.
    pub fn label(&self, column: &str) -> String {
        match self {
            ColumnAction::Aggregate(f) => f.expression(column),
            ColumnAction::FilterLatest(TimeUnit::Hour) => "Latest hour".to_string(),
            ColumnAction::FilterLatest(TimeUnit::Day) => "Latest day".to_string(),
            ColumnAction::FilterLatest(TimeUnit::Week) => "Latest week".to_string(),
            ColumnAction::RemoveFilter => "Remove filter".to_string(),
        }
    }

    /// Menu group the action is listed under.
    pub fn group(&self) -> &'static str {
        match self {
            ColumnAction::Aggregate(_) => "Aggregate",
            ColumnAction::FilterLatest(_) | ColumnAction::RemoveFilter => "Filter",
        }
    }
}

const ALL_ACTIONS: [ColumnAction; 13] = [
    ColumnAction::Aggregate(AggregateFn::Sum),
    ColumnAction::Aggregate(AggregateFn::Min),
    ColumnAction::Aggregate(AggregateFn::Max),
    ColumnAction::Aggregate(AggregateFn::Avg),
    ColumnAction::Aggregate(AggregateFn::CountDistinct),
    ColumnAction::Aggregate(AggregateFn::ApproxCountDistinct),
    ColumnAction::Aggregate(AggregateFn::ApproxCountDistinctHll),
    ColumnAction::Aggregate(AggregateFn::ApproxCountDistinctTheta),
    ColumnAction::Aggregate(AggregateFn::ApproxMedian),
    ColumnAction::FilterLatest(TimeUnit::Hour),
    ColumnAction::FilterLatest(TimeUnit::Day),
    ColumnAction::FilterLatest(TimeUnit::Week),
    ColumnAction::RemoveFilter,
];

impl fmt::Display for ColumnAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnAction {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_ACTIONS
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| QueryError::UnknownAction(s.to_string()))
    }
}

impl Serialize for ColumnAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Kind-specific actions for a column of `kind`, in menu order.
pub fn column_actions(kind: &ColumnKind) -> Vec<ColumnAction> {
    use ColumnAction::*;

    let mut actions = match kind {
        ColumnKind::Number => vec![
            Aggregate(AggregateFn::Sum),
            Aggregate(AggregateFn::Min),
            Aggregate(AggregateFn::Max),
            Aggregate(AggregateFn::Avg),
        ],
        ColumnKind::String => vec![Aggregate(AggregateFn::CountDistinct)],
        ColumnKind::Timestamp => vec![
            Aggregate(AggregateFn::Min),
            Aggregate(AggregateFn::Max),
            FilterLatest(TimeUnit::Hour),
            FilterLatest(TimeUnit::Day),
            FilterLatest(TimeUnit::Week),
        ],
        ColumnKind::Complex(name) => match name.as_str() {
            "hyperUnique" => vec![Aggregate(AggregateFn::ApproxCountDistinct)],
            "HLLSketch" => vec![Aggregate(AggregateFn::ApproxCountDistinctHll)],
            "thetaSketch" => vec![Aggregate(AggregateFn::ApproxCountDistinctTheta)],
            "quantilesDoublesSketch" => vec![Aggregate(AggregateFn::ApproxMedian)],
            _ => vec![],
        },
        ColumnKind::Other(_) => vec![],
    };
    actions.push(RemoveFilter);
    actions
}

impl QueryMutator {
    /// Apply a kind-specific column action.
    ///
    /// Aggregates and filters edit the current query when it is on the
    /// column's table and start from `SELECT * FROM <table>` otherwise.
    /// Removing a filter always edits the current query.
    pub fn apply_column_action(
        &self,
        action: ColumnAction,
        ctx: &ColumnContext,
        current: Option<&SqlQuery>,
    ) -> Result<QueryChange, QueryError> {
        let column = ctx.column.as_str();
        let on_table = current.filter(|q| q.targets(&ctx.table.table)).cloned();

        let query = match action {
            ColumnAction::Aggregate(f) => {
                let alias = Ident::with_quote('"', f.alias(column));
                let item = parse_select_item(&format!("{} AS {alias}", f.expression(column)))?;
                match on_table {
                    Some(query) => query.add_select(item),
                    None => self.fresh_query(ctx, current)?.change_select_items(vec![item]),
                }
            }
            ColumnAction::FilterLatest(unit) => {
                let filter = parse_expression(&format!(
                    "{} >= CURRENT_TIMESTAMP - INTERVAL '1' {}",
                    quote_ident(column),
                    unit.keyword()
                ))?;
                let base = match on_table {
                    Some(query) => query,
                    None => self.fresh_query(ctx, current)?,
                };
                base.remove_column_from_where(column).add_where(filter)
            }
            ColumnAction::RemoveFilter => current
                .ok_or(QueryError::MissingQuery {
                    action: "Remove filter",
                })?
                .clone()
                .remove_column_from_where(column),
        };

        tracing::debug!(
            action = action.as_str(),
            table = %ctx.table.table,
            column,
            sql = %query,
            "Derived query"
        );
        Ok(QueryChange { query, run: true })
    }

    fn fresh_query(
        &self,
        ctx: &ColumnContext,
        current: Option<&SqlQuery>,
    ) -> Result<SqlQuery, QueryError> {
        Ok(SqlQuery::select_star_from(&self.table_reference(&ctx.table))?
            .change_where(self.applicable_where(&ctx.table, current, false)))
    }
}
