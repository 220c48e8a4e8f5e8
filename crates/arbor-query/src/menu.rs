//! Context menus for tables and columns.
//!
//! The menus list only the actions whose preconditions hold for the current
//! query, with the labels the console shows.

use std::fmt;
use std::str::FromStr;

use arbor_core::TIME_COLUMN;
use serde::{Serialize, Serializer};

use crate::column_actions::{ColumnAction, column_actions};
use crate::error::QueryError;
use crate::mutator::{
    ColumnContext, JoinKind, QueryChange, QueryMutator, TableContext, count_expression,
};
use crate::query::{SqlQuery, SqlTable};

/// An entry of a table menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TableAction {
    SelectColumns,
    SelectStar,
    Count,
    MinMaxTime,
    ReplaceFrom,
    LeftJoin,
    InnerJoin,
    RemoveJoin,
    AggregateCount,
    Copy,
}

impl TableAction {
    pub const ALL: [TableAction; 10] = [
        TableAction::SelectColumns,
        TableAction::SelectStar,
        TableAction::Count,
        TableAction::MinMaxTime,
        TableAction::ReplaceFrom,
        TableAction::LeftJoin,
        TableAction::InnerJoin,
        TableAction::RemoveJoin,
        TableAction::AggregateCount,
        TableAction::Copy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableAction::SelectColumns => "select-columns",
            TableAction::SelectStar => "select-star",
            TableAction::Count => "count",
            TableAction::MinMaxTime => "min-max-time",
            TableAction::ReplaceFrom => "replace-from",
            TableAction::LeftJoin => "left-join",
            TableAction::InnerJoin => "inner-join",
            TableAction::RemoveJoin => "remove-join",
            TableAction::AggregateCount => "aggregate-count",
            TableAction::Copy => "copy",
        }
    }
}

impl fmt::Display for TableAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableAction {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| QueryError::UnknownAction(s.to_string()))
    }
}

/// An entry of a column menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnMenuAction {
    Show,
    Column(ColumnAction),
    Copy,
}

impl ColumnMenuAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnMenuAction::Show => "show",
            ColumnMenuAction::Column(action) => action.as_str(),
            ColumnMenuAction::Copy => "copy",
        }
    }
}

impl fmt::Display for ColumnMenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnMenuAction {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "show" => Ok(ColumnMenuAction::Show),
            "copy" => Ok(ColumnMenuAction::Copy),
            other => other.parse().map(ColumnMenuAction::Column),
        }
    }
}

impl Serialize for ColumnMenuAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A menu entry: what to do, what to show, and the submenu it sits in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem<A> {
    pub action: A,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl<A> MenuItem<A> {
    fn new(action: A, label: impl Into<String>) -> Self {
        Self {
            action,
            label: label.into(),
            group: None,
        }
    }

    fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// What the host should do after a menu entry is picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuOutcome {
    Query(QueryChange),
    /// Text for the clipboard.
    Copy(String),
}

/// Entries of the context menu of table `ctx`.
pub fn table_menu(
    mutator: &QueryMutator,
    ctx: &TableContext,
    current: Option<&SqlQuery>,
) -> Vec<MenuItem<TableAction>> {
    let table = &ctx.table;
    let reference = SqlTable::bare(table.clone()).to_string();

    let mut items = vec![
        MenuItem::new(
            TableAction::SelectColumns,
            format!("SELECT ...columns... FROM {table}"),
        ),
        MenuItem::new(TableAction::SelectStar, format!("SELECT * FROM {table}")),
        MenuItem::new(
            TableAction::Count,
            format!("SELECT {} FROM {table}", count_expression(&ctx.columns)),
        ),
        MenuItem::new(
            TableAction::MinMaxTime,
            format!("SELECT MIN({TIME_COLUMN}), MAX({TIME_COLUMN}) FROM {table}"),
        ),
    ];

    if let Some(query) = current {
        if !query.targets(table) {
            items.push(MenuItem::new(
                TableAction::ReplaceFrom,
                format!("Replace FROM with: {reference}"),
            ));
        }
        if mutator.is_lookup_schema(&ctx.schema) {
            let group = if query.has_join() { "Replace join" } else { "Join" };
            items.push(MenuItem::new(TableAction::LeftJoin, "Left join").in_group(group));
            items.push(MenuItem::new(TableAction::InnerJoin, "Inner join").in_group(group));
        }
        if query.first_join_table_name().as_deref() == Some(table.as_str()) {
            items.push(MenuItem::new(TableAction::RemoveJoin, "Remove join"));
        }
        if query.has_group_by() && query.targets(table) {
            items.push(MenuItem::new(TableAction::AggregateCount, "Aggregate COUNT(*)"));
        }
    }

    items.push(MenuItem::new(TableAction::Copy, format!("Copy: {reference}")));
    items
}

/// Entries of the context menu of column `ctx`.
pub fn column_menu(
    ctx: &ColumnContext,
    current: Option<&SqlQuery>,
) -> Vec<MenuItem<ColumnMenuAction>> {
    let column = &ctx.column;
    let mut items = vec![MenuItem::new(
        ColumnMenuAction::Show,
        format!("Show: {column}"),
    )];

    if let Some(query) = current {
        items.extend(
            column_actions(&ctx.kind)
                .into_iter()
                .filter(|action| {
                    *action != ColumnAction::RemoveFilter || query.where_references(column)
                })
                .map(|action| {
                    MenuItem::new(ColumnMenuAction::Column(action), action.label(column))
                        .in_group(action.group())
                }),
        );
    }

    items.push(MenuItem::new(ColumnMenuAction::Copy, format!("Copy: {column}")));
    items
}

/// Run a table menu entry.
pub fn apply_table_action(
    mutator: &QueryMutator,
    action: TableAction,
    ctx: &TableContext,
    current: Option<&SqlQuery>,
) -> Result<MenuOutcome, QueryError> {
    let change = match action {
        TableAction::SelectColumns => mutator.select_columns(ctx, current)?,
        TableAction::SelectStar => mutator.select_star(ctx, current)?,
        TableAction::Count => mutator.count(ctx, current)?,
        TableAction::MinMaxTime => mutator.min_max_time(ctx, current)?,
        TableAction::ReplaceFrom => mutator.replace_from(ctx, current)?,
        TableAction::LeftJoin => mutator.join(ctx, current, JoinKind::Left)?,
        TableAction::InnerJoin => mutator.join(ctx, current, JoinKind::Inner)?,
        TableAction::RemoveJoin => mutator.remove_join(current)?,
        TableAction::AggregateCount => mutator.add_count_aggregate(current)?,
        TableAction::Copy => {
            return Ok(MenuOutcome::Copy(SqlTable::bare(ctx.table.clone()).to_string()));
        }
    };
    Ok(MenuOutcome::Query(change))
}

/// Run a column menu entry.
pub fn apply_column_menu_action(
    mutator: &QueryMutator,
    action: ColumnMenuAction,
    ctx: &ColumnContext,
    current: Option<&SqlQuery>,
) -> Result<MenuOutcome, QueryError> {
    match action {
        ColumnMenuAction::Show => mutator.show_column(ctx, current).map(MenuOutcome::Query),
        ColumnMenuAction::Column(action) => mutator
            .apply_column_action(action, ctx, current)
            .map(MenuOutcome::Query),
        ColumnMenuAction::Copy => Ok(MenuOutcome::Copy(ctx.column.clone())),
    }
}
