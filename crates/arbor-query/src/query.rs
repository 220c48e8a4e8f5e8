//! Parsed `SELECT` queries and the structural edits made to them.
//!
//! [`SqlQuery`] wraps a `sqlparser` AST. Every edit consumes the query and
//! returns the edited one, so callers holding the previous value are never
//! affected.

use std::fmt;
use std::ops::ControlFlow;

use sqlparser::ast::{
    BinaryOperator, Expr, GroupByExpr, Ident, Join, Query, Select, SelectItem, SetExpr,
    Statement, TableFactor, TableWithJoins, visit_expressions,
};
use sqlparser::dialect::GenericDialect;
use sqlparser::keywords::ALL_KEYWORDS;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::Token;

use crate::error::QueryError;

const DIALECT: GenericDialect = GenericDialect {};

/// Function names treated as aggregates when looking for aggregate select items.
const AGGREGATE_FUNCTIONS: &[&str] = &[
    "ANY_VALUE", "ARRAY_AGG", "AVG", "BIT_AND", "BIT_OR", "BIT_XOR", "COUNT", "LISTAGG", "MAX",
    "MIN", "STDDEV", "STDDEV_POP", "STDDEV_SAMP", "STRING_AGG", "SUM", "VARIANCE", "VAR_POP",
    "VAR_SAMP",
];

/// Prefixes of aggregate families (`APPROX_COUNT_DISTINCT_DS_HLL`, `EARLIEST_BY`, ...).
const AGGREGATE_PREFIXES: &[&str] = &["APPROX_", "DS_", "EARLIEST", "LATEST"];

/// A parsed `SELECT` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlQuery {
    query: Box<Query>,
}

impl SqlQuery {
    /// Parse a single `SELECT` statement.
    pub fn parse(sql: &str) -> Result<Self, QueryError> {
        let mut statements = Parser::parse_sql(&DIALECT, sql)?;
        if statements.len() != 1 {
            return Err(QueryError::NotASelect {
                statement: sql.to_string(),
            });
        }

        match statements.remove(0) {
            Statement::Query(query) if matches!(query.body.as_ref(), SetExpr::Select(_)) => {
                Ok(Self { query })
            }
            _ => Err(QueryError::NotASelect {
                statement: sql.to_string(),
            }),
        }
    }

    /// `SELECT * FROM <table>`.
    pub fn select_star_from(table: &SqlTable) -> Result<Self, QueryError> {
        SelectTemplate::new(table.to_string()).parse()
    }

    fn select(&self) -> Option<&Select> {
        match self.query.body.as_ref() {
            SetExpr::Select(select) => Some(&**select),
            _ => None,
        }
    }

    fn edit(mut self, f: impl FnOnce(&mut Select)) -> Self {
        if let SetExpr::Select(select) = self.query.body.as_mut() {
            f(&mut **select);
        }
        self
    }

    /// Unqualified name of the first table in the FROM clause.
    pub fn first_table_name(&self) -> Option<String> {
        table_factor_name(self.first_from_relation()?)
    }

    /// Whether the first FROM table is `table`.
    pub fn targets(&self, table: &str) -> bool {
        self.first_table_name().as_deref() == Some(table)
    }

    /// The first FROM relation, without its joins.
    pub fn first_from_relation(&self) -> Option<&TableFactor> {
        self.select()?.from.first().map(|t| &t.relation)
    }

    pub fn where_expression(&self) -> Option<&Expr> {
        self.select()?.selection.as_ref()
    }

    /// Whether any filter condition mentions `column`.
    pub fn where_references(&self, column: &str) -> bool {
        self.where_expression()
            .is_some_and(|expr| references_column(expr, column))
    }

    pub fn select_items(&self) -> &[SelectItem] {
        self.select().map(|s| s.projection.as_slice()).unwrap_or(&[])
    }

    /// Select items that compute an aggregate (`COUNT(*)`, `SUM(x) AS y`, ...).
    pub fn aggregate_select_items(&self) -> Vec<SelectItem> {
        self.select_items()
            .iter()
            .filter(|item| is_aggregate_item(item))
            .cloned()
            .collect()
    }

    pub fn has_group_by(&self) -> bool {
        self.select().is_some_and(|s| {
            !matches!(&s.group_by, GroupByExpr::Expressions(exprs, _) if exprs.is_empty())
        })
    }

    /// Joins attached to the first FROM relation.
    pub fn joins(&self) -> &[Join] {
        self.select()
            .and_then(|s| s.from.first())
            .map(|t| t.joins.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_join(&self) -> bool {
        !self.joins().is_empty()
    }

    /// Unqualified name of the first joined table.
    pub fn first_join_table_name(&self) -> Option<String> {
        table_factor_name(&self.joins().first()?.relation)
    }

    pub fn change_select_items(self, items: Vec<SelectItem>) -> Self {
        self.edit(|s| s.projection = items)
    }

    /// Replace the select item at `index`, appending when out of range.
    pub fn change_select(self, index: usize, item: SelectItem) -> Self {
        self.edit(|s| match s.projection.get_mut(index) {
            Some(slot) => *slot = item,
            None => s.projection.push(item),
        })
    }

    pub fn add_select(self, item: SelectItem) -> Self {
        self.edit(|s| s.projection.push(item))
    }

    pub fn change_where(self, expr: Option<Expr>) -> Self {
        self.edit(|s| s.selection = expr)
    }

    /// AND `expr` onto the current filter.
    pub fn add_where(self, expr: Expr) -> Self {
        self.edit(|s| {
            let mut conjuncts = Vec::new();
            if let Some(existing) = s.selection.take() {
                split_conjuncts(existing, &mut conjuncts);
            }
            conjuncts.push(expr);
            s.selection = join_conjuncts(conjuncts);
        })
    }

    /// Drop every top-level filter condition that mentions `column`.
    pub fn remove_column_from_where(self, column: &str) -> Self {
        self.edit(|s| {
            let Some(existing) = s.selection.take() else {
                return;
            };
            let mut conjuncts = Vec::new();
            split_conjuncts(existing, &mut conjuncts);
            conjuncts.retain(|c| !references_column(c, column));
            s.selection = join_conjuncts(conjuncts);
        })
    }

    pub fn clear_group_by(self) -> Self {
        self.edit(|s| {
            if let GroupByExpr::Expressions(exprs, _) = &mut s.group_by {
                exprs.clear();
            } else {
                s.group_by = GroupByExpr::Expressions(vec![], vec![]);
            }
        })
    }

    /// Replace the FROM list with `relation`, keeping the joins of the first entry.
    pub fn change_from(self, relation: TableFactor) -> Self {
        self.edit(|s| match s.from.first_mut() {
            Some(first) => {
                first.relation = relation;
                s.from.truncate(1);
            }
            None => s.from.push(TableWithJoins {
                relation,
                joins: vec![],
            }),
        })
    }

    pub fn remove_all_joins(self) -> Self {
        self.edit(|s| {
            for table in &mut s.from {
                table.joins.clear();
            }
        })
    }

    pub fn add_join(self, join: Join) -> Self {
        self.edit(|s| {
            if let Some(first) = s.from.first_mut() {
                first.joins.push(join);
            }
        })
    }
}

impl fmt::Display for SqlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.query.fmt(f)
    }
}

/// A table reference, optionally qualified by its schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SqlTable {
    pub name: String,
    pub schema: Option<String>,
}

impl SqlTable {
    pub fn new(name: impl Into<String>, schema: Option<String>) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }

    pub fn bare(name: impl Into<String>) -> Self {
        Self::new(name, None)
    }
}

impl fmt::Display for SqlTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(schema) = &self.schema {
            write!(f, "{}.", quote_ident(schema))?;
        }
        f.write_str(&quote_ident(&self.name))
    }
}

/// Text pieces of a fresh `SELECT`, rendered and parsed in one go.
#[derive(Debug, Clone)]
pub(crate) struct SelectTemplate {
    items: Vec<String>,
    from: String,
    selection: Option<String>,
    group_by: Vec<String>,
    order_by: Vec<String>,
}

impl SelectTemplate {
    pub(crate) fn new(from: String) -> Self {
        Self {
            items: vec!["*".to_string()],
            from,
            selection: None,
            group_by: Vec::new(),
            order_by: Vec::new(),
        }
    }

    pub(crate) fn items(mut self, items: Vec<String>) -> Self {
        if !items.is_empty() {
            self.items = items;
        }
        self
    }

    pub(crate) fn selection(mut self, expr: Option<&Expr>) -> Self {
        self.selection = expr.map(ToString::to_string);
        self
    }

    pub(crate) fn group_by(mut self, exprs: &[&str]) -> Self {
        self.group_by = exprs.iter().map(|e| e.to_string()).collect();
        self
    }

    pub(crate) fn order_by(mut self, exprs: &[&str]) -> Self {
        self.order_by = exprs.iter().map(|e| e.to_string()).collect();
        self
    }

    pub(crate) fn render(&self) -> String {
        let mut sql = format!("SELECT {} FROM {}", self.items.join(", "), self.from);
        if let Some(selection) = &self.selection {
            sql.push_str(&format!(" WHERE {selection}"));
        }
        if !self.group_by.is_empty() {
            sql.push_str(&format!(" GROUP BY {}", self.group_by.join(", ")));
        }
        if !self.order_by.is_empty() {
            sql.push_str(&format!(" ORDER BY {}", self.order_by.join(", ")));
        }
        sql
    }

    pub(crate) fn parse(self) -> Result<SqlQuery, QueryError> {
        SqlQuery::parse(&self.render())
    }
}

/// Parse a standalone expression such as `country = 'NZ'`.
pub fn parse_expression(sql: &str) -> Result<Expr, QueryError> {
    let mut parser = Parser::new(&DIALECT).try_with_sql(sql)?;
    let expr = parser.parse_expr()?;
    expect_end(&mut parser, sql)?;
    Ok(expr)
}

/// Parse a select list entry such as `COUNT(*) AS "Count"`.
pub fn parse_select_item(sql: &str) -> Result<SelectItem, QueryError> {
    let mut parser = Parser::new(&DIALECT).try_with_sql(sql)?;
    let item = parser.parse_select_item()?;
    expect_end(&mut parser, sql)?;
    Ok(item)
}

fn expect_end(parser: &mut Parser<'_>, sql: &str) -> Result<(), QueryError> {
    if parser.peek_token().token == Token::EOF {
        Ok(())
    } else {
        Err(QueryError::ParseError(format!("unexpected trailing input in: {sql}")))
    }
}

/// Parse a table reference such as `lookup.countries`.
pub(crate) fn parse_relation(sql: &str) -> Result<TableFactor, QueryError> {
    let query = SqlQuery::parse(&format!("SELECT * FROM {sql}"))?;
    query
        .first_from_relation()
        .cloned()
        .ok_or_else(|| QueryError::ParseError(format!("not a table reference: {sql}")))
}

/// Parse a single join clause, e.g. `("LEFT", "lookup.c", "lookup.c.k = t.x")`.
pub(crate) fn parse_join(keyword: &str, relation: &str, on: &str) -> Result<Join, QueryError> {
    let sql = format!("SELECT * FROM t {keyword} JOIN {relation} ON {on}");
    let query = SqlQuery::parse(&sql)?;
    query
        .joins()
        .first()
        .cloned()
        .ok_or(QueryError::ParseError(sql))
}

/// Render `name` as an identifier, quoting it when it is not a plain word or
/// when it is a keyword the parser could read as something else
/// (`CURRENT_DATE`, `TRIM(...)`).
pub fn quote_ident(name: &str) -> String {
    let plain = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    let reserved = ALL_KEYWORDS
        .binary_search(&name.to_ascii_uppercase().as_str())
        .is_ok();

    if plain && !reserved {
        name.to_string()
    } else {
        Ident::with_quote('"', name).to_string()
    }
}

/// Last dot-separated part of a possibly quoted name, unquoted.
fn last_identifier(name: &str) -> String {
    let mut parts = vec![String::new()];
    let mut in_quotes = false;
    let mut chars = name.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                chars.next();
                if let Some(part) = parts.last_mut() {
                    part.push('"');
                }
            }
            '"' => in_quotes = !in_quotes,
            '.' if !in_quotes => parts.push(String::new()),
            _ => {
                if let Some(part) = parts.last_mut() {
                    part.push(c);
                }
            }
        }
    }

    parts.pop().unwrap_or_default()
}

fn table_factor_name(factor: &TableFactor) -> Option<String> {
    match factor {
        TableFactor::Table { name, .. } => Some(last_identifier(&name.to_string())),
        _ => None,
    }
}

fn split_conjuncts(expr: Expr, out: &mut Vec<Expr>) {
    match expr {
        Expr::BinaryOp {
            left,
            op: BinaryOperator::And,
            right,
        } => {
            split_conjuncts(*left, out);
            split_conjuncts(*right, out);
        }
        Expr::Nested(inner)
            if matches!(
                inner.as_ref(),
                Expr::BinaryOp {
                    op: BinaryOperator::And,
                    ..
                }
            ) =>
        {
            split_conjuncts(*inner, out)
        }
        other => out.push(other),
    }
}

fn join_conjuncts(conjuncts: Vec<Expr>) -> Option<Expr> {
    let parenthesize = conjuncts.len() > 1;
    conjuncts
        .into_iter()
        .map(|c| match c {
            // OR binds looser than AND.
            or @ Expr::BinaryOp {
                op: BinaryOperator::Or,
                ..
            } if parenthesize => Expr::Nested(Box::new(or)),
            other => other,
        })
        .reduce(|left, right| Expr::BinaryOp {
            left: Box::new(left),
            op: BinaryOperator::And,
            right: Box::new(right),
        })
}

fn references_column(expr: &Expr, column: &str) -> bool {
    visit_expressions(expr, |e| {
        let hit = match e {
            Expr::Identifier(ident) => ident.value == column,
            Expr::CompoundIdentifier(parts) => parts.last().is_some_and(|p| p.value == column),
            _ => false,
        };
        if hit {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })
    .is_break()
}

fn is_aggregate_item(item: &SelectItem) -> bool {
    match item {
        SelectItem::UnnamedExpr(expr) | SelectItem::ExprWithAlias { expr, .. } => {
            contains_aggregate(expr)
        }
        _ => false,
    }
}

fn contains_aggregate(expr: &Expr) -> bool {
    visit_expressions(expr, |e| match e {
        Expr::Function(function) if is_aggregate_function(&function.name.to_string()) => {
            ControlFlow::Break(())
        }
        _ => ControlFlow::Continue(()),
    })
    .is_break()
}

fn is_aggregate_function(name: &str) -> bool {
    let upper = last_identifier(name).to_ascii_uppercase();
    AGGREGATE_FUNCTIONS.contains(&upper.as_str())
        || AGGREGATE_PREFIXES.iter().any(|p| upper.starts_with(p))
}
