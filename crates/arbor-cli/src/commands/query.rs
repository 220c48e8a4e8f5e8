//! `arbor show-column`, `arbor table-action`, `arbor column-action` and
//! `arbor menu` command implementations.

use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;

use arbor_query::{
    ColumnMenuAction, MenuItem, MenuOutcome, QueryMutator, TableAction,
    apply_column_menu_action, apply_table_action, column_menu, table_menu,
};

use super::{Session, parse_query};

pub fn table_action(
    metadata: &Path,
    config: Option<&Path>,
    table: &str,
    action: &str,
    query: Option<&str>,
    json: bool,
) -> Result<()> {
    let session = Session::load(metadata, config)?;
    let mutator = mutator(&session)?;
    let action: TableAction = action.parse()?;
    let ctx = session.table(table)?;
    let current = parse_query(query)?;

    let outcome = apply_table_action(&mutator, action, &ctx, current.as_ref())
        .with_context(|| format!("Failed to apply {action} on {table}"))?;
    print_outcome(&outcome, json)
}

pub fn column_action(
    metadata: &Path,
    config: Option<&Path>,
    table: &str,
    column: &str,
    action: &str,
    query: Option<&str>,
    json: bool,
) -> Result<()> {
    let session = Session::load(metadata, config)?;
    let mutator = mutator(&session)?;
    let action: ColumnMenuAction = action.parse()?;
    let ctx = session.column(table, column)?;
    let current = parse_query(query)?;

    let outcome = apply_column_menu_action(&mutator, action, &ctx, current.as_ref())
        .with_context(|| format!("Failed to apply {action} on {table}.{column}"))?;
    print_outcome(&outcome, json)
}

pub fn menu(
    metadata: &Path,
    config: Option<&Path>,
    table: &str,
    column: Option<&str>,
    query: Option<&str>,
    json: bool,
) -> Result<()> {
    let session = Session::load(metadata, config)?;
    let current = parse_query(query)?;

    match column {
        Some(column) => {
            let ctx = session.column(table, column)?;
            print_menu(&column_menu(&ctx, current.as_ref()), json)
        }
        None => {
            let mutator = mutator(&session)?;
            let ctx = session.table(table)?;
            print_menu(&table_menu(&mutator, &ctx, current.as_ref()), json)
        }
    }
}

fn mutator(session: &Session) -> Result<QueryMutator> {
    QueryMutator::new(&session.config).context("Invalid default_where in configuration")
}

fn print_outcome(outcome: &MenuOutcome, json: bool) -> Result<()> {
    match outcome {
        MenuOutcome::Query(change) if json => {
            let value = json!({ "query": change.query.to_string(), "run": change.run });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        MenuOutcome::Query(change) => {
            println!("{}", change.query);
            if !change.run {
                tracing::info!("Query staged for editing, not run");
            }
        }
        MenuOutcome::Copy(text) if json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "copy": text }))?);
        }
        MenuOutcome::Copy(text) => println!("{text}"),
    }
    Ok(())
}

fn print_menu<A: std::fmt::Display + serde::Serialize>(
    items: &[MenuItem<A>],
    json: bool,
) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
        return Ok(());
    }

    for item in items {
        match &item.group {
            Some(group) => println!("{:<28} {} > {}", item.action.to_string(), group, item.label),
            None => println!("{:<28} {}", item.action.to_string(), item.label),
        }
    }
    Ok(())
}
