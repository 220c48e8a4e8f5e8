//! `arbor explain` command implementation.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use arbor_query::{
    ExplainPlan, explain_payload, format_column_mappings_and_signature, parse_explain_result,
};

/// Print the request body for explaining `sql`.
pub fn payload(
    sql: Option<&str>,
    context: Option<&str>,
    mandatory_context: Option<&str>,
    wrap_limit: Option<u64>,
) -> Result<()> {
    let sql = sql.context("SQL to explain is required unless --plan is given")?;
    let context = parse_object(context, "--context")?.unwrap_or_default();
    let mandatory = parse_object(mandatory_context, "--mandatory-context")?;

    let body = explain_payload(sql, &context, mandatory.as_ref(), wrap_limit);
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

/// Print the plan contained in explain result rows.
pub fn print_plan(path: &Path) -> Result<()> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read explain result: {:?}", path))?;
    let rows: Value = serde_json::from_str(&content)
        .with_context(|| format!("Explain result is not JSON: {:?}", path))?;

    match parse_explain_result(&rows)? {
        ExplainPlan::Structured(explanations) => {
            for (i, explanation) in explanations.iter().enumerate() {
                if explanations.len() > 1 {
                    println!("Query {}", i + 1);
                }
                println!("{}", serde_json::to_string_pretty(&explanation.query)?);
                println!(
                    "Signature: {}",
                    format_column_mappings_and_signature(explanation)
                );
            }
        }
        ExplainPlan::Text(text) => println!("{text}"),
    }
    Ok(())
}

fn parse_object(raw: Option<&str>, flag: &str) -> Result<Option<Map<String, Value>>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match serde_json::from_str::<Value>(raw).with_context(|| format!("{flag} is not valid JSON"))? {
        Value::Object(map) => Ok(Some(map)),
        _ => anyhow::bail!("{flag} must be a JSON object"),
    }
}
