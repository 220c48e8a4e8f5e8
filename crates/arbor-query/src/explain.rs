//! Helpers for the explain-plan view: building the request body and reading
//! the plan back. Sending the request is up to the host.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::QueryError;

/// Prefix `sql` with `EXPLAIN PLAN FOR` unless it is already an explain.
pub fn wrap_in_explain_if_needed(sql: &str) -> String {
    let sql = sql.trim_end().trim_end_matches(';').trim_end();
    let leading = sql.trim_start();
    let is_explain = leading
        .get(..7)
        .is_some_and(|word| word.eq_ignore_ascii_case("EXPLAIN"))
        && leading[7..].starts_with(char::is_whitespace);

    if is_explain {
        sql.to_string()
    } else {
        format!("EXPLAIN PLAN FOR {sql}")
    }
}

/// JSON body for an explain request.
///
/// A context is attached when `context` is non-empty, a wrap limit is set or
/// a mandatory context is given; it then asks for the native explain and caps
/// the outer limit at `wrap_limit + 1`.
pub fn explain_payload(
    sql: &str,
    context: &Map<String, Value>,
    mandatory_context: Option<&Map<String, Value>>,
    wrap_limit: Option<u64>,
) -> Value {
    let mut payload = json!({ "query": wrap_in_explain_if_needed(sql) });

    if !context.is_empty() || wrap_limit.is_some() || mandatory_context.is_some() {
        let mut merged = context.clone();
        if let Some(mandatory) = mandatory_context {
            merged.extend(mandatory.clone());
        }
        merged.insert("useNativeQueryExplain".to_string(), Value::Bool(true));
        if let Some(limit) = wrap_limit {
            merged.insert("sqlOuterLimit".to_string(), json!(limit.saturating_add(1)));
        }
        payload["context"] = Value::Object(merged);
    }

    payload
}

/// One native query of a structured plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryExplanation {
    pub query: Value,
    #[serde(default)]
    pub signature: Vec<SignatureColumn>,
    #[serde(default)]
    pub column_mappings: Vec<ColumnMapping>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureColumn {
    pub name: String,
    #[serde(rename = "type", default)]
    pub column_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    pub query_column: String,
    pub output_column: String,
}

/// A plan as returned by the explain query.
#[derive(Debug, Clone, PartialEq)]
pub enum ExplainPlan {
    Structured(Vec<QueryExplanation>),
    Text(String),
}

/// Read the plan out of the explain query's result rows (`rows[0].PLAN`).
pub fn parse_explain_result(rows: &Value) -> Result<ExplainPlan, QueryError> {
    let plan = rows
        .get(0)
        .and_then(|row| row.get("PLAN"))
        .and_then(Value::as_str)
        .ok_or_else(|| QueryError::ExplainResult(format!("no PLAN in {rows}")))?;

    Ok(match serde_json::from_str::<Vec<QueryExplanation>>(plan) {
        Ok(explanations) => ExplainPlan::Structured(explanations),
        Err(e) => {
            tracing::debug!(error = %e, "Plan is not structured, keeping text");
            ExplainPlan::Text(plan.to_string())
        }
    })
}

/// `queryColumn::type → outputColumn` for every mapping, comma separated.
pub fn format_column_mappings_and_signature(explanation: &QueryExplanation) -> String {
    explanation
        .column_mappings
        .iter()
        .map(|mapping| {
            let column_type = explanation
                .signature
                .iter()
                .find(|s| s.name == mapping.query_column)
                .and_then(|s| s.column_type.as_deref());
            match column_type {
                Some(t) => format!("{}::{} → {}", mapping.query_column, t, mapping.output_column),
                None => format!("{} → {}", mapping.query_column, mapping.output_column),
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_wrap_in_explain() {
        assert_eq!(
            wrap_in_explain_if_needed("SELECT * FROM wiki;  "),
            "EXPLAIN PLAN FOR SELECT * FROM wiki"
        );
        assert_eq!(
            wrap_in_explain_if_needed("explain plan for SELECT 1"),
            "explain plan for SELECT 1"
        );
        assert_eq!(
            wrap_in_explain_if_needed("SELECT explained FROM t"),
            "EXPLAIN PLAN FOR SELECT explained FROM t"
        );
        assert_eq!(
            wrap_in_explain_if_needed("EXPLAINED"),
            "EXPLAIN PLAN FOR EXPLAINED"
        );
    }

    #[test]
    fn test_payload_without_context() {
        let payload = explain_payload("SELECT 1", &Map::new(), None, None);
        assert_eq!(payload, json!({ "query": "EXPLAIN PLAN FOR SELECT 1" }));
    }

    #[test]
    fn test_payload_merges_contexts() {
        let context = map(json!({ "timeout": 10, "priority": 1 }));
        let mandatory = map(json!({ "priority": 5 }));
        let payload = explain_payload("SELECT 1", &context, Some(&mandatory), Some(100));
        assert_eq!(
            payload,
            json!({
                "query": "EXPLAIN PLAN FOR SELECT 1",
                "context": {
                    "timeout": 10,
                    "priority": 5,
                    "useNativeQueryExplain": true,
                    "sqlOuterLimit": 101
                }
            })
        );
    }

    #[test]
    fn test_payload_with_wrap_limit_only() {
        let payload = explain_payload("SELECT 1", &Map::new(), None, Some(0));
        assert_eq!(
            payload["context"],
            json!({ "useNativeQueryExplain": true, "sqlOuterLimit": 1 })
        );
    }

    #[test]
    fn test_parse_structured_plan() {
        let plan = json!([{
            "query": { "queryType": "scan", "dataSource": "wiki" },
            "signature": [{ "name": "page", "type": "STRING" }, { "name": "v0" }],
            "columnMappings": [
                { "queryColumn": "page", "outputColumn": "page" },
                { "queryColumn": "v0", "outputColumn": "Count" }
            ]
        }]);
        let rows = json!([{ "PLAN": plan.to_string() }]);

        let ExplainPlan::Structured(explanations) = parse_explain_result(&rows).unwrap() else {
            panic!("expected a structured plan");
        };
        assert_eq!(explanations.len(), 1);
        assert_eq!(
            format_column_mappings_and_signature(&explanations[0]),
            "page::STRING → page, v0 → Count"
        );
    }

    #[test]
    fn test_parse_text_plan() {
        let rows = json!([{ "PLAN": "DruidQueryRel(query=[...])" }]);
        assert_eq!(
            parse_explain_result(&rows).unwrap(),
            ExplainPlan::Text("DruidQueryRel(query=[...])".to_string())
        );
    }

    #[test]
    fn test_parse_missing_plan() {
        assert!(matches!(
            parse_explain_result(&json!([])),
            Err(QueryError::ExplainResult(_))
        ));
        assert!(matches!(
            parse_explain_result(&json!([{ "PLAN": 3 }])),
            Err(QueryError::ExplainResult(_))
        ));
    }
}
