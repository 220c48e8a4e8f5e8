//! Runs the `arbor` binary against a metadata file on disk.
//!
//! Run with: cargo test --package arbor --test cli

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const METADATA: &str = r#"[
  {"TABLE_SCHEMA": "druid", "TABLE_NAME": "wiki", "COLUMN_NAME": "__time", "DATA_TYPE": "TIMESTAMP"},
  {"TABLE_SCHEMA": "druid", "TABLE_NAME": "wiki", "COLUMN_NAME": "page", "DATA_TYPE": "VARCHAR"},
  {"TABLE_SCHEMA": "druid", "TABLE_NAME": "wiki", "COLUMN_NAME": "added", "DATA_TYPE": "BIGINT"},
  {"TABLE_SCHEMA": "lookup", "TABLE_NAME": "countries", "COLUMN_NAME": "k", "DATA_TYPE": "VARCHAR"},
  {"TABLE_SCHEMA": "lookup", "TABLE_NAME": "countries", "COLUMN_NAME": "v", "DATA_TYPE": "VARCHAR"}
]"#;

struct Fixture {
    _dir: TempDir,
    metadata: PathBuf,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let metadata = dir.path().join("metadata.json");
    fs::write(&metadata, METADATA).unwrap();
    Fixture {
        _dir: dir,
        metadata,
    }
}

fn arbor(args: &[&str], metadata: Option<&Path>) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_arbor"));
    cmd.env_remove("RUST_LOG").env_remove("ARBOR_CONFIG");
    if let Some((first, rest)) = args.split_first() {
        cmd.arg(first);
        if let Some(path) = metadata {
            cmd.arg(path);
        }
        cmd.args(rest);
    }
    cmd.output().unwrap()
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "arbor failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn test_tree() {
    let f = fixture();
    let out = stdout(&arbor(&["tree", "--expand", "wiki"], Some(&f.metadata)));
    assert_eq!(
        out,
        "druid\n\
         └── ▾ wiki\n\
         \x20   ├── __time (TIMESTAMP)\n\
         \x20   ├── page (VARCHAR)\n\
         \x20   └── added (BIGINT)\n\
         lookup\n\
         └── ▸ countries\n"
    );
}

#[test]
fn test_tree_search_without_results() {
    let f = fixture();
    let out = stdout(&arbor(&["tree", "--search", "nothing"], Some(&f.metadata)));
    assert_eq!(out.trim(), "The search returned no results");
}

#[test]
fn test_show_column() {
    let f = fixture();
    let out = stdout(&arbor(&["show-column", "wiki", "page"], Some(&f.metadata)));
    assert_eq!(
        out.trim(),
        r#"SELECT page, COUNT(*) AS "Count" FROM wiki GROUP BY 1 ORDER BY 2 DESC"#
    );
}

#[test]
fn test_table_action_join_as_json() {
    let f = fixture();
    let out = stdout(&arbor(
        &[
            "table-action",
            "lookup.countries",
            "left-join",
            "--query",
            "SELECT * FROM wiki",
            "--json",
        ],
        Some(&f.metadata),
    ));
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["run"], false);
    assert_eq!(
        value["query"],
        "SELECT * FROM wiki LEFT JOIN lookup.countries ON lookup.countries.k = wiki.XXX"
    );
}

#[test]
fn test_column_action() {
    let f = fixture();
    let out = stdout(&arbor(
        &[
            "column-action",
            "wiki",
            "added",
            "sum",
            "--query",
            "SELECT page FROM wiki GROUP BY 1",
        ],
        Some(&f.metadata),
    ));
    assert_eq!(
        out.trim(),
        r#"SELECT page, SUM(added) AS "sum_added" FROM wiki GROUP BY 1"#
    );
}

#[test]
fn test_menu_lists_labels() {
    let f = fixture();
    let out = stdout(&arbor(&["menu", "wiki"], Some(&f.metadata)));
    assert!(out.contains("select-star"));
    assert!(out.contains("SELECT * FROM wiki"));
    assert!(!out.contains("replace-from"));
}

#[test]
fn test_unknown_action_fails() {
    let f = fixture();
    let output = arbor(&["table-action", "wiki", "drop-table"], Some(&f.metadata));
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown action"));
}

#[test]
fn test_missing_query_fails() {
    let f = fixture();
    let output = arbor(&["table-action", "wiki", "remove-join"], Some(&f.metadata));
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("requires a current query"));
}

#[test]
fn test_config_file_is_applied() {
    let f = fixture();
    let config = f._dir.path().join("arbor.yaml");
    fs::write(&config, "default_where: \"page = 'Main'\"\n").unwrap();

    let out = stdout(&arbor(
        &[
            "table-action",
            "wiki",
            "select-star",
            "--config",
            config.to_str().unwrap(),
        ],
        Some(&f.metadata),
    ));
    assert_eq!(out.trim(), "SELECT * FROM wiki WHERE page = 'Main'");
}

#[test]
fn test_explain_payload() {
    let out = stdout(&arbor(
        &["explain", "SELECT * FROM wiki;", "--wrap-limit", "100"],
        None,
    ));
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["query"], "EXPLAIN PLAN FOR SELECT * FROM wiki");
    assert_eq!(value["context"]["sqlOuterLimit"], 101);
    assert_eq!(value["context"]["useNativeQueryExplain"], true);
}
