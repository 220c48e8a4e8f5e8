//! `arbor tree` command implementation.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use arbor_core::{ColumnMetadataRow, SearchMode};
use arbor_tree::{ColumnTree, NodeKind, Placeholder, TreeNode};

use super::Session;

pub struct TreeOptions {
    pub search: String,
    pub mode: SearchMode,
    pub expand: Vec<String>,
    pub schema: Option<String>,
    pub json: bool,
}

pub fn run(metadata: &Path, config: Option<&Path>, options: TreeOptions) -> Result<()> {
    let session = Session::load(metadata, config)?;
    let rows: Arc<[ColumnMetadataRow]> = session.rows.into();

    let mut tree = ColumnTree::new(&session.config);
    tree.set_search_mode(options.mode);
    tree.set_search(&options.search);
    for table in &options.expand {
        tree.expand(table);
    }
    tree.refresh(&rows);

    if let Some(schema) = &options.schema {
        let index = tree
            .schemas()
            .iter()
            .position(|s| *s == schema.as_str())
            .with_context(|| format!("Schema not found: {schema}"))?;
        tree.select_schema(index);
    }

    let placeholder = match &options.schema {
        Some(_) => tree.placeholder(false),
        None if tree.tree().iter().all(|schema| schema.children.is_empty()) => {
            Some(if tree.is_searching() {
                Placeholder::NoSearchResults
            } else {
                Placeholder::NoTables
            })
        }
        None => None,
    };
    if let Some(placeholder) = placeholder {
        println!("{}", placeholder.message());
        return Ok(());
    }

    let nodes = match options.schema {
        Some(_) => tree.current_subtree(),
        None => tree.tree(),
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(nodes)?);
    } else {
        print!("{}", render(nodes));
    }
    Ok(())
}

/// Render nodes as an indented box-drawing tree. Collapsed tables hide their
/// columns.
pub fn render(nodes: &[TreeNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        out.push_str(&node_label(node));
        out.push('\n');
        render_children(node, "", &mut out);
    }
    out
}

fn render_children(node: &TreeNode, prefix: &str, out: &mut String) {
    if matches!(node.kind, NodeKind::Table { .. }) && !node.expanded {
        return;
    }

    let count = node.children.len();
    for (i, child) in node.children.iter().enumerate() {
        let last = i + 1 == count;
        out.push_str(prefix);
        out.push_str(if last { "└── " } else { "├── " });
        out.push_str(&node_label(child));
        out.push('\n');

        let nested = format!("{prefix}{}", if last { "    " } else { "│   " });
        render_children(child, &nested, out);
    }
}

fn node_label(node: &TreeNode) -> String {
    match &node.kind {
        NodeKind::Schema => node.label.clone(),
        NodeKind::Table { .. } => {
            let marker = if node.expanded { "▾" } else { "▸" };
            let highlight = if node.highlighted { " *" } else { "" };
            format!("{marker} {}{highlight}", node.label)
        }
        NodeKind::Column { data_type, .. } => format!("{} ({data_type})", node.label),
    }
}
