//! Tree node types.

use arbor_core::ColumnKind;
use serde::Serialize;

/// What a node in the column tree stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    Schema,
    Table {
        schema: String,
    },
    Column {
        schema: String,
        table: String,
        /// Declared type, shown as the icon tooltip.
        data_type: String,
        kind: ColumnKind,
    },
}

/// A node of the schema -> table -> column tree.
///
/// Nodes are rebuilt from scratch whenever the inputs change and are never
/// patched in place, so two trees can be compared with `==` to decide whether
/// anything needs re-rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
    pub expanded: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub highlighted: bool,
}

impl TreeNode {
    pub fn schema(name: &str, children: Vec<TreeNode>) -> Self {
        Self {
            id: name.to_string(),
            label: name.to_string(),
            kind: NodeKind::Schema,
            children,
            expanded: false,
            highlighted: false,
        }
    }

    pub fn table(schema: &str, name: &str, children: Vec<TreeNode>, expanded: bool) -> Self {
        Self {
            id: name.to_string(),
            label: name.to_string(),
            kind: NodeKind::Table {
                schema: schema.to_string(),
            },
            children,
            expanded,
            highlighted: false,
        }
    }

    pub fn column(schema: &str, table: &str, name: &str, data_type: &str, kind: ColumnKind) -> Self {
        Self {
            id: name.to_string(),
            label: name.to_string(),
            kind: NodeKind::Column {
                schema: schema.to_string(),
                table: table.to_string(),
                data_type: data_type.to_string(),
                kind,
            },
            children: Vec::new(),
            expanded: false,
            highlighted: false,
        }
    }

    /// Find a direct child by id.
    pub fn child(&self, id: &str) -> Option<&TreeNode> {
        self.children.iter().find(|c| c.id == id)
    }

    /// Ids of the direct children, in order.
    pub fn child_ids(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.id.as_str()).collect()
    }

    /// Number of leaves below this node (the node itself when it is a column).
    pub fn leaf_count(&self) -> usize {
        match self.kind {
            NodeKind::Column { .. } => 1,
            _ => self.children.iter().map(TreeNode::leaf_count).sum(),
        }
    }
}
