//! Reduce flat catalog rows into the schema -> table -> column tree.

use std::collections::HashMap;

use arbor_core::{ColumnMetadataRow, SearchMode};

use crate::expansion::ExpansionSet;
use crate::node::TreeNode;

/// Builds a column tree from catalog rows.
///
/// ```
/// use arbor_core::{ColumnMetadataRow, SearchMode};
/// use arbor_tree::{ExpansionSet, TreeBuilder};
///
/// let rows = vec![
///     ColumnMetadataRow::new("druid", "wiki", "page", "VARCHAR"),
///     ColumnMetadataRow::new("druid", "wiki", "__time", "TIMESTAMP"),
/// ];
/// let expanded = ExpansionSet::new();
/// let tree = TreeBuilder::new(&rows)
///     .search("time", SearchMode::ColumnsOnly)
///     .expanded(&expanded)
///     .build();
///
/// assert_eq!(tree[0].children[0].child_ids(), vec!["__time"]);
/// ```
#[derive(Debug, Clone)]
pub struct TreeBuilder<'a> {
    rows: &'a [ColumnMetadataRow],
    search: String,
    mode: SearchMode,
    expanded: Option<&'a ExpansionSet>,
    highlight_table: Option<&'a str>,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(rows: &'a [ColumnMetadataRow]) -> Self {
        Self {
            rows,
            search: String::new(),
            mode: SearchMode::default(),
            expanded: None,
            highlight_table: None,
        }
    }

    pub fn search(mut self, search: &str, mode: SearchMode) -> Self {
        self.search = search.to_lowercase();
        self.mode = mode;
        self
    }

    pub fn expanded(mut self, expanded: &'a ExpansionSet) -> Self {
        self.expanded = Some(expanded);
        self
    }

    pub fn highlight(mut self, table: Option<&'a str>) -> Self {
        self.highlight_table = table;
        self
    }

    pub fn build(&self) -> Vec<TreeNode> {
        let searching = !self.search.is_empty();

        group_stable(self.rows.iter(), |r| r.schema.as_str())
            .into_iter()
            .map(|(schema, schema_rows)| {
                let visible = schema_rows.into_iter().filter(|r| {
                    !searching || self.mode.matches(&r.table, &r.column, &self.search)
                });

                let tables = group_stable(visible, |r| r.table.as_str())
                    .into_iter()
                    .map(|(table, table_rows)| self.table_node(schema, table, &table_rows))
                    .collect();

                TreeNode::schema(schema, tables)
            })
            .collect()
    }

    fn table_node(&self, schema: &str, table: &str, rows: &[&ColumnMetadataRow]) -> TreeNode {
        let columns = rows
            .iter()
            .map(|r| TreeNode::column(schema, table, &r.column, &r.data_type, r.kind.clone()))
            .collect();

        let mut node = TreeNode::table(schema, table, columns, self.is_expanded(table));
        node.highlighted = self.highlight_table == Some(table);
        node
    }

    /// Explicitly expanded tables stay open. While searching, tables are also
    /// opened so matching columns are visible, except when the table name
    /// itself is what matched (and the mode looks at table names).
    fn is_expanded(&self, table: &str) -> bool {
        if self.expanded.is_some_and(|e| e.contains(table)) {
            return true;
        }
        !self.search.is_empty()
            && (self.mode == SearchMode::ColumnsOnly
                || !table.to_lowercase().contains(&self.search))
    }
}

/// Build the tree for `rows` filtered by `search` under `mode`.
pub fn build_tree(
    rows: &[ColumnMetadataRow],
    search: &str,
    mode: SearchMode,
    expanded: &ExpansionSet,
) -> Vec<TreeNode> {
    TreeBuilder::new(rows).search(search, mode).expanded(expanded).build()
}

/// Partition `items` by `key`, keeping groups in first-seen order and items
/// in input order within each group.
fn group_stable<'a, I, F>(items: I, key: F) -> Vec<(&'a str, Vec<&'a ColumnMetadataRow>)>
where
    I: IntoIterator<Item = &'a ColumnMetadataRow>,
    F: Fn(&'a ColumnMetadataRow) -> &'a str,
{
    let mut groups: Vec<(&'a str, Vec<&'a ColumnMetadataRow>)> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();

    for item in items {
        let k = key(item);
        match index.get(k) {
            Some(&i) => groups[i].1.push(item),
            None => {
                index.insert(k, groups.len());
                groups.push((k, vec![item]));
            }
        }
    }

    groups
}
