//! Column tree state: search input, expansion set, schema selection and the
//! memoized tree.

use std::sync::Arc;

use arbor_core::{ColumnMetadataRow, ConsoleConfig, SearchMode};

use crate::builder::TreeBuilder;
use crate::expansion::ExpansionSet;
use crate::node::TreeNode;

/// Message shown in place of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Loading,
    NoTables,
    NoSearchResults,
}

impl Placeholder {
    pub fn message(&self) -> &'static str {
        match self {
            Placeholder::Loading => "Loading...",
            Placeholder::NoTables => "No tables",
            Placeholder::NoSearchResults => "The search returned no results",
        }
    }
}

/// Key identifying the search inputs of a built tree. Empty when not searching.
pub fn search_hash(search: &str, mode: SearchMode) -> String {
    if search.is_empty() {
        return String::new();
    }
    format!("{}_{}", search.to_lowercase(), mode)
}

struct TreeCache {
    metadata: Arc<[ColumnMetadataRow]>,
    search_hash: String,
    expanded: ExpansionSet,
    tree: Vec<TreeNode>,
}

impl TreeCache {
    fn is_fresh(&self, metadata: &Arc<[ColumnMetadataRow]>, hash: &str, expanded: &ExpansionSet) -> bool {
        Arc::ptr_eq(&self.metadata, metadata)
            && self.search_hash == hash
            && self.expanded.same_as(expanded)
    }
}

/// State behind the column tree panel.
pub struct ColumnTree {
    search_string: String,
    search_mode: SearchMode,
    expanded: ExpansionSet,
    selected_schema: Option<usize>,
    default_schema: Option<String>,
    highlight_table: Option<String>,
    max_search_length: usize,
    cache: Option<TreeCache>,
}

impl ColumnTree {
    pub fn new(config: &ConsoleConfig) -> Self {
        Self {
            search_string: String::new(),
            search_mode: SearchMode::default(),
            expanded: ExpansionSet::from_tables(config.default_tables.iter().cloned()),
            selected_schema: None,
            default_schema: config.default_schema.clone(),
            highlight_table: config.highlight_table.clone(),
            max_search_length: config.max_search_length,
            cache: None,
        }
    }

    pub fn search_string(&self) -> &str {
        &self.search_string
    }

    pub fn search_mode(&self) -> SearchMode {
        self.search_mode
    }

    pub fn is_searching(&self) -> bool {
        !self.search_string.is_empty()
    }

    pub fn expanded(&self) -> &ExpansionSet {
        &self.expanded
    }

    /// Update the search input, truncated to the configured length.
    pub fn set_search(&mut self, search: &str) {
        self.search_string = search.chars().take(self.max_search_length).collect();
    }

    pub fn clear_search(&mut self) {
        self.search_string.clear();
    }

    pub fn set_search_mode(&mut self, mode: SearchMode) {
        self.search_mode = mode;
    }

    pub fn expand(&mut self, table: &str) {
        self.expanded = self.expanded.with_expanded(table);
    }

    pub fn collapse(&mut self, table: &str) {
        self.expanded = self.expanded.with_collapsed(table);
    }

    /// Rebuild the tree if the metadata, the search or the expansion set
    /// changed since the last build. Returns whether a rebuild happened.
    pub fn refresh(&mut self, metadata: &Arc<[ColumnMetadataRow]>) -> bool {
        let hash = search_hash(&self.search_string, self.search_mode);

        if let Some(cache) = &self.cache
            && cache.is_fresh(metadata, &hash, &self.expanded)
        {
            tracing::trace!("Column tree inputs unchanged, reusing cached tree");
            return false;
        }

        let tree = TreeBuilder::new(metadata)
            .search(&self.search_string, self.search_mode)
            .expanded(&self.expanded)
            .highlight(self.highlight_table.as_deref())
            .build();

        self.selected_schema = self
            .default_schema
            .as_deref()
            .and_then(|schema| tree.iter().position(|n| n.id == schema));

        tracing::debug!(
            rows = metadata.len(),
            schemas = tree.len(),
            search = %hash,
            expanded = self.expanded.len(),
            "Rebuilt column tree"
        );

        self.cache = Some(TreeCache {
            metadata: Arc::clone(metadata),
            search_hash: hash,
            expanded: self.expanded.clone(),
            tree,
        });
        true
    }

    /// The whole tree as of the last refresh.
    pub fn tree(&self) -> &[TreeNode] {
        self.cache.as_ref().map(|c| c.tree.as_slice()).unwrap_or(&[])
    }

    /// Schema names for the schema selector.
    pub fn schemas(&self) -> Vec<&str> {
        self.tree().iter().map(|n| n.label.as_str()).collect()
    }

    pub fn selected_schema(&self) -> Option<usize> {
        self.selected_schema
    }

    /// Select a schema by index. Out of range indexes are ignored.
    pub fn select_schema(&mut self, index: usize) -> bool {
        if index < self.tree().len() {
            self.selected_schema = Some(index);
            true
        } else {
            tracing::warn!(index, schemas = self.tree().len(), "Schema index out of range");
            false
        }
    }

    /// Tables of the selected schema, or of the first schema when none is selected.
    pub fn current_subtree(&self) -> &[TreeNode] {
        self.tree()
            .get(self.selected_schema.unwrap_or(0))
            .map(|schema| schema.children.as_slice())
            .unwrap_or(&[])
    }

    /// What to show instead of the tree, if anything.
    pub fn placeholder(&self, loading: bool) -> Option<Placeholder> {
        if self.cache.is_none() {
            return loading.then_some(Placeholder::Loading);
        }
        if !self.current_subtree().is_empty() {
            return None;
        }
        if self.is_searching() {
            Some(Placeholder::NoSearchResults)
        } else {
            Some(Placeholder::NoTables)
        }
    }
}
