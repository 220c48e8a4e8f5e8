//! Tables the user has explicitly expanded.

use std::collections::BTreeSet;
use std::sync::Arc;

/// A copy-on-write set of expanded table names.
///
/// Every change produces a new set with a new identity; the tree cache uses
/// [`ExpansionSet::same_as`] to tell whether it has to rebuild.
#[derive(Debug, Clone, Default)]
pub struct ExpansionSet {
    tables: Arc<BTreeSet<String>>,
}

impl ExpansionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tables<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tables: Arc::new(tables.into_iter().map(Into::into).collect()),
        }
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains(table)
    }

    /// A new set with `table` added.
    pub fn with_expanded(&self, table: &str) -> Self {
        let mut tables = (*self.tables).clone();
        tables.insert(table.to_string());
        Self {
            tables: Arc::new(tables),
        }
    }

    /// A new set with `table` removed.
    pub fn with_collapsed(&self, table: &str) -> Self {
        let mut tables = (*self.tables).clone();
        tables.remove(table);
        Self {
            tables: Arc::new(tables),
        }
    }

    /// Reference identity, not content equality.
    pub fn same_as(&self, other: &ExpansionSet) -> bool {
        Arc::ptr_eq(&self.tables, &other.tables)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(String::as_str)
    }
}

impl PartialEq for ExpansionSet {
    fn eq(&self, other: &Self) -> bool {
        self.tables == other.tables
    }
}

impl Eq for ExpansionSet {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changes_produce_new_identity() {
        let empty = ExpansionSet::new();
        let one = empty.with_expanded("wiki");

        assert!(!empty.contains("wiki"));
        assert!(one.contains("wiki"));
        assert!(!one.same_as(&empty));
        assert!(one.same_as(&one.clone()));
    }

    #[test]
    fn test_collapse() {
        let set = ExpansionSet::from_tables(["wiki", "koalas"]);
        let collapsed = set.with_collapsed("wiki");

        assert_eq!(collapsed.iter().collect::<Vec<_>>(), vec!["koalas"]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_content_equality_ignores_identity() {
        let a = ExpansionSet::from_tables(["wiki"]);
        let b = ExpansionSet::new().with_expanded("wiki");
        assert_eq!(a, b);
        assert!(!a.same_as(&b));
    }
}
