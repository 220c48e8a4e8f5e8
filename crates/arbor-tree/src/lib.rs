//! # arbor-tree
//!
//! Turns the flat catalog (`schema, table, column, type` rows) into the tree
//! shown in the column browser:
//!
//! ```text
//! druid                 <- schema, first-seen order
//! ├── wikipedia         <- table, expanded per ExpansionSet / search
//! │   ├── __time        <- column leaf, carries its ColumnKind
//! │   └── page
//! └── koalas
//! ```
//!
//! Grouping is stable: schemas, tables and columns keep the order in which the
//! catalog reported them. Searching filters rows by a case-insensitive
//! substring according to the [`SearchMode`](arbor_core::SearchMode).

pub mod builder;
pub mod expansion;
pub mod node;
pub mod state;

pub use builder::{TreeBuilder, build_tree};
pub use expansion::ExpansionSet;
pub use node::{NodeKind, TreeNode};
pub use state::{ColumnTree, Placeholder, search_hash};
