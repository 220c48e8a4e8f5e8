//! # arbor-query
//!
//! Click-driven SQL rewriting for the column browser.
//!
//! A click on a table or column menu entry takes the query currently in the
//! editor (if any) and derives a new one:
//!
//! ```text
//! click "Show: page" on druid.wiki
//!     -> SELECT page, COUNT(*) AS "Count" FROM wiki GROUP BY 1 ORDER BY 2 DESC
//! ```
//!
//! - [`query`]: the parsed [`SqlQuery`] and its structural edits.
//! - [`mutator`]: table and column transforms producing a [`QueryChange`].
//! - [`column_actions`]: aggregates and filters specific to a [`ColumnKind`](arbor_core::ColumnKind).
//! - [`menu`]: which actions a menu offers and how to run them.
//! - [`explain`]: explain-plan request and response helpers.

pub mod column_actions;
pub mod error;
pub mod explain;
pub mod menu;
pub mod mutator;
pub mod query;

pub use column_actions::{AggregateFn, ColumnAction, TimeUnit, column_actions};
pub use error::QueryError;
pub use explain::{
    ExplainPlan, QueryExplanation, explain_payload, format_column_mappings_and_signature,
    parse_explain_result, wrap_in_explain_if_needed,
};
pub use menu::{
    ColumnMenuAction, MenuItem, MenuOutcome, TableAction, apply_column_menu_action,
    apply_table_action, column_menu, table_menu,
};
pub use mutator::{
    COUNT_STAR, ColumnContext, JoinColumns, JoinKind, QueryChange, QueryMutator, TableContext,
    count_expression,
};
pub use query::{SqlQuery, SqlTable, parse_expression, parse_select_item, quote_ident};
