//! Error types for the query crate.

use thiserror::Error;

/// Errors that can occur while deriving a new query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// SQL parsing failed.
    #[error("failed to parse SQL: {0}")]
    ParseError(String),

    /// The statement parsed, but it is not a plain `SELECT`.
    #[error("not a SELECT query: {statement}")]
    NotASelect { statement: String },

    /// The action needs a current query and there is none.
    #[error("{action} requires a current query")]
    MissingQuery { action: &'static str },

    /// The action needs a join in the current query and there is none.
    #[error("{action} requires a query with a join")]
    MissingJoin { action: &'static str },

    /// An action name that no menu offers.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// The explain endpoint returned something other than a plan.
    #[error("unexpected explain result: {0}")]
    ExplainResult(String),
}

impl From<sqlparser::parser::ParserError> for QueryError {
    fn from(e: sqlparser::parser::ParserError) -> Self {
        QueryError::ParseError(e.to_string())
    }
}
