//! View filter errors.

use thiserror::Error;

/// Result type for predicate parsing.
pub type PredicateResult<T> = Result<T, PredicateError>;

/// Errors raised while parsing a view filter.
///
/// Evaluation never fails: missing fields read as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredicateError {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("unsupported expression: {0}")]
    Unsupported(String),

    #[error("invalid field reference: {0}")]
    InvalidField(String),
}

impl PredicateError {
    /// Check if the filter text itself is malformed, as opposed to using a
    /// form the filter language does not have.
    pub fn is_syntax(&self) -> bool {
        matches!(self, PredicateError::Syntax(_))
    }
}

impl From<sqlparser::parser::ParserError> for PredicateError {
    fn from(e: sqlparser::parser::ParserError) -> Self {
        PredicateError::Syntax(e.to_string())
    }
}
