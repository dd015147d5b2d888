//! Data model errors.

use thiserror::Error;

use super::entity::DataState;

/// Result type for data model operations.
pub type DataResult<T> = Result<T, DataError>;

/// Errors raised by rows, tables and table conversion.
///
/// Duplicate-key inserts are not errors; the new row is dropped.
#[derive(Debug, Error)]
pub enum DataError {
    /// A write to a row whose state forbids edits.
    #[error("cannot set field {field} on a {state} row")]
    InvalidState { field: String, state: DataState },

    /// Source data could not be turned into a table.
    #[error("cannot convert data to table: {0}")]
    Conversion(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DataError {
    /// Check if the error is a write to a deleted row.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, DataError::InvalidState { .. })
    }

    /// Check if the error came from table conversion.
    pub fn is_conversion(&self) -> bool {
        matches!(self, DataError::Conversion(_))
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::Conversion(err.to_string())
    }
}
