//! Factory errors.

use thiserror::Error;

use crate::codec::CodecError;

/// Result type for factory operations.
pub type FactoryResult<T> = Result<T, FactoryError>;

/// Boxed error from a host-supplied resolver or proxy handler.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while producing a value from a factory.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// Decoding the text of a text-backed factory failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The module resolver failed.
    #[error(transparent)]
    Module(BoxError),

    /// The module loaded but does not export the symbol.
    #[error("module {path} has no export {symbol}")]
    MissingExport { path: String, symbol: String },

    /// A proxy was called with a method its type does not declare.
    #[error("{type_name} has no method {method}")]
    UnknownMethod { type_name: String, method: String },

    /// The proxy handler failed.
    #[error(transparent)]
    Handler(BoxError),
}

impl FactoryError {
    /// Check if the error came from outside the crate (resolver or handler).
    pub fn is_external(&self) -> bool {
        matches!(self, FactoryError::Module(_) | FactoryError::Handler(_))
    }
}
