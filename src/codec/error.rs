//! Codec errors.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised while tagging, encoding or decoding a graph.
///
/// Unknown type tags are not errors; such nodes decode as untyped values.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A value could not be turned into JSON.
    #[error("encode error: {0}")]
    Encode(#[source] serde_json::Error),

    /// The input text is not valid JSON.
    #[error("decode error: {0}")]
    Decode(#[source] serde_json::Error),

    /// A registered type rejected the shape of a tagged node.
    #[error("cannot construct {type_name}: {message}")]
    Construct { type_name: String, message: String },

    /// A typed value returned another typed value as its structure.
    #[error("{0} did not produce a structural node")]
    NotStructural(String),
}

impl CodecError {
    /// Check if the error came from malformed input text.
    pub fn is_decode(&self) -> bool {
        matches!(self, CodecError::Decode(_))
    }
}
