//! Remote call errors.

use thiserror::Error;

use crate::codec::CodecError;
use crate::factory::BoxError;

/// Result type for remote calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors raised by a remote call.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Encoding the request or decoding the response failed.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// The transport adapter reported a failure.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),
}

impl RemoteError {
    /// Check if the failure happened in the transport, not the payload.
    pub fn is_transport(&self) -> bool {
        matches!(self, RemoteError::Transport(_))
    }
}
