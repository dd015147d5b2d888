//! Remote service calls.
//!
//! The crate builds and serializes the request envelope and rebuilds the
//! typed values in the response. Moving the bytes is left to a host-supplied
//! [`RemoteClientAdapter`].

mod client;
mod error;
mod service;

pub use client::{RemoteClient, RemoteClientAdapter, RemoteRequest};
pub use error::{RemoteError, RemoteResult};
pub use service::{RemoteService, RemoteSystem};

use crate::registry::TypeRegistry;

/// Register the remote service description types.
pub fn register_types(registry: &TypeRegistry) {
    registry.register_type::<RemoteSystem>();
    registry.register_type::<RemoteService>();
}
