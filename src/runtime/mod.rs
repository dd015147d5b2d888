//! Process start and configuration.

mod config;
mod runtime;

pub use config::RuntimeConfig;
pub use runtime::{Runtime, RuntimeError, RuntimeResult};
