//! The process-level handle.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use super::config::RuntimeConfig;
use crate::codec::{Codec, CodecError, Node};
use crate::data::{self, DataError, DataTable};
use crate::factory::{self, FactoryError, Ref};
use crate::registry::{AddonType, TypeRegistry};
use crate::remote::{self, RemoteClient, RemoteClientAdapter, RemoteError};
use crate::view::{DataSource, DataView, Filter, PredicateError};

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors from any layer, as seen through the runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("data error: {0}")]
    Data(#[from] DataError),

    #[error("filter error: {0}")]
    Predicate(#[from] PredicateError),

    #[error("factory error: {0}")]
    Factory(#[from] FactoryError),

    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),
}

/// Owns the type registry and the codec built on it.
///
/// Create one at process start with [`Runtime::start`]; it registers the
/// built-in types before anything can look them up. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Runtime {
    config: RuntimeConfig,
    registry: Arc<TypeRegistry>,
    codec: Codec,
}

impl Runtime {
    /// Start with the default configuration.
    pub fn start() -> Self {
        Self::start_with_config(RuntimeConfig::default())
    }

    pub fn start_with_config(config: RuntimeConfig) -> Self {
        let registry = Arc::new(TypeRegistry::new());
        data::register_types(&registry);
        factory::register_types(&registry);
        remote::register_types(&registry);

        let codec = Codec::with_config(Arc::clone(&registry), config.codec_config());
        tracing::debug!(types = registry.len(), "runtime started");

        Self {
            config,
            registry,
            codec,
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Register an application type.
    pub fn register_type<T: AddonType>(&self) -> &Self {
        self.registry.register_type::<T>();
        self
    }

    pub fn serialize(&self, root: &Node) -> RuntimeResult<String> {
        Ok(self.codec.serialize(root)?)
    }

    pub fn deserialize(&self, text: &str) -> RuntimeResult<Option<Node>> {
        Ok(self.codec.deserialize(text)?)
    }

    pub fn deserialize_as<T: AddonType>(&self, text: &str) -> RuntimeResult<Option<T>> {
        Ok(self.codec.deserialize_as::<T>(text)?)
    }

    /// Resolve a value-or-factory.
    pub fn resolve(&self, value: &Ref) -> RuntimeResult<Option<Node>> {
        Ok(value.resolve(&self.codec)?)
    }

    /// Convert plain records to a table, named after the configured
    /// default when `name` is `None`.
    pub fn convert_table<I, S>(
        &self,
        records: &Value,
        name: Option<&str>,
        primary_key_fields: I,
    ) -> RuntimeResult<Option<DataTable>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.unwrap_or(&self.config.default_table_name);
        Ok(data::json_convert_table(records, Some(name), primary_key_fields)?)
    }

    /// Read a JSON file of records into a table.
    pub fn load_table<P, I, S>(
        &self,
        path: P,
        name: Option<&str>,
        primary_key_fields: I,
    ) -> RuntimeResult<Option<DataTable>>
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.unwrap_or(&self.config.default_table_name);
        Ok(data::load_table_file(path, Some(name), primary_key_fields)?)
    }

    /// A pull view over `source`, filtered by `filter` text.
    pub fn view(&self, source: Arc<dyn DataSource>, filter: &str) -> RuntimeResult<DataView> {
        let name = source.data_name();
        Ok(DataView::new(name, Filter::parse(filter)?, Some(source)))
    }

    /// A remote client using this runtime's codec.
    pub fn remote_client(&self, adapter: Arc<dyn RemoteClientAdapter>) -> RemoteClient {
        RemoteClient::new(adapter, self.codec.clone())
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::start()
    }
}
