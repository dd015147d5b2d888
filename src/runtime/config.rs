//! Runtime configuration.

use crate::codec::{CodecConfig, DEFAULT_ID_KEY, DEFAULT_TYPE_KEY};
use crate::data::DEFAULT_TABLE_NAME;

/// Runtime configuration options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Reserved key naming a serialized object's type.
    pub type_key: String,
    /// Key holding entity ids in plain objects.
    pub id_key: String,
    /// Pretty-print serialized text.
    pub pretty: bool,
    /// Name for converted tables when the caller gives none.
    pub default_table_name: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            type_key: DEFAULT_TYPE_KEY.to_string(),
            id_key: DEFAULT_ID_KEY.to_string(),
            pretty: false,
            default_table_name: DEFAULT_TABLE_NAME.to_string(),
        }
    }
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the type key.
    pub fn type_key(mut self, key: impl Into<String>) -> Self {
        self.type_key = key.into();
        self
    }

    /// Set the id key.
    pub fn id_key(mut self, key: impl Into<String>) -> Self {
        self.id_key = key.into();
        self
    }

    /// Set pretty flag.
    pub fn pretty(mut self, value: bool) -> Self {
        self.pretty = value;
        self
    }

    /// Set the default table name.
    pub fn default_table_name(mut self, name: impl Into<String>) -> Self {
        self.default_table_name = name.into();
        self
    }

    /// The codec options this configuration implies.
    pub fn codec_config(&self) -> CodecConfig {
        CodecConfig::new()
            .type_key(self.type_key.clone())
            .id_key(self.id_key.clone())
            .pretty(self.pretty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.type_key, "$type");
        assert_eq!(config.id_key, "id");
        assert_eq!(config.default_table_name, "table");
        assert_eq!(config.codec_config(), CodecConfig::default());
    }

    #[test]
    fn test_builder() {
        let config = RuntimeConfig::new()
            .type_key("_t")
            .pretty(true)
            .default_table_name("rows");
        let codec = config.codec_config();
        assert_eq!(codec.type_key, "_t");
        assert!(codec.pretty);
        assert_eq!(config.default_table_name, "rows");
    }
}
