//! Codec configuration.

/// Default key carrying a node's type name.
pub const DEFAULT_TYPE_KEY: &str = "$type";

/// Default key carrying an entity's identifier.
pub const DEFAULT_ID_KEY: &str = "id";

/// Codec options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Reserved object key holding the type name.
    pub type_key: String,
    /// Object key holding an entity's identifier, used by graph lookups.
    pub id_key: String,
    /// Pretty-print serialized text.
    pub pretty: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            type_key: DEFAULT_TYPE_KEY.to_string(),
            id_key: DEFAULT_ID_KEY.to_string(),
            pretty: false,
        }
    }
}

impl CodecConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reserved type key.
    pub fn type_key(mut self, key: impl Into<String>) -> Self {
        self.type_key = key.into();
        self
    }

    /// Set the identifier key.
    pub fn id_key(mut self, key: impl Into<String>) -> Self {
        self.id_key = key.into();
        self
    }

    /// Set pretty-printing.
    pub fn pretty(mut self, value: bool) -> Self {
        self.pretty = value;
        self
    }
}
