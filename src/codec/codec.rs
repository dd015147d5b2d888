//! Text serialization of typed object graphs.

use std::sync::Arc;

use serde_json::Value;

use super::config::CodecConfig;
use super::error::{CodecError, CodecResult};
use super::node::Node;
use super::tagger::TypeTagger;
use crate::registry::{Addon, AddonType, TypeRegistry};

/// Serializer and deserializer bound to one registry.
///
/// Cheap to clone: the registry is shared.
#[derive(Debug, Clone)]
pub struct Codec {
    registry: Arc<TypeRegistry>,
    config: CodecConfig,
}

impl Codec {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self::with_config(registry, CodecConfig::default())
    }

    pub fn with_config(registry: Arc<TypeRegistry>, config: CodecConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn tagger(&self) -> TypeTagger<'_> {
        TypeTagger::new(&self.registry, &self.config.type_key)
    }

    /// Tagged JSON form of a graph.
    pub fn tag_graph(&self, root: &Node) -> CodecResult<Value> {
        self.tagger().tag(root)
    }

    /// Tag a graph and encode it as JSON text.
    pub fn serialize(&self, root: &Node) -> CodecResult<String> {
        let value = self.tag_graph(root)?;
        self.encode(&value)
    }

    /// Tag one typed value and encode it as JSON text.
    pub fn serialize_addon(&self, value: &dyn Addon) -> CodecResult<String> {
        let value = self.tagger().tag_addon(value)?;
        self.encode(&value)
    }

    /// Decode JSON text and rebuild every tagged node.
    ///
    /// Empty text and `null` give `None`.
    pub fn deserialize(&self, text: &str) -> CodecResult<Option<Node>> {
        match Self::decode(text)? {
            Some(value) => self.untag(value).map(Some),
            None => Ok(None),
        }
    }

    /// Decode JSON text and build the root as `T`, whatever its tag says.
    pub fn deserialize_as<T: AddonType>(&self, text: &str) -> CodecResult<Option<T>> {
        match Self::decode(text)? {
            Some(value) => self.tagger().untag_as::<T>(value).map(Some),
            None => Ok(None),
        }
    }

    /// Rebuild tagged nodes in an already decoded value.
    pub fn untag(&self, value: Value) -> CodecResult<Node> {
        self.tagger().untag(value)
    }

    fn encode(&self, value: &Value) -> CodecResult<String> {
        if self.config.pretty {
            serde_json::to_string_pretty(value).map_err(CodecError::Encode)
        } else {
            serde_json::to_string(value).map_err(CodecError::Encode)
        }
    }

    fn decode(text: &str) -> CodecResult<Option<Value>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        match serde_json::from_str(text).map_err(CodecError::Decode)? {
            Value::Null => Ok(None),
            value => Ok(Some(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Note {
        text: String,
        #[serde(default)]
        tags: Vec<String>,
    }

    crate::addon!(Note { name: "Note", });

    fn codec() -> Codec {
        let registry = TypeRegistry::new();
        registry.register_type::<Note>();
        Codec::new(Arc::new(registry))
    }

    #[test]
    fn test_serialize_writes_type_key() {
        let codec = codec();
        let text = codec
            .serialize_addon(&Note { text: "hi".into(), tags: vec![] })
            .unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, json!({"text": "hi", "tags": [], "$type": "Note"}));
    }

    #[test]
    fn test_round_trip_inside_untyped_graph() {
        let codec = codec();
        let mut root = Node::object();
        root.insert("count", Node::from(2));
        root.insert(
            "notes",
            Node::Array(vec![
                Node::typed(Note { text: "a".into(), tags: vec!["x".into()] }),
                Node::typed(Note { text: "b".into(), tags: vec![] }),
            ]),
        );

        let text = codec.serialize(&root).unwrap();
        let back = codec.deserialize(&text).unwrap().unwrap();
        assert_eq!(back, root);

        let notes = back.get("notes").and_then(Node::as_array).unwrap();
        assert_eq!(notes[0].downcast_ref::<Note>().unwrap().tags, vec!["x".to_string()]);
    }

    #[test]
    fn test_empty_and_null_input() {
        let codec = codec();
        assert!(codec.deserialize("").unwrap().is_none());
        assert!(codec.deserialize("   ").unwrap().is_none());
        assert!(codec.deserialize("null").unwrap().is_none());
        assert!(codec.deserialize_as::<Note>("").unwrap().is_none());
    }

    #[test]
    fn test_malformed_text_is_decode_error() {
        let codec = codec();
        assert!(codec.deserialize("{\"text\":").unwrap_err().is_decode());
    }

    #[test]
    fn test_deserialize_as_ignores_tag() {
        let codec = codec();
        let note = codec
            .deserialize_as::<Note>(r#"{"$type": "Something", "text": "forced"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(note, Note { text: "forced".into(), tags: vec![] });
    }

    #[test]
    fn test_custom_type_key_and_pretty() {
        let registry = TypeRegistry::new();
        registry.register_type::<Note>();
        let config = CodecConfig::new().type_key("__kind").pretty(true);
        let codec = Codec::with_config(Arc::new(registry), config);

        let text = codec.serialize(&Node::typed(Note::default())).unwrap();
        assert!(text.contains('\n'));
        assert!(text.contains("\"__kind\": \"Note\""));
        assert!(codec.deserialize(&text).unwrap().unwrap().is_typed());
    }
}
