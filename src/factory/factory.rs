//! Values that may be produced on demand.

use serde::{Deserialize, Serialize};

use super::error::FactoryResult;
use super::lazy::LazyFactory;
use super::proxy::ProxyFactory;
use crate::codec::{Codec, CodecResult, Node};

/// A value, or a factory that produces one.
#[derive(Debug, Clone)]
pub enum Ref {
    Value(Node),
    Factory(Factory),
}

impl Ref {
    pub fn is_factory(&self) -> bool {
        matches!(self, Ref::Factory(_))
    }

    /// The value itself, or whatever the factory produces.
    pub fn resolve(&self, codec: &Codec) -> FactoryResult<Option<Node>> {
        match self {
            Ref::Value(node) => Ok(Some(node.clone())),
            Ref::Factory(factory) => factory.get_value(codec),
        }
    }
}

impl From<Node> for Ref {
    fn from(node: Node) -> Self {
        Ref::Value(node)
    }
}

impl From<Factory> for Ref {
    fn from(factory: Factory) -> Self {
        Ref::Factory(factory)
    }
}

/// Strategies for producing a value.
#[derive(Debug, Clone)]
pub enum Factory {
    /// Hands back the wrapped value unchanged.
    Object(Node),
    /// Builds a proxy for a type.
    Proxy(ProxyFactory),
    /// Decodes serialized text.
    Json(JsonFactory),
    /// Finds a descendant by id.
    Addon(AddonFactory),
    /// Loads a module export on first use.
    Lazy(LazyFactory),
}

impl Factory {
    /// Produce the value. `None` when there is nothing to produce: empty
    /// text, or no node with the wanted id.
    pub fn get_value(&self, codec: &Codec) -> FactoryResult<Option<Node>> {
        match self {
            Factory::Object(node) => Ok(Some(node.clone())),
            Factory::Proxy(factory) => Ok(Some(Node::typed(factory.build()))),
            Factory::Json(factory) => Ok(factory.get_value(codec)?),
            Factory::Addon(factory) => Ok(factory.get_value(&codec.config().id_key)?),
            Factory::Lazy(factory) => factory.load().map(Some),
        }
    }
}

/// Holds serialized text and decodes it when asked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonFactory {
    text: String,
}

crate::addon!(JsonFactory {
    name: "JsonFactory",
    label: "Serialized value",
});

impl JsonFactory {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn get_value(&self, codec: &Codec) -> CodecResult<Option<Node>> {
        codec.deserialize(&self.text)
    }
}

/// Looks up a node by id inside a graph.
#[derive(Debug, Clone)]
pub struct AddonFactory {
    root: Node,
    id: String,
}

impl AddonFactory {
    pub fn new(root: Node, id: impl Into<String>) -> Self {
        Self { root, id: id.into() }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get_value(&self, id_key: &str) -> CodecResult<Option<Node>> {
        find_addon_by_id(&self.root, &self.id, id_key)
    }
}

/// Depth-first search for the first node whose id is `id`.
///
/// A node is checked before its children. Typed values match on their
/// declared id and are searched through their structural form; plain
/// objects match on their `id_key` field.
pub fn find_addon_by_id(node: &Node, id: &str, id_key: &str) -> CodecResult<Option<Node>> {
    match node {
        Node::Typed(addon) => {
            if addon.addon_id() == Some(id) {
                return Ok(Some(node.clone()));
            }
            find_addon_by_id(&addon.to_node()?, id, id_key)
        }
        Node::Object(map) => {
            if map.get(id_key).and_then(Node::as_str) == Some(id) {
                return Ok(Some(node.clone()));
            }
            for child in map.values() {
                if let Some(found) = find_addon_by_id(child, id, id_key)? {
                    return Ok(Some(found));
                }
            }
            Ok(None)
        }
        Node::Array(items) => {
            for item in items {
                if let Some(found) = find_addon_by_id(item, id, id_key)? {
                    return Ok(Some(found));
                }
            }
            Ok(None)
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{self, DataEntity, DataTable};
    use crate::factory::StaticModules;
    use crate::registry::TypeRegistry;
    use serde_json::json;
    use std::sync::Arc;

    fn codec() -> Codec {
        let registry = TypeRegistry::new();
        data::register_types(&registry);
        Codec::new(Arc::new(registry))
    }

    #[test]
    fn test_value_ref() {
        let value = Ref::from(Node::from("plain"));
        assert!(!value.is_factory());
        assert_eq!(value.resolve(&codec()).unwrap(), Some(Node::from("plain")));
    }

    #[test]
    fn test_object_factory() {
        let factory = Ref::from(Factory::Object(Node::from(7)));
        assert!(factory.is_factory());
        assert_eq!(factory.resolve(&codec()).unwrap(), Some(Node::from(7)));
    }

    #[test]
    fn test_json_factory_decodes_on_demand() {
        let codec = codec();
        let text = codec.serialize(&Node::typed(DataTable::new("orders"))).unwrap();

        let node = Factory::Json(JsonFactory::new(text)).get_value(&codec).unwrap().unwrap();
        assert_eq!(node.downcast_ref::<DataTable>().unwrap().name(), "orders");

        assert!(Factory::Json(JsonFactory::default()).get_value(&codec).unwrap().is_none());
        assert!(Factory::Json(JsonFactory::new("{")).get_value(&codec).is_err());
    }

    #[test]
    fn test_factories_survive_round_trip() {
        let registry = TypeRegistry::new();
        data::register_types(&registry);
        crate::factory::register_types(&registry);
        let codec = Codec::new(Arc::new(registry));

        let modules = Arc::new(StaticModules::new());
        modules.insert("m", "answer", Node::from(42));
        let table_text = codec.serialize(&Node::typed(DataTable::new("orders"))).unwrap();

        let mut root = Node::object();
        root.insert("source", Node::typed(JsonFactory::new(table_text)));
        root.insert("answer", Node::typed(LazyFactory::new("m", "answer", modules.clone())));

        let text = codec.serialize(&root).unwrap();
        let back = codec.deserialize(&text).unwrap().unwrap();

        let source = back.get("source").and_then(|n| n.downcast_ref::<JsonFactory>()).unwrap();
        let table = source.get_value(&codec).unwrap().unwrap();
        assert_eq!(table.downcast_ref::<DataTable>().unwrap().name(), "orders");

        let answer = back.get("answer").and_then(|n| n.downcast_ref::<LazyFactory>()).unwrap();
        assert_eq!(answer.path(), "m");
        let loaded = answer.clone().with_resolver(modules).load().unwrap();
        assert_eq!(loaded, Node::from(42));
    }

    #[test]
    fn test_find_by_id_in_plain_graph() {
        let root = Node::from(json!({
            "a": {"id": "x", "items": [{"id": "target", "v": 1}]},
            "b": [{"id": "target", "v": 2}]
        }));
        let found = find_addon_by_id(&root, "target", "id").unwrap().unwrap();
        assert_eq!(found.to_value().unwrap(), json!({"id": "target", "v": 1}));
        assert!(find_addon_by_id(&root, "nope", "id").unwrap().is_none());
    }

    #[test]
    fn test_addon_factory_finds_typed_descendant() {
        let mut table = DataTable::new("t");
        let mut row = DataEntity::new();
        row.set_value("v", 3).unwrap();
        let row_id = row.id().to_string();
        table.add_row(row);

        let mut root = Node::object();
        root.insert("table", Node::typed(table));

        let factory = Factory::Addon(AddonFactory::new(root, row_id));
        let found = factory.get_value(&codec()).unwrap().unwrap();
        let row = found.downcast_ref::<DataEntity>().unwrap();
        assert_eq!(row.get_value("v", false), Some(&json!(3)));
    }

    #[test]
    fn test_lazy_and_proxy_variants() {
        let modules = StaticModules::new();
        modules.insert("m", "answer", Node::from(42));
        let lazy = Factory::Lazy(LazyFactory::new("m", "answer", Arc::new(modules)));
        assert_eq!(lazy.get_value(&codec()).unwrap(), Some(Node::from(42)));

        let proxy = Factory::Proxy(ProxyFactory::new(
            crate::registry::TypeDescriptor::new("Remote").with_methods(["ping"]),
            |_, _| Ok(Node::from("pong")),
        ));
        let node = proxy.get_value(&codec()).unwrap().unwrap();
        let object = node.downcast_ref::<crate::factory::ProxyObject>().unwrap();
        assert_eq!(object.invoke("ping", vec![]).unwrap(), Node::from("pong"));
    }
}
