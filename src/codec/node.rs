//! The neutral intermediate graph form.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Number, Value};

use super::error::{CodecError, CodecResult};
use crate::registry::Addon;

/// A node of an object graph.
///
/// Plain JSON shapes plus [`Node::Typed`], which holds a registered value.
/// Object keys are kept sorted.
#[derive(Debug, Clone)]
pub enum Node {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Node>),
    Object(BTreeMap<String, Node>),
    Typed(Box<dyn Addon>),
}

impl Node {
    /// Structural node from anything serde can serialize.
    pub fn structural<T: Serialize + ?Sized>(value: &T) -> CodecResult<Node> {
        serde_json::to_value(value)
            .map(Node::from)
            .map_err(CodecError::Encode)
    }

    pub fn typed<T: Addon>(value: T) -> Node {
        Node::Typed(Box::new(value))
    }

    /// Empty untyped object.
    pub fn object() -> Node {
        Node::Object(BTreeMap::new())
    }

    /// Set a field on an object node. Does nothing on other nodes.
    pub fn insert(&mut self, key: impl Into<String>, value: Node) -> Option<Node> {
        match self {
            Node::Object(map) => map.insert(key.into(), value),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Object(map) => map.get(key),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    pub fn is_typed(&self) -> bool {
        matches!(self, Node::Typed(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Node]> {
        match self {
            Node::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Node>> {
        match self {
            Node::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_typed(&self) -> Option<&dyn Addon> {
        match self {
            Node::Typed(addon) => Some(addon.as_ref()),
            _ => None,
        }
    }

    pub fn downcast_ref<T: Addon>(&self) -> Option<&T> {
        self.as_typed().and_then(|addon| addon.downcast_ref::<T>())
    }

    pub fn downcast_mut<T: Addon>(&mut self) -> Option<&mut T> {
        match self {
            Node::Typed(addon) => addon.downcast_mut::<T>(),
            _ => None,
        }
    }

    /// Take the typed value out, or get the node back.
    pub fn into_typed<T: Addon>(self) -> Result<T, Node> {
        match self {
            Node::Typed(addon) => addon.downcast::<T>().map(|b| *b).map_err(Node::Typed),
            other => Err(other),
        }
    }

    /// Plain JSON form, without type tags.
    pub fn to_value(&self) -> CodecResult<Value> {
        Ok(match self {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(*b),
            Node::Number(n) => Value::Number(n.clone()),
            Node::String(s) => Value::String(s.clone()),
            Node::Array(items) => Value::Array(
                items.iter().map(Node::to_value).collect::<CodecResult<_>>()?,
            ),
            Node::Object(map) => {
                let mut out = Map::new();
                for (key, child) in map {
                    out.insert(key.clone(), child.to_value()?);
                }
                Value::Object(out)
            }
            Node::Typed(addon) => {
                let inner = addon.to_node()?;
                if inner.is_typed() {
                    return Err(CodecError::NotStructural(addon.rust_type_name().to_string()));
                }
                inner.to_value()?
            }
        })
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(b),
            Value::Number(n) => Node::Number(n),
            Value::String(s) => Node::String(s),
            Value::Array(items) => Node::Array(items.into_iter().map(Node::from).collect()),
            Value::Object(map) => {
                Node::Object(map.into_iter().map(|(k, v)| (k, Node::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::String(value.to_string())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::String(value)
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::Number(value.into())
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Bool(value)
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Node::Array(items)
    }
}

/// Typed nodes compare by concrete type and structural value.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Node::Null, Node::Null) => true,
            (Node::Bool(a), Node::Bool(b)) => a == b,
            (Node::Number(a), Node::Number(b)) => a == b,
            (Node::String(a), Node::String(b)) => a == b,
            (Node::Array(a), Node::Array(b)) => a == b,
            (Node::Object(a), Node::Object(b)) => a == b,
            (Node::Typed(a), Node::Typed(b)) => {
                a.rust_type_name() == b.rust_type_name()
                    && match (self.to_value(), other.to_value()) {
                        (Ok(x), Ok(y)) => x == y,
                        _ => false,
                    }
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Point {
        x: i64,
        y: i64,
    }

    crate::addon!(Point { name: "Point", });

    #[test]
    fn test_from_value() {
        let node = Node::from(json!({"a": [1, "two", null], "b": {"c": true}}));
        assert_eq!(node.get("a").and_then(Node::as_array).map(|a| a.len()), Some(3));
        assert_eq!(node.get("b").and_then(|b| b.get("c")), Some(&Node::Bool(true)));
        assert!(node.get("missing").is_none());
    }

    #[test]
    fn test_to_value_flattens_typed() {
        let mut node = Node::object();
        node.insert("origin", Node::typed(Point { x: 1, y: 2 }));
        assert_eq!(node.to_value().unwrap(), json!({"origin": {"x": 1, "y": 2}}));
    }

    #[test]
    fn test_typed_access() {
        let mut node = Node::typed(Point { x: 3, y: 4 });
        assert_eq!(node.downcast_ref::<Point>().map(|p| p.x), Some(3));
        node.downcast_mut::<Point>().unwrap().y = 9;
        assert_eq!(node.clone().into_typed::<Point>().unwrap(), Point { x: 3, y: 9 });
        assert!(Node::from("text").into_typed::<Point>().is_err());
    }

    #[test]
    fn test_typed_equality() {
        let a = Node::typed(Point { x: 1, y: 1 });
        let b = Node::typed(Point { x: 1, y: 1 });
        let c = Node::typed(Point { x: 2, y: 1 });
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, Node::from(json!({"x": 1, "y": 1})));
    }
}
