//! Writing and reading type tags on object graphs.
//!
//! Both walks are depth-first and post-order: children are handled before
//! the node that holds them.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::error::{CodecError, CodecResult};
use super::node::Node;
use crate::registry::{construct_as, Addon, AddonType, TypeDescriptor, TypeRegistry};

/// Tags and untags graphs against a registry.
pub struct TypeTagger<'a> {
    registry: &'a TypeRegistry,
    type_key: &'a str,
}

impl<'a> TypeTagger<'a> {
    pub fn new(registry: &'a TypeRegistry, type_key: &'a str) -> Self {
        Self { registry, type_key }
    }

    /// Tagged JSON form of a graph.
    ///
    /// Typed values get the type key with their registry name. Untyped
    /// objects are left as they are, including a tag they already carry, so
    /// tagging twice gives the same result.
    pub fn tag(&self, node: &Node) -> CodecResult<Value> {
        Ok(match node {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(*b),
            Node::Number(n) => Value::Number(n.clone()),
            Node::String(s) => Value::String(s.clone()),
            Node::Array(items) => Value::Array(
                items.iter().map(|item| self.tag(item)).collect::<CodecResult<_>>()?,
            ),
            Node::Object(map) => {
                let mut out = Map::new();
                for (key, child) in map {
                    out.insert(key.clone(), self.tag(child)?);
                }
                Value::Object(out)
            }
            Node::Typed(addon) => self.tag_addon(addon.as_ref())?,
        })
    }

    /// Tagged JSON form of one typed value.
    pub fn tag_addon(&self, addon: &dyn Addon) -> CodecResult<Value> {
        let name = self.registry.name_of(addon);
        let inner = addon.to_node()?;
        if inner.is_typed() {
            return Err(CodecError::NotStructural(name.into_owned()));
        }

        let mut value = self.tag(&inner)?;
        if !TypeRegistry::is_marker(&name) {
            if let Value::Object(map) = &mut value {
                map.insert(self.type_key.to_string(), Value::String(name.into_owned()));
            }
        }
        Ok(value)
    }

    /// Rebuild typed values from a decoded JSON tree.
    ///
    /// An object whose tag names a registered type becomes [`Node::Typed`]
    /// and gets its `on_assigned_type` hook called. Objects without a tag,
    /// or with a tag nobody registered, stay untyped.
    pub fn untag(&self, value: Value) -> CodecResult<Node> {
        match value {
            Value::Object(map) => {
                let mut children = BTreeMap::new();
                for (key, child) in map {
                    children.insert(key, self.untag(child)?);
                }

                let descriptor = children
                    .get(self.type_key)
                    .and_then(Node::as_str)
                    .and_then(|name| self.resolve(name));

                match descriptor {
                    Some(descriptor) => self.assign(&descriptor, children),
                    None => Ok(Node::Object(children)),
                }
            }
            Value::Array(items) => Ok(Node::Array(
                items.into_iter().map(|item| self.untag(item)).collect::<CodecResult<_>>()?,
            )),
            other => Ok(Node::from(other)),
        }
    }

    /// Build the root as `T` without reading its tag. Descendants are left
    /// exactly as decoded.
    pub fn untag_as<T: AddonType>(&self, value: Value) -> CodecResult<T> {
        let value = match value {
            Value::Object(mut map) => {
                map.remove(self.type_key);
                Value::Object(map)
            }
            other => other,
        };

        let mut typed = construct_as::<T>(value)?;
        typed.on_assigned_type();
        Ok(typed)
    }

    fn resolve(&self, name: &str) -> Option<TypeDescriptor> {
        match self.registry.lookup(name) {
            Some(descriptor) if descriptor.is_constructible() => Some(descriptor),
            Some(_) => None,
            None => {
                tracing::trace!(type_name = %name, "unregistered type tag, keeping untyped value");
                None
            }
        }
    }

    fn assign(
        &self,
        descriptor: &TypeDescriptor,
        children: BTreeMap<String, Node>,
    ) -> CodecResult<Node> {
        let mut fields = Map::new();
        for (key, child) in &children {
            if key != self.type_key {
                fields.insert(key.clone(), self.tag(child)?);
            }
        }

        match descriptor.construct(Value::Object(fields)) {
            Some(built) => {
                let mut addon = built?;
                addon.on_assigned_type();
                Ok(Node::Typed(addon))
            }
            None => Ok(Node::Object(children)),
        }
    }
}
