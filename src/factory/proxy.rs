//! Transparent proxies.

use std::fmt;
use std::sync::Arc;

use super::error::{FactoryError, FactoryResult};
use crate::codec::{CodecResult, Node};
use crate::registry::{Addon, AddonType, TypeDescriptor};

/// Receives every method call made on a proxy: method name and arguments.
pub type ProxyHandler = Arc<dyn Fn(&str, Vec<Node>) -> FactoryResult<Node> + Send + Sync>;

/// Builds [`ProxyObject`]s standing in for a destination type.
#[derive(Clone)]
pub struct ProxyFactory {
    destination: TypeDescriptor,
    handler: ProxyHandler,
}

impl ProxyFactory {
    pub fn new<F>(destination: TypeDescriptor, handler: F) -> Self
    where
        F: Fn(&str, Vec<Node>) -> FactoryResult<Node> + Send + Sync + 'static,
    {
        Self {
            destination,
            handler: Arc::new(handler),
        }
    }

    /// Proxy for a declared type, exposing the methods it declares.
    pub fn of<T, F>(handler: F) -> Self
    where
        T: AddonType,
        F: Fn(&str, Vec<Node>) -> FactoryResult<Node> + Send + Sync + 'static,
    {
        Self::new(T::descriptor(), handler)
    }

    pub fn destination(&self) -> &TypeDescriptor {
        &self.destination
    }

    pub fn build(&self) -> ProxyObject {
        ProxyObject {
            type_name: self.destination.name().to_string(),
            methods: self.destination.methods().to_vec(),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl fmt::Debug for ProxyFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyFactory")
            .field("destination", &self.destination.name())
            .finish()
    }
}

/// An object exposing a type's methods, all routed to one handler.
///
/// Reports the destination type's name as its own, so it is tagged and
/// looked up as that type.
#[derive(Clone)]
pub struct ProxyObject {
    type_name: String,
    methods: Vec<String>,
    handler: ProxyHandler,
}

impl ProxyObject {
    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    pub fn has_method(&self, method: &str) -> bool {
        self.methods.iter().any(|m| m == method)
    }

    /// Call a declared method through the handler.
    pub fn invoke(&self, method: &str, args: Vec<Node>) -> FactoryResult<Node> {
        if !self.has_method(method) {
            return Err(FactoryError::UnknownMethod {
                type_name: self.type_name.clone(),
                method: method.to_string(),
            });
        }
        tracing::trace!(type_name = %self.type_name, method, "proxy call");
        (self.handler)(method, args)
    }
}

impl Addon for ProxyObject {
    fn instance_type_name(&self) -> Option<&str> {
        Some(&self.type_name)
    }

    fn to_node(&self) -> CodecResult<Node> {
        Ok(Node::object())
    }
}

impl fmt::Debug for ProxyObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyObject")
            .field("type_name", &self.type_name)
            .field("methods", &self.methods)
            .finish()
    }
}
