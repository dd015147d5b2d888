//! Type descriptors stored in the registry.

use std::fmt;

use serde_json::Value;

use super::addon::{Addon, AddonType};
use crate::codec::{CodecError, CodecResult};

/// Builds a typed value from the structural form of a decoded node.
pub type Constructor = fn(Value) -> CodecResult<Box<dyn Addon>>;

/// Describes one constructible type.
#[derive(Clone)]
pub struct TypeDescriptor {
    name: String,
    label: Option<String>,
    description: Option<String>,
    methods: Vec<String>,
    constructor: Option<Constructor>,
}

impl TypeDescriptor {
    /// A descriptor with a name and nothing else.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            description: None,
            methods: Vec::new(),
            constructor: None,
        }
    }

    /// Descriptor built from a type's `addon!` declaration.
    pub fn of<T: AddonType>() -> Self {
        Self {
            name: T::type_name().into_owned(),
            label: T::LABEL.map(str::to_string),
            description: T::DESCRIPTION.map(str::to_string),
            methods: T::METHODS.iter().map(|m| m.to_string()).collect(),
            constructor: Some(construct::<T>),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = methods.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_constructor(mut self, constructor: Constructor) -> Self {
        self.constructor = Some(constructor);
        self
    }

    pub(crate) fn renamed(mut self, name: String) -> Self {
        self.name = name;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Label, falling back to the name.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    /// Whether decoded nodes can be given this type.
    pub fn is_constructible(&self) -> bool {
        self.constructor.is_some()
    }

    /// Build a typed value, or `None` for marker descriptors.
    pub fn construct(&self, value: Value) -> Option<CodecResult<Box<dyn Addon>>> {
        self.constructor.map(|ctor| ctor(value))
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("description", &self.description)
            .field("methods", &self.methods)
            .field("constructible", &self.constructor.is_some())
            .finish()
    }
}

/// Start from a fresh default instance and overlay the node's fields on it,
/// so fields the node leaves out keep their defaults.
fn construct<T: AddonType>(value: Value) -> CodecResult<Box<dyn Addon>> {
    Ok(Box::new(construct_as::<T>(value)?))
}

pub(crate) fn construct_as<T: AddonType>(value: Value) -> CodecResult<T> {
    let mut base = serde_json::to_value(T::default()).map_err(CodecError::Encode)?;
    overlay(&mut base, value);

    serde_json::from_value(base).map_err(|e| CodecError::Construct {
        type_name: T::type_name().into_owned(),
        message: e.to_string(),
    })
}

fn overlay(base: &mut Value, node: Value) {
    match (base, node) {
        (Value::Object(base), Value::Object(node)) => {
            for (key, value) in node {
                base.insert(key, value);
            }
        }
        (base, node) => *base = node,
    }
}
