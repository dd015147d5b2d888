//! The process-wide type registry.

use std::borrow::Cow;
use std::collections::HashMap;

use parking_lot::RwLock;

use super::addon::{short_type_name, Addon, AddonType};
use super::descriptor::TypeDescriptor;

/// Marker name for plain, untyped objects. Never written as a tag.
pub const UNTYPED_OBJECT: &str = "Object";

/// Marker name for text values. Never written as a tag.
pub const TEXT: &str = "String";

/// Mapping from type name to descriptor.
///
/// Thread-safe: registrations take the write lock one at a time, lookups
/// share the read lock. Entries are overwritten, never removed. Create one
/// per process and hand it around behind an `Arc`.
pub struct TypeRegistry {
    types: RwLock<HashMap<String, TypeDescriptor>>,
}

impl TypeRegistry {
    /// Create a registry holding only the built-in markers.
    pub fn new() -> Self {
        let registry = Self {
            types: RwLock::new(HashMap::new()),
        };
        registry.register_descriptor(
            TypeDescriptor::new(UNTYPED_OBJECT).with_label("Untyped object"),
        );
        registry.register_descriptor(TypeDescriptor::new(TEXT).with_label("Text"));
        registry
    }

    /// Store a descriptor under `name`, replacing any previous entry.
    pub fn register(&self, name: impl Into<String>, descriptor: TypeDescriptor) {
        let name = name.into();
        let descriptor = descriptor.renamed(name.clone());
        let replaced = self.types.write().insert(name.clone(), descriptor).is_some();
        tracing::debug!(type_name = %name, replaced, "registered addon type");
    }

    /// Store a descriptor under its own name.
    pub fn register_descriptor(&self, descriptor: TypeDescriptor) {
        let name = descriptor.name().to_string();
        self.register(name, descriptor);
    }

    /// Register a type from its `addon!` declaration.
    pub fn register_type<T: AddonType>(&self) {
        self.register_descriptor(T::descriptor());
    }

    pub fn lookup(&self, name: &str) -> Option<TypeDescriptor> {
        self.types.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.read().contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }

    /// Type name of a value: the instance's own name first, then the name
    /// declared for its type, then one derived from the Rust type name.
    pub fn name_of<'a>(&self, value: &'a dyn Addon) -> Cow<'a, str> {
        if let Some(name) = value.instance_type_name() {
            return Cow::Borrowed(name);
        }
        if let Some(name) = value.declared_type_name() {
            return Cow::Borrowed(name);
        }
        Cow::Borrowed(short_type_name(value.rust_type_name()))
    }

    /// Type name of a declared type.
    pub fn name_of_type<T: AddonType>(&self) -> Cow<'static, str> {
        T::type_name()
    }

    /// Whether `name` is one of the markers that are never written as tags.
    pub fn is_marker(name: &str) -> bool {
        name == UNTYPED_OBJECT || name == TEXT
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CodecResult, Node};
    use serde::{Deserialize, Serialize};
    use std::sync::Arc;

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct Widget {
        caption: String,
    }

    crate::addon!(Widget {
        name: "ui.Widget",
        label: "Widget",
    });

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct Unnamed;

    crate::addon!(Unnamed {});

    /// A value that reports its own type name.
    #[derive(Debug, Clone)]
    struct Masked(String);

    impl Addon for Masked {
        fn instance_type_name(&self) -> Option<&str> {
            Some(&self.0)
        }

        fn declared_type_name(&self) -> Option<&'static str> {
            Some("Masked")
        }

        fn to_node(&self) -> CodecResult<Node> {
            Ok(Node::Object(Default::default()))
        }
    }

    #[test]
    fn test_builtin_markers() {
        let registry = TypeRegistry::new();
        assert!(registry.contains(UNTYPED_OBJECT));
        assert!(registry.contains(TEXT));
        assert!(!registry.lookup(UNTYPED_OBJECT).unwrap().is_constructible());
        assert!(TypeRegistry::is_marker("Object"));
        assert!(!TypeRegistry::is_marker("Widget"));
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = TypeRegistry::new();
        registry.register_type::<Widget>();

        let desc = registry.lookup("ui.Widget").unwrap();
        assert_eq!(desc.label(), "Widget");
        assert!(desc.is_constructible());
        assert!(registry.lookup("Widget").is_none());
    }

    #[test]
    fn test_register_overwrites_silently() {
        let registry = TypeRegistry::new();
        registry.register("thing", TypeDescriptor::new("ignored").with_label("first"));
        registry.register("thing", TypeDescriptor::new("ignored").with_label("second"));

        let desc = registry.lookup("thing").unwrap();
        assert_eq!(desc.name(), "thing");
        assert_eq!(desc.label(), "second");
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_name_of_priority() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.name_of(&Masked("Proxy.Target".into())), "Proxy.Target");
        assert_eq!(registry.name_of(&Widget::default()), "ui.Widget");
        assert_eq!(registry.name_of(&Unnamed), "Unnamed");
        assert_eq!(registry.name_of_type::<Widget>(), "ui.Widget");
    }

    #[test]
    fn test_concurrent_lookup() {
        let registry = Arc::new(TypeRegistry::new());
        registry.register_type::<Widget>();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.lookup("ui.Widget").is_some())
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
