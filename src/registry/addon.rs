//! The `Addon` trait family and the `addon!` declaration macro.
//!
//! Every value that can appear typed inside a [`Node`] graph implements
//! [`Addon`]. Types that can also be rebuilt from text implement
//! [`AddonType`], normally through the [`addon!`](crate::addon) macro which
//! declares the type's registry name next to its definition.

use std::any::Any;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::descriptor::TypeDescriptor;
use crate::codec::{CodecResult, Node};

/// Upcasting helpers, implemented for every `'static` type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Cloning through a trait object.
pub trait CloneAddon {
    fn clone_addon(&self) -> Box<dyn Addon>;
}

impl<T: Addon + Clone> CloneAddon for T {
    fn clone_addon(&self) -> Box<dyn Addon> {
        Box::new(self.clone())
    }
}

/// A value that can sit typed inside an object graph.
pub trait Addon: AsAny + CloneAddon + fmt::Debug + Send + Sync {
    /// Type name carried by this particular instance, overriding its type.
    fn instance_type_name(&self) -> Option<&str> {
        None
    }

    /// Type name declared for the concrete type.
    fn declared_type_name(&self) -> Option<&'static str> {
        None
    }

    /// Full Rust path of the concrete type.
    fn rust_type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Stable identifier used by graph lookups.
    fn addon_id(&self) -> Option<&str> {
        None
    }

    /// Structural form of the value. Nested typed values appear as
    /// [`Node::Typed`] so the tagger can name them.
    fn to_node(&self) -> CodecResult<Node>;

    /// Called once a decoded node has been given this type.
    fn on_assigned_type(&mut self) {}
}

impl Clone for Box<dyn Addon> {
    fn clone(&self) -> Self {
        (**self).clone_addon()
    }
}

impl dyn Addon {
    pub fn is<T: Addon>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Addon>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Addon>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Take the concrete value out of the box, or hand the box back.
    pub fn downcast<T: Addon>(self: Box<Self>) -> Result<Box<T>, Box<dyn Addon>> {
        if (*self).as_any().is::<T>() {
            match <dyn Addon as AsAny>::into_any(self).downcast::<T>() {
                Ok(typed) => Ok(typed),
                Err(_) => unreachable!("type checked above"),
            }
        } else {
            Err(self)
        }
    }
}

/// A registered type that can be rebuilt from its structural form.
pub trait AddonType: Addon + Clone + Default + Serialize + DeserializeOwned {
    /// Name given in the type's declaration, if any.
    const DECLARED_NAME: Option<&'static str> = None;
    /// Human-readable label.
    const LABEL: Option<&'static str> = None;
    /// Longer description.
    const DESCRIPTION: Option<&'static str> = None;
    /// Method names exposed by the type, used by proxy factories.
    const METHODS: &'static [&'static str] = &[];

    /// Registry name: the declared name, or one derived from the Rust name.
    fn type_name() -> Cow<'static, str> {
        match Self::DECLARED_NAME {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(short_type_name(std::any::type_name::<Self>()).to_string()),
        }
    }

    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>()
    }
}

/// Last path segment of a Rust type path, generics stripped.
///
/// `addonkit::data::DataTable<T>` becomes `DataTable`.
pub fn short_type_name(path: &str) -> &str {
    let path = match path.find('<') {
        Some(idx) => &path[..idx],
        None => path,
    };
    path.rsplit("::").next().unwrap_or(path)
}

/// A struct field whose contents are typed values.
///
/// Used by `addon!`'s `children` list so nested values keep their type
/// names when the parent is tagged.
pub trait AddonField {
    fn to_field_node(&self) -> CodecResult<Node>;
}

impl<T: AddonField> AddonField for Vec<T> {
    fn to_field_node(&self) -> CodecResult<Node> {
        self.iter()
            .map(AddonField::to_field_node)
            .collect::<CodecResult<Vec<_>>>()
            .map(Node::Array)
    }
}

impl<T: AddonField> AddonField for Option<T> {
    fn to_field_node(&self) -> CodecResult<Node> {
        match self {
            Some(value) => value.to_field_node(),
            None => Ok(Node::Null),
        }
    }
}

impl<T: AddonField> AddonField for BTreeMap<String, T> {
    fn to_field_node(&self) -> CodecResult<Node> {
        let mut map = BTreeMap::new();
        for (key, value) in self {
            map.insert(key.clone(), value.to_field_node()?);
        }
        Ok(Node::Object(map))
    }
}

/// Declare a registered type.
///
/// ```ignore
/// addon!(DataTable {
///     name: "DataTable",
///     label: "Data table",
///     description: "A table of change-tracked rows",
///     id: id,
///     children: [rows],
/// });
/// ```
///
/// Every key is optional, but the ones present must keep this order:
/// `name`, `label`, `description`, `methods`, `id`, `children`,
/// `on_assigned`. Without `name` the type is registered under its Rust
/// name.
#[macro_export]
macro_rules! addon {
    (
        $ty:ty {
            $(name: $name:literal,)?
            $(label: $label:literal,)?
            $(description: $description:literal,)?
            $(methods: [$($method:literal),* $(,)?],)?
            $(id: $id:ident,)?
            $(children: [$($child:ident),* $(,)?],)?
            $(on_assigned: $hook:path,)?
        }
    ) => {
        impl $crate::registry::Addon for $ty {
            $(
                fn declared_type_name(&self) -> Option<&'static str> {
                    Some($name)
                }
            )?

            $(
                fn addon_id(&self) -> Option<&str> {
                    Some(self.$id.as_str())
                }
            )?

            fn to_node(&self) -> $crate::codec::CodecResult<$crate::codec::Node> {
                #[allow(unused_mut)]
                let mut node = $crate::codec::Node::structural(self)?;
                $($(
                    node.insert(
                        stringify!($child),
                        $crate::registry::AddonField::to_field_node(&self.$child)?,
                    );
                )*)?
                Ok(node)
            }

            $(
                fn on_assigned_type(&mut self) {
                    $hook(self)
                }
            )?
        }

        impl $crate::registry::AddonField for $ty {
            fn to_field_node(&self) -> $crate::codec::CodecResult<$crate::codec::Node> {
                Ok($crate::codec::Node::Typed(Box::new(::std::clone::Clone::clone(self))))
            }
        }

        impl $crate::registry::AddonType for $ty {
            $(const DECLARED_NAME: Option<&'static str> = Some($name);)?
            $(const LABEL: Option<&'static str> = Some($label);)?
            $(const DESCRIPTION: Option<&'static str> = Some($description);)?
            $(const METHODS: &'static [&'static str] = &[$($method),*];)?
        }
    };
}
