//! Type registry for polymorphic values.
//!
//! Types declare their registry name with the [`addon!`](crate::addon)
//! macro. At process start the declared types are registered once into a
//! [`TypeRegistry`], which the codec then uses to name values on encode
//! and to rebuild them on decode.

mod addon;
mod descriptor;
mod registry;

pub use addon::{short_type_name, Addon, AddonField, AddonType, AsAny, CloneAddon};
pub use descriptor::{Constructor, TypeDescriptor};
pub(crate) use descriptor::construct_as;
pub use registry::{TypeRegistry, TEXT, UNTYPED_OBJECT};
