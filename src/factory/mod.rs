//! Value-or-factory indirection.
//!
//! A [`Ref`] holds either a value or a [`Factory`] that produces one when
//! resolved. Factories are plain strategies: a direct reference, a proxy
//! for a type, serialized text, a lookup by id inside a graph, or a module
//! export loaded on first use. [`JsonFactory`] and [`LazyFactory`] are
//! registered types, so they survive a round trip inside a serialized
//! graph.

mod error;
mod factory;
mod lazy;
mod proxy;

pub use error::{BoxError, FactoryError, FactoryResult};
pub use factory::{find_addon_by_id, AddonFactory, Factory, JsonFactory, Ref};
pub use lazy::{LazyFactory, ModuleResolver, StaticModules};
pub use proxy::{ProxyFactory, ProxyHandler, ProxyObject};

use crate::registry::TypeRegistry;

/// Register the factory types that can appear in serialized graphs.
pub fn register_types(registry: &TypeRegistry) {
    registry.register_type::<JsonFactory>();
    registry.register_type::<LazyFactory>();
}
