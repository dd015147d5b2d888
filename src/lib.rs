//! addonkit - typed object graphs and change-tracked tables
//!
//! This crate serializes heterogeneous object graphs to JSON and rebuilds
//! them with their runtime types, and provides a disconnected tabular data
//! model: rows with committed and edited values, tables deduplicated on a
//! primary key, datasets, and filtered views.
//!
//! # Example
//!
//! ```no_run
//! use addonkit::codec::Node;
//! use addonkit::runtime::Runtime;
//! use serde_json::json;
//!
//! let runtime = Runtime::start();
//! let table = runtime
//!     .convert_table(&json!([{"id": 1, "name": "a"}]), Some("people"), ["id"])
//!     .unwrap()
//!     .unwrap();
//!
//! let text = runtime.serialize(&Node::typed(table)).unwrap();
//! let back = runtime.deserialize(&text).unwrap();
//! ```

pub mod codec;
pub mod data;
pub mod factory;
pub mod registry;
pub mod remote;
pub mod runtime;
pub mod view;

pub use codec::{Codec, Node};
pub use data::{DataEntity, DataSet, DataState, DataTable};
pub use registry::{Addon, AddonType, TypeRegistry};
pub use runtime::{Runtime, RuntimeConfig};
pub use view::DataView;
