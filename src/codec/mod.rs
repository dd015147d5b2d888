//! Polymorphic serialization.
//!
//! Graphs are held as [`Node`] trees. On encode, every typed value is
//! written with a reserved `$type` key naming its registered type. On
//! decode, tagged objects are rebuilt through the registry; anything
//! untagged or unknown stays a plain structural value.
//!
//! # Usage
//!
//! ```ignore
//! use addonkit::codec::{Codec, Node};
//!
//! let codec = Codec::new(registry);
//! let text = codec.serialize(&Node::typed(table))?;
//! let back = codec.deserialize(&text)?;
//! ```

mod codec;
mod config;
mod error;
mod node;
mod tagger;

pub use codec::Codec;
pub use config::{CodecConfig, DEFAULT_ID_KEY, DEFAULT_TYPE_KEY};
pub use error::{CodecError, CodecResult};
pub use node::Node;
pub use tagger::TypeTagger;
