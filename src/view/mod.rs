//! Filtered views.
//!
//! A [`DataView`] filters the rows of a [`DataSource`] on demand and, when
//! built over a [`DataReceiver`], re-emits each pushed batch filtered.
//! Filters are SQL-style boolean expressions parsed once into an [`Expr`]
//! tree, or plain callbacks.
//!
//! # Filter syntax
//!
//! ```text
//! row.v > 1
//! data.status IN ('open', 'held') AND NOT archived
//! address.city LIKE 'O%' OR zip IS NULL
//! ```

mod ast;
mod error;
pub mod eval;
mod parser;
mod source;
mod view;

pub use ast::{CompareOp, Expr};
pub use error::{PredicateError, PredicateResult};
pub use parser::PredicateParser;
pub use source::{
    DataChannel, DataFeed, DataHandler, DataReceiver, DataSource, ObjectListTable, SubscriptionId,
};
pub use view::{DataView, Filter, RowPredicate};
