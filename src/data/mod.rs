//! Disconnected, change-tracked tabular data.
//!
//! A [`DataEntity`] keeps committed and edited values side by side and
//! moves through [`DataState`]s as it is edited, committed or rolled back.
//! A [`DataTable`] owns rows deduplicated on its primary key, and a
//! [`DataSet`] owns tables by name.

mod convert;
mod dataset;
mod entity;
mod error;
mod table;

pub use convert::{json_convert_table, json_convert_table_str, load_table_file};
pub use dataset::DataSet;
pub use entity::{DataEntity, DataState, Row};
pub use error::{DataError, DataResult};
pub use table::{DataTable, SharedTable, DEFAULT_TABLE_NAME};

use crate::registry::TypeRegistry;

/// Register the data model types.
pub fn register_types(registry: &TypeRegistry) {
    registry.register_type::<DataEntity>();
    registry.register_type::<DataTable>();
    registry.register_type::<DataSet>();
}
