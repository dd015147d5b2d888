//! Tables of change-tracked rows.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use super::entity::{DataEntity, DataState, Row};
use crate::view::eval::values_equal;

/// Name given to tables created without one.
pub const DEFAULT_TABLE_NAME: &str = "table";

/// A table shared between threads. The lock covers the whole row list.
pub type SharedTable = Arc<RwLock<DataTable>>;

/// An ordered list of rows, deduplicated on the primary key.
///
/// No two live rows have equal key tuples. Inserting a row whose key is
/// already present drops the new row. A table without key fields has the
/// empty tuple as every row's key, so it holds at most one live row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    id: String,
    name: String,
    #[serde(default)]
    primary_key_fields: Vec<String>,
    #[serde(default)]
    schema: Vec<String>,
    #[serde(default)]
    rows: Vec<DataEntity>,
}

crate::addon!(DataTable {
    name: "DataTable",
    label: "Data table",
    description: "A table of a relational store",
    id: id,
    children: [rows],
});

impl Default for DataTable {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE_NAME)
    }
}

impl DataTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Ulid::new().to_string(),
            name: name.into(),
            primary_key_fields: Vec::new(),
            schema: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Set the primary key fields.
    pub fn with_primary_key<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set the field names, in order.
    pub fn with_schema<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schema = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn into_shared(self) -> SharedTable {
        Arc::new(RwLock::new(self))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn primary_key_fields(&self) -> &[String] {
        &self.primary_key_fields
    }

    pub fn schema(&self) -> &[String] {
        &self.schema
    }

    pub fn rows(&self) -> &[DataEntity] {
        &self.rows
    }

    pub fn row_mut(&mut self, index: usize) -> Option<&mut DataEntity> {
        self.rows.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether any row differs from its committed state.
    pub fn has_changes(&self) -> bool {
        self.rows.iter().any(|row| row.state() != DataState::Unchanged)
    }

    /// Primary key values of a row, by key field name.
    ///
    /// Fields the row lacks are left out.
    pub fn key_values(&self, row: &DataEntity) -> Row {
        let mut keys = Row::new();
        for field in &self.primary_key_fields {
            if let Some(value) = row.get_value(field, false) {
                keys.insert(field.clone(), value.clone());
            }
        }
        keys
    }

    /// First live row whose key fields all equal `key_values`.
    ///
    /// Numbers compare by value, so `1` and `1.0` are the same key. On a
    /// table without key fields this is the first live row.
    pub fn find_row_by_key(&self, key_values: &Row) -> Option<&DataEntity> {
        let index = self.find_index_by_key(key_values)?;
        self.rows.get(index)
    }

    pub fn find_row_by_key_mut(&mut self, key_values: &Row) -> Option<&mut DataEntity> {
        let index = self.find_index_by_key(key_values)?;
        self.rows.get_mut(index)
    }

    fn find_index_by_key(&self, key_values: &Row) -> Option<usize> {
        self.rows.iter().position(|row| {
            row.state().is_live()
                && self.primary_key_fields.iter().all(|field| {
                    match (row.get_value(field, false), key_values.get(field)) {
                        (Some(a), Some(b)) => values_equal(a, b),
                        (None, None) => true,
                        _ => false,
                    }
                })
        })
    }

    /// Append a row and mark it added.
    ///
    /// Returns `false`, dropping the row, when a live row with the same key
    /// is already present.
    pub fn add_row(&mut self, mut row: DataEntity) -> bool {
        let keys = self.key_values(&row);
        if self.find_index_by_key(&keys).is_some() {
            tracing::trace!(table = %self.name, keys = ?keys, "duplicate key, row dropped");
            return false;
        }
        row.set_added();
        self.rows.push(row);
        true
    }

    /// Commit every row and keep the ones that end unchanged.
    pub fn accept_changes(&mut self) {
        for row in &mut self.rows {
            row.accept_changes();
        }
        self.prune();
    }

    /// Roll back every row and keep the ones that end unchanged.
    pub fn reject_changes(&mut self) {
        for row in &mut self.rows {
            row.reject_changes();
        }
        self.prune();
    }

    fn prune(&mut self) {
        let before = self.rows.len();
        self.rows.retain(|row| row.state() == DataState::Unchanged);
        let removed = before - self.rows.len();
        if removed > 0 {
            tracing::debug!(table = %self.name, removed, "pruned rows");
        }
    }

    /// Every row as a flat record.
    pub fn get_data_list(&self) -> Vec<Row> {
        self.rows.iter().map(DataEntity::to_object).collect()
    }
}
