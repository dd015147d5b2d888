//! Named collections of tables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use super::table::DataTable;

/// Tables keyed by name. The dataset owns its tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSet {
    id: String,
    name: String,
    #[serde(default)]
    tables: BTreeMap<String, DataTable>,
}

crate::addon!(DataSet {
    name: "DataSet",
    label: "Data set",
    description: "A collection of tables",
    id: id,
    children: [tables],
});

impl Default for DataSet {
    fn default() -> Self {
        Self::new("")
    }
}

impl DataSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Ulid::new().to_string(),
            name: name.into(),
            tables: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store a table under its own name, replacing any table of that name.
    pub fn set_table(&mut self, table: DataTable) -> &mut Self {
        self.tables.insert(table.name().to_string(), table);
        self
    }

    /// Remove a table and hand it back.
    pub fn delete_table(&mut self, name: &str) -> Option<DataTable> {
        self.tables.remove(name)
    }

    pub fn clear_tables(&mut self) {
        self.tables.clear();
    }

    pub fn table(&self, name: &str) -> Option<&DataTable> {
        self.tables.get(name)
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut DataTable> {
        self.tables.get_mut(name)
    }

    /// Table names, sorted.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
