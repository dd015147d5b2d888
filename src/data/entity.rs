//! Change-tracked rows.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ulid::Ulid;

use super::error::{DataError, DataResult};

/// A plain record: field name to value, in insertion order.
pub type Row = Map<String, Value>;

/// Lifecycle state of a row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataState {
    /// Not attached to a table.
    #[default]
    Detached,
    /// Matches its committed values.
    Unchanged,
    /// Added since the last commit.
    Added,
    /// Edited since the last commit.
    Modified,
    /// Marked for removal on the next commit.
    Deleted,
}

impl DataState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataState::Detached => "detached",
            DataState::Unchanged => "unchanged",
            DataState::Added => "added",
            DataState::Modified => "modified",
            DataState::Deleted => "deleted",
        }
    }

    /// Attached to a table, in any state.
    pub fn is_live(&self) -> bool {
        !matches!(self, DataState::Detached)
    }
}

impl fmt::Display for DataState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entity with committed (`origin`) and edited (`current`) values.
///
/// `origin` only changes in [`accept_changes`](Self::accept_changes) and
/// [`reject_changes`](Self::reject_changes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataEntity {
    id: String,
    #[serde(default)]
    state: DataState,
    #[serde(default)]
    origin: Row,
    #[serde(default)]
    current: Row,
}

crate::addon!(DataEntity {
    name: "DataEntity",
    label: "Data entity",
    description: "One row or entity of a relational store",
    id: id,
});

impl Default for DataEntity {
    fn default() -> Self {
        Self::new()
    }
}

impl DataEntity {
    /// Create an empty, detached row.
    pub fn new() -> Self {
        Self {
            id: Ulid::new().to_string(),
            state: DataState::Detached,
            origin: Row::new(),
            current: Row::new(),
        }
    }

    /// Create a detached row whose committed and current values are `row`.
    pub fn from_row(row: Row) -> Self {
        Self {
            origin: row.clone(),
            current: row,
            ..Self::new()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> DataState {
        self.state
    }

    pub fn origin(&self) -> &Row {
        &self.origin
    }

    pub fn current(&self) -> &Row {
        &self.current
    }

    /// Read a field from the committed values or the current ones.
    pub fn get_value(&self, key: &str, want_origin: bool) -> Option<&Value> {
        if want_origin {
            self.origin.get(key)
        } else {
            self.current.get(key)
        }
    }

    /// Write a field. Moves an unchanged row to modified.
    pub fn set_value(&mut self, key: impl Into<String>, value: impl Into<Value>) -> DataResult<()> {
        let key = key.into();
        if self.state == DataState::Deleted {
            return Err(DataError::InvalidState {
                field: key,
                state: self.state,
            });
        }
        self.current.insert(key, value.into());
        self.set_modified();
        Ok(())
    }

    pub fn set_added(&mut self) {
        self.state = DataState::Added;
    }

    /// Mark for removal. Detached and already deleted rows are left alone.
    pub fn set_deleted(&mut self) {
        if matches!(
            self.state,
            DataState::Added | DataState::Modified | DataState::Unchanged
        ) {
            self.state = DataState::Deleted;
        }
    }

    /// Mark an unchanged row as modified.
    pub fn set_modified(&mut self) {
        if self.state == DataState::Unchanged {
            self.state = DataState::Modified;
        }
    }

    /// Commit: current values become the committed ones.
    pub fn accept_changes(&mut self) {
        self.origin = self.current.clone();
        self.state = match self.state {
            DataState::Added | DataState::Modified => DataState::Unchanged,
            DataState::Deleted => DataState::Detached,
            other => other,
        };
    }

    /// Roll back: committed values replace the current ones.
    pub fn reject_changes(&mut self) {
        self.current = self.origin.clone();
        self.state = match self.state {
            DataState::Added | DataState::Modified | DataState::Deleted => DataState::Unchanged,
            other => other,
        };
    }

    /// Flat record: committed values overlaid with current ones.
    pub fn to_object(&self) -> Row {
        let mut merged = self.origin.clone();
        for (key, value) in &self.current {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }
}
