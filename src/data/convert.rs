//! Building tables from plain JSON records.

use std::fs;
use std::path::Path;

use serde_json::Value;

use super::entity::DataEntity;
use super::error::{DataError, DataResult};
use super::table::{DataTable, DEFAULT_TABLE_NAME};

/// Build a table from an array of plain records.
///
/// The schema is the first record's keys, in source order. Every record
/// becomes a row that is added through [`DataTable::add_row`], so duplicate
/// keys are dropped, and the table is committed at the end: all rows come
/// out unchanged. `null` input gives `None`.
pub fn json_convert_table<I, S>(
    data: &Value,
    name: Option<&str>,
    primary_key_fields: I,
) -> DataResult<Option<DataTable>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let records = match data {
        Value::Null => return Ok(None),
        Value::Array(records) => records,
        other => {
            return Err(DataError::Conversion(format!(
                "expected an array of records, got {}",
                kind(other)
            )))
        }
    };

    let mut table = DataTable::new(name.unwrap_or(DEFAULT_TABLE_NAME))
        .with_primary_key(primary_key_fields);
    let Some(first) = records.first() else {
        return Ok(Some(table));
    };

    let first = first.as_object().ok_or_else(|| not_a_record(0, first))?;
    table = table.with_schema(first.keys().cloned());

    for (index, record) in records.iter().enumerate() {
        let fields = record.as_object().ok_or_else(|| not_a_record(index, record))?;
        let mut row = DataEntity::new();
        for (key, value) in fields {
            row.set_value(key.clone(), value.clone())?;
        }
        table.add_row(row);
    }
    table.accept_changes();

    tracing::debug!(table = %table.name(), rows = table.len(), "converted records to table");
    Ok(Some(table))
}

/// Parse JSON text and convert it with [`json_convert_table`].
pub fn json_convert_table_str<I, S>(
    text: &str,
    name: Option<&str>,
    primary_key_fields: I,
) -> DataResult<Option<DataTable>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    if text.trim().is_empty() {
        return Ok(None);
    }
    let data: Value = serde_json::from_str(text)?;
    json_convert_table(&data, name, primary_key_fields)
}

/// Read a JSON file and convert it with [`json_convert_table`].
pub fn load_table_file<P, I, S>(
    path: P,
    name: Option<&str>,
    primary_key_fields: I,
) -> DataResult<Option<DataTable>>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let text = fs::read_to_string(path.as_ref())?;
    json_convert_table_str(&text, name, primary_key_fields)
}

fn not_a_record(index: usize, value: &Value) -> DataError {
    DataError::Conversion(format!("element {} is {}, not a record", index, kind(value)))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
