use rusqlite::types::Value;

use crate::error::SqlAnywhereDbError;
use crate::types::RowValues;

/// Extract a `RowValues` from a `SQLite` row.
///
/// # Errors
/// Returns `SqlAnywhereDbError::SqliteError` if the column cannot be read.
pub fn sqlite_extract_value_sync(
    row: &rusqlite::Row,
    idx: usize,
) -> Result<RowValues, SqlAnywhereDbError> {
    let value: Value = row.get(idx)?;
    Ok(match value {
        Value::Null => RowValues::Null,
        Value::Integer(i) => RowValues::Int(i),
        Value::Real(f) => RowValues::Float(f),
        Value::Text(s) => RowValues::Text(s),
        Value::Blob(b) => RowValues::Blob(b),
    })
}

/// Extract the first `width` columns of `row`.
///
/// # Errors
/// Returns the first column that fails to convert.
pub fn extract_row(
    row: &rusqlite::Row,
    width: usize,
) -> Result<Vec<RowValues>, SqlAnywhereDbError> {
    (0..width).map(|idx| sqlite_extract_value_sync(row, idx)).collect()
}
