use rusqlite::{types::ValueRef, Row};

use crate::error::{Result, ShelfError};

pub fn to_bool(value: Option<i64>) -> bool {
    value.unwrap_or(0) != 0
}

pub fn from_bool(value: bool) -> i64 {
    i64::from(value)
}

pub fn require_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(ShelfError::validation("title is required"));
    }
    Ok(())
}

/// Read a nullable free-text column as a string whatever storage class it
/// landed in. `due_date` is declared `DATE`, so SQLite keeps `20240501` as an
/// integer and `1.5` as a real.
pub fn optional_text(row: &Row, column: &str) -> rusqlite::Result<Option<String>> {
    Ok(match row.get_ref(column)? {
        ValueRef::Null => None,
        ValueRef::Integer(value) => Some(value.to_string()),
        ValueRef::Real(value) => Some(value.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    })
}

/// Turn a zero row count from a keyed statement into `NotFound`.
pub fn ensure_affected(rows_affected: usize, id: i64) -> Result<()> {
    if rows_affected == 0 {
        return Err(ShelfError::NotFound(id));
    }
    Ok(())
}
