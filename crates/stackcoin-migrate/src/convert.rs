use crate::error::{MigrateError, Result};
use chrono::{DateTime, Utc};

/// Render a legacy timestamp as ISO-8601 text for SQLite. NULL stays NULL.
pub fn timestamp_to_iso(timestamp: Option<DateTime<Utc>>) -> Option<String> {
    timestamp.map(|t| t.to_rfc3339())
}

/// Collapse a legacy boolean to the 0/1 integer the new schema stores. The
/// legacy flag columns are NOT NULL, so an absent value means the source row
/// is corrupt.
pub fn bool_to_int(field: &'static str, value: Option<bool>) -> Result<i64> {
    match value {
        Some(true) => Ok(1),
        Some(false) => Ok(0),
        None => Err(MigrateError::Conversion {
            field,
            message: "boolean column is null".into(),
        }),
    }
}
