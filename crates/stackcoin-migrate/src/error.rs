use crate::mapping::EntityKind;
use thiserror::Error;

/// Errors that abort a migration run. None of these are retried or recovered
/// locally; every one unwinds to the orchestrator, which rolls the
/// destination back.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// A store could not be reached at startup.
    #[error("database connection failed: {0}")]
    Connection(#[source] sqlx::Error),

    /// Reading legacy rows failed.
    #[error("source read failed for {entity}: {source}")]
    Read {
        entity: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// A destination insert failed (constraint violation, I/O fault).
    #[error("destination write failed for {entity}: {source}")]
    Write {
        entity: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// A foreign-key field referenced an old id that was never recorded for
    /// its kind. The legacy store is inconsistent.
    #[error("no {kind} mapping recorded for old id {old_id}")]
    MissingMapping { kind: EntityKind, old_id: i64 },

    /// A field value the conversion layer cannot represent.
    #[error("cannot convert {field}: {message}")]
    Conversion {
        field: &'static str,
        message: String,
    },

    /// Beginning, committing or rolling back the destination transaction
    /// failed.
    #[error("destination transaction error: {0}")]
    Tx(#[source] sqlx::Error),

    /// Row counts disagreed between the stores.
    #[error("validation failed: {0}")]
    Validation(String),
}

impl MigrateError {
    pub fn read(entity: &'static str, source: sqlx::Error) -> Self {
        MigrateError::Read { entity, source }
    }

    pub fn write(entity: &'static str, source: sqlx::Error) -> Self {
        MigrateError::Write { entity, source }
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
