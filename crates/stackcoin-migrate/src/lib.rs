//! One-shot migration of StackCoin data from the legacy PostgreSQL store to
//! the new SQLite store, rewriting primary-key references along the way.

pub mod convert;
pub mod error;
pub mod mapping;
pub mod orchestrator;
pub mod source;
pub mod stages;

pub use error::{MigrateError, Result};
pub use mapping::{EntityKind, MappingRegistry};
pub use orchestrator::{MigrationSummary, Orchestrator};
