mod discord_users;
mod guilds;
mod internal_users;
mod pumps;
mod transactions;
mod users;

pub use discord_users::{insert_discord_users, migrate_discord_users};
pub use guilds::{insert_guilds, migrate_guilds};
pub use internal_users::{insert_internal_users, migrate_internal_users};
pub use pumps::{insert_pumps, migrate_pumps};
pub use transactions::{insert_transactions, migrate_transactions};
pub use users::{insert_users, migrate_users};

use crate::error::{MigrateError, Result};
use crate::mapping::EntityKind;

/// One pipeline stage: which mapping namespaces it reads and which one it
/// fills in.
#[derive(Debug, Clone, Copy)]
pub struct StageSpec {
    pub name: &'static str,
    pub reads: &'static [EntityKind],
    pub produces: Option<EntityKind>,
}

/// The pipeline in its fixed dependency order. A stage may only read
/// namespaces filled in by an earlier stage.
pub const STAGES: [StageSpec; 6] = [
    StageSpec {
        name: "users",
        reads: &[],
        produces: Some(EntityKind::User),
    },
    StageSpec {
        name: "discord guilds",
        reads: &[],
        produces: Some(EntityKind::Guild),
    },
    StageSpec {
        name: "internal users",
        reads: &[EntityKind::User],
        produces: Some(EntityKind::InternalUser),
    },
    StageSpec {
        name: "discord users",
        reads: &[EntityKind::User],
        produces: None,
    },
    StageSpec {
        name: "transactions",
        reads: &[EntityKind::User],
        produces: None,
    },
    StageSpec {
        name: "pumps",
        reads: &[EntityKind::User, EntityKind::InternalUser],
        produces: None,
    },
];

/// Check that every namespace a stage reads is produced by an earlier stage.
pub fn validate_stage_order(stages: &[StageSpec]) -> Result<()> {
    let mut produced: Vec<EntityKind> = Vec::new();
    for stage in stages {
        for read in stage.reads {
            if !produced.contains(read) {
                return Err(MigrateError::Validation(format!(
                    "stage \"{}\" reads the {} namespace before any stage produces it",
                    stage.name, read
                )));
            }
        }
        if let Some(kind) = stage.produces {
            produced.push(kind);
        }
    }
    Ok(())
}
