use crate::error::{MigrateError, Result};
use crate::mapping::{EntityKind, MappingRegistry};
use crate::source::{SourceDb, SourceInternalUser};
use log::info;
use sqlx::SqliteConnection;
use stackcoin_db::InternalUser;

/// Migrate all internal users. The table extends `user` 1:1, so each row is
/// written under the new id of its owning user rather than a generated one.
pub async fn migrate_internal_users(
    source: &SourceDb,
    tx: &mut SqliteConnection,
    registry: &mut MappingRegistry,
) -> Result<u64> {
    let rows = source.fetch_internal_users().await?;
    info!(
        "fetched {} internal users from the legacy store",
        rows.len()
    );
    insert_internal_users(tx, &rows, registry).await
}

/// Convert and insert already-fetched internal user rows.
pub async fn insert_internal_users(
    tx: &mut SqliteConnection,
    rows: &[SourceInternalUser],
    registry: &mut MappingRegistry,
) -> Result<u64> {
    let mut count = 0;
    for row in rows {
        let new_user_id = registry.resolve(EntityKind::User, row.id)?;
        let internal_user = InternalUser {
            id: new_user_id,
            identifier: row.identifier.clone(),
        };
        stackcoin_db::insert_internal_user(tx, &internal_user)
            .await
            .map_err(|e| MigrateError::write("internal_user", e))?;
        // Pump rows address internal users by the legacy user id
        registry.record(EntityKind::InternalUser, row.id, new_user_id);
        count += 1;
    }
    Ok(count)
}
