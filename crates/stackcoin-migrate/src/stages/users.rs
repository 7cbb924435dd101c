use crate::convert::{bool_to_int, timestamp_to_iso};
use crate::error::{MigrateError, Result};
use crate::mapping::{EntityKind, MappingRegistry};
use crate::source::{SourceDb, SourceUser};
use log::{debug, info};
use sqlx::SqliteConnection;
use stackcoin_db::User;

/// Migrate all users, recording the id SQLite assigns for each legacy id.
pub async fn migrate_users(
    source: &SourceDb,
    tx: &mut SqliteConnection,
    registry: &mut MappingRegistry,
) -> Result<u64> {
    let rows = source.fetch_users().await?;
    info!("fetched {} users from the legacy store", rows.len());
    insert_users(tx, &rows, registry).await
}

/// Convert and insert already-fetched user rows.
pub async fn insert_users(
    tx: &mut SqliteConnection,
    rows: &[SourceUser],
    registry: &mut MappingRegistry,
) -> Result<u64> {
    let mut count = 0;
    for row in rows {
        let user = convert_user(row)?;
        let new_id = stackcoin_db::insert_user(tx, &user)
            .await
            .map_err(|e| MigrateError::write("user", e))?;
        debug!("user {} -> {}", row.id, new_id);
        registry.record(EntityKind::User, row.id, new_id);
        count += 1;
    }
    Ok(count)
}

fn convert_user(row: &SourceUser) -> Result<User> {
    // The legacy store only tracked creation, so created_at seeds both
    // timestamps in the new schema.
    let inserted_at = timestamp_to_iso(row.created_at);
    Ok(User {
        username: row.username.clone(),
        balance: row.balance,
        last_given_dole: timestamp_to_iso(row.last_given_dole),
        admin: bool_to_int("user.admin", row.admin)?,
        banned: bool_to_int("user.banned", row.banned)?,
        updated_at: inserted_at.clone(),
        inserted_at,
    })
}
