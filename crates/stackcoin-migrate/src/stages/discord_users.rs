use crate::convert::timestamp_to_iso;
use crate::error::{MigrateError, Result};
use crate::mapping::{EntityKind, MappingRegistry};
use crate::source::{SourceDb, SourceDiscordUser};
use log::info;
use sqlx::SqliteConnection;
use stackcoin_db::DiscordUser;

/// Migrate all discord users under the new ids of their owning users.
pub async fn migrate_discord_users(
    source: &SourceDb,
    tx: &mut SqliteConnection,
    registry: &MappingRegistry,
) -> Result<u64> {
    let rows = source.fetch_discord_users().await?;
    info!("fetched {} discord users from the legacy store", rows.len());
    insert_discord_users(tx, &rows, registry).await
}

/// Convert and insert already-fetched discord user rows. Nothing downstream
/// references discord users, so no mapping is recorded.
pub async fn insert_discord_users(
    tx: &mut SqliteConnection,
    rows: &[SourceDiscordUser],
    registry: &MappingRegistry,
) -> Result<u64> {
    let mut count = 0;
    for row in rows {
        let new_user_id = registry.resolve(EntityKind::User, row.id)?;
        let discord_user = DiscordUser {
            id: new_user_id,
            snowflake: row.snowflake,
            last_updated: timestamp_to_iso(row.last_updated),
        };
        stackcoin_db::insert_discord_user(tx, &discord_user)
            .await
            .map_err(|e| MigrateError::write("discord_user", e))?;
        count += 1;
    }
    Ok(count)
}
