use crate::convert::timestamp_to_iso;
use crate::error::{MigrateError, Result};
use crate::mapping::{EntityKind, MappingRegistry};
use crate::source::{SourceDb, SourceGuild};
use log::{debug, info};
use sqlx::SqliteConnection;
use stackcoin_db::DiscordGuild;

/// Migrate all guilds. Guilds reference nothing and nothing in the pipeline
/// references them; their mapping is still recorded for callers that want it.
pub async fn migrate_guilds(
    source: &SourceDb,
    tx: &mut SqliteConnection,
    registry: &mut MappingRegistry,
) -> Result<u64> {
    let rows = source.fetch_guilds().await?;
    info!("fetched {} discord guilds from the legacy store", rows.len());
    insert_guilds(tx, &rows, registry).await
}

/// Convert and insert already-fetched guild rows.
pub async fn insert_guilds(
    tx: &mut SqliteConnection,
    rows: &[SourceGuild],
    registry: &mut MappingRegistry,
) -> Result<u64> {
    let mut count = 0;
    for row in rows {
        let guild = DiscordGuild {
            snowflake: row.snowflake,
            name: row.name.clone(),
            designated_channel_snowflake: row.designated_channel_snowflake,
            last_updated: timestamp_to_iso(row.last_updated),
        };
        let new_id = stackcoin_db::insert_discord_guild(tx, &guild)
            .await
            .map_err(|e| MigrateError::write("discord_guild", e))?;
        debug!("discord guild {} -> {}", row.id, new_id);
        registry.record(EntityKind::Guild, row.id, new_id);
        count += 1;
    }
    Ok(count)
}
