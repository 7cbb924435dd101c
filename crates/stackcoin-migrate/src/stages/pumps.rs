use crate::convert::timestamp_to_iso;
use crate::error::{MigrateError, Result};
use crate::mapping::{EntityKind, MappingRegistry};
use crate::source::{SourceDb, SourcePump};
use log::info;
use sqlx::SqliteConnection;
use stackcoin_db::Pump;

/// Migrate all pumps. The signee resolves through the user namespace, the
/// target through the internal-user namespace.
pub async fn migrate_pumps(
    source: &SourceDb,
    tx: &mut SqliteConnection,
    registry: &MappingRegistry,
) -> Result<u64> {
    let rows = source.fetch_pumps().await?;
    info!("fetched {} pumps from the legacy store", rows.len());
    insert_pumps(tx, &rows, registry).await
}

/// Convert and insert already-fetched pump rows.
pub async fn insert_pumps(
    tx: &mut SqliteConnection,
    rows: &[SourcePump],
    registry: &MappingRegistry,
) -> Result<u64> {
    let mut count = 0;
    for row in rows {
        let pump = Pump {
            signee_id: registry.resolve(EntityKind::User, row.signee_id)?,
            to_id: registry.resolve(EntityKind::InternalUser, row.to_id)?,
            to_new_balance: row.to_new_balance,
            amount: row.amount,
            time: timestamp_to_iso(row.time),
            label: row.label.clone(),
        };
        stackcoin_db::insert_pump(tx, &pump)
            .await
            .map_err(|e| MigrateError::write("pump", e))?;
        count += 1;
    }
    Ok(count)
}
