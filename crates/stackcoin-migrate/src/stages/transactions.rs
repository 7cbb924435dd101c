use crate::convert::timestamp_to_iso;
use crate::error::{MigrateError, Result};
use crate::mapping::{EntityKind, MappingRegistry};
use crate::source::{SourceDb, SourceTransaction};
use log::info;
use sqlx::SqliteConnection;
use stackcoin_db::Transaction;

/// Migrate all transactions, rewriting both user references.
pub async fn migrate_transactions(
    source: &SourceDb,
    tx: &mut SqliteConnection,
    registry: &MappingRegistry,
) -> Result<u64> {
    let rows = source.fetch_transactions().await?;
    info!("fetched {} transactions from the legacy store", rows.len());
    insert_transactions(tx, &rows, registry).await
}

/// Convert and insert already-fetched transaction rows.
pub async fn insert_transactions(
    tx: &mut SqliteConnection,
    rows: &[SourceTransaction],
    registry: &MappingRegistry,
) -> Result<u64> {
    let mut count = 0;
    for row in rows {
        let transaction = Transaction {
            from_id: registry.resolve(EntityKind::User, row.from_id)?,
            from_new_balance: row.from_new_balance,
            to_id: registry.resolve(EntityKind::User, row.to_id)?,
            to_new_balance: row.to_new_balance,
            amount: row.amount,
            time: timestamp_to_iso(row.time),
            label: row.label.clone(),
        };
        stackcoin_db::insert_transaction(tx, &transaction)
            .await
            .map_err(|e| MigrateError::write("transaction", e))?;
        count += 1;
    }
    Ok(count)
}
