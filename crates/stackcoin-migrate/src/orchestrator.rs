use crate::error::{MigrateError, Result};
use crate::mapping::MappingRegistry;
use crate::source::SourceDb;
use crate::stages::{self, validate_stage_order, STAGES};
use log::{error, info, warn};
use sqlx::SqliteConnection;
use stackcoin_db::{table_count, StackCoinDb};
use std::path::Path;

/// Destination tables, in migration order. Legacy tables carry the same
/// names, which verification relies on.
const TABLES: [&str; 6] = [
    "user",
    "discord_guild",
    "internal_user",
    "discord_user",
    "transaction",
    "pump",
];

/// Per-kind row counts for a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationSummary {
    pub users: u64,
    pub guilds: u64,
    pub internal_users: u64,
    pub discord_users: u64,
    pub transactions: u64,
    pub pumps: u64,
}

impl MigrationSummary {
    pub fn total(&self) -> u64 {
        self.users
            + self.guilds
            + self.internal_users
            + self.discord_users
            + self.transactions
            + self.pumps
    }

    fn expected(&self, table: &str) -> u64 {
        match table {
            "user" => self.users,
            "discord_guild" => self.guilds,
            "internal_user" => self.internal_users,
            "discord_user" => self.discord_users,
            "transaction" => self.transactions,
            "pump" => self.pumps,
            _ => 0,
        }
    }
}

/// Runs the entity migrators in their fixed dependency order and owns the
/// commit/rollback decision for the whole run.
pub struct Orchestrator {
    source: SourceDb,
    dest: StackCoinDb,
}

impl Orchestrator {
    /// Connect to both stores. Nothing is migrated if either is unreachable.
    pub async fn connect(source_dsn: &str, dest_path: &Path) -> Result<Self> {
        let source = SourceDb::connect(source_dsn).await?;
        let dest = StackCoinDb::open(dest_path)
            .await
            .map_err(MigrateError::Connection)?;
        info!("connected to both databases");
        Ok(Orchestrator { source, dest })
    }

    /// Run the full pipeline under a single destination transaction: either
    /// every stage's rows land, or the destination keeps none of them. With
    /// `dry_run` the transaction is rolled back after verification instead of
    /// committed.
    pub async fn run(&self, dry_run: bool) -> Result<MigrationSummary> {
        validate_stage_order(&STAGES)?;

        let mut tx = self.dest.begin().await.map_err(MigrateError::Tx)?;
        let mut registry = MappingRegistry::new();

        let result = match self.run_stages(&mut tx, &mut registry).await {
            Ok(summary) => verify_written(&mut tx, &summary).await.map(|_| summary),
            Err(e) => Err(e),
        };

        match result {
            Ok(summary) => {
                if dry_run {
                    info!("dry run: rolling back {} rows", summary.total());
                    tx.rollback().await.map_err(MigrateError::Tx)?;
                } else {
                    tx.commit().await.map_err(MigrateError::Tx)?;
                    info!("committed {} rows", summary.total());
                }
                Ok(summary)
            }
            Err(e) => {
                error!("migration failed, rolling back: {e}");
                if let Err(rollback_err) = tx.rollback().await {
                    error!("rollback failed: {rollback_err}");
                }
                Err(e)
            }
        }
    }

    async fn run_stages(
        &self,
        tx: &mut SqliteConnection,
        registry: &mut MappingRegistry,
    ) -> Result<MigrationSummary> {
        info!("migrating users");
        let users = stages::migrate_users(&self.source, tx, registry).await?;
        info!("migrated {users} users");

        info!("migrating discord guilds");
        let guilds = stages::migrate_guilds(&self.source, tx, registry).await?;
        info!("migrated {guilds} discord guilds");

        info!("migrating internal users");
        let internal_users = stages::migrate_internal_users(&self.source, tx, registry).await?;
        info!("migrated {internal_users} internal users");

        info!("migrating discord users");
        let discord_users = stages::migrate_discord_users(&self.source, tx, registry).await?;
        info!("migrated {discord_users} discord users");

        info!("migrating transactions");
        let transactions = stages::migrate_transactions(&self.source, tx, registry).await?;
        info!("migrated {transactions} transactions");

        info!("migrating pumps");
        let pumps = stages::migrate_pumps(&self.source, tx, registry).await?;
        info!("migrated {pumps} pumps");

        Ok(MigrationSummary {
            users,
            guilds,
            internal_users,
            discord_users,
            transactions,
            pumps,
        })
    }

    /// Compare per-table row counts between the two stores, for checking a
    /// previously committed run.
    pub async fn verify(&self) -> Result<()> {
        let mut mismatches = Vec::new();
        for table in TABLES {
            let source_count = self.source.count(table).await?;
            let dest_count = self.dest.count(table).await.map_err(|e| {
                MigrateError::Validation(format!("cannot count {table} in destination: {e}"))
            })?;
            if source_count == dest_count {
                info!("{table}: {source_count} rows (match)");
            } else {
                warn!("{table}: source={source_count} destination={dest_count} (mismatch)");
                mismatches.push(format!(
                    "{table}: source={source_count} destination={dest_count}"
                ));
            }
        }
        if mismatches.is_empty() {
            Ok(())
        } else {
            Err(MigrateError::Validation(mismatches.join(", ")))
        }
    }

    /// Close both connections. Called on every exit path.
    pub async fn close(&self) {
        self.source.close().await;
        self.dest.close().await;
    }
}

/// Check, inside the still-open transaction, that every table holds exactly
/// the rows the stages reported writing.
async fn verify_written(tx: &mut SqliteConnection, summary: &MigrationSummary) -> Result<()> {
    for table in TABLES {
        let expected = summary.expected(table);
        let actual = table_count(tx, table).await.map_err(|e| {
            MigrateError::Validation(format!("cannot count {table} in destination: {e}"))
        })?;
        if actual != expected as i64 {
            return Err(MigrateError::Validation(format!(
                "{table}: wrote {expected} rows but the destination reports {actual}"
            )));
        }
    }
    Ok(())
}
