use crate::error::{MigrateError, Result};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

/// A row of the legacy `user` table.
#[derive(Debug, Clone, FromRow)]
pub struct SourceUser {
    pub id: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub username: String,
    pub balance: i64,
    pub last_given_dole: Option<DateTime<Utc>>,
    pub admin: Option<bool>,
    pub banned: Option<bool>,
}

/// A row of the legacy `discord_guild` table.
#[derive(Debug, Clone, FromRow)]
pub struct SourceGuild {
    pub id: i64,
    pub snowflake: i64,
    pub name: String,
    pub designated_channel_snowflake: Option<i64>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// A row of the legacy `internal_user` table. `id` is the owning user's id.
#[derive(Debug, Clone, FromRow)]
pub struct SourceInternalUser {
    pub id: i64,
    pub identifier: String,
}

/// A row of the legacy `discord_user` table. `id` is the owning user's id.
#[derive(Debug, Clone, FromRow)]
pub struct SourceDiscordUser {
    pub id: i64,
    pub snowflake: i64,
    pub last_updated: Option<DateTime<Utc>>,
}

/// A row of the legacy `transaction` table.
#[derive(Debug, Clone, FromRow)]
pub struct SourceTransaction {
    pub id: i64,
    pub from_id: i64,
    pub from_new_balance: i64,
    pub to_id: i64,
    pub to_new_balance: i64,
    pub amount: i64,
    pub time: Option<DateTime<Utc>>,
    pub label: Option<String>,
}

/// A row of the legacy `pump` table.
#[derive(Debug, Clone, FromRow)]
pub struct SourcePump {
    pub id: i64,
    pub signee_id: i64,
    pub to_id: i64,
    pub to_new_balance: i64,
    pub amount: i64,
    pub time: Option<DateTime<Utc>>,
    pub label: Option<String>,
}

/// Read-only handle on the legacy PostgreSQL store. Every fetch is exhaustive
/// and ordered by the old id, which keeps a run deterministic for a given
/// source snapshot.
pub struct SourceDb {
    db: PgPool,
}

impl SourceDb {
    pub async fn connect(dsn: &str) -> Result<Self> {
        let db = PgPool::connect(dsn)
            .await
            .map_err(MigrateError::Connection)?;
        Ok(SourceDb { db })
    }

    pub async fn close(&self) {
        self.db.close().await;
    }

    pub async fn fetch_users(&self) -> Result<Vec<SourceUser>> {
        sqlx::query_as(
            "select id, created_at, username, balance, last_given_dole, admin, banned \
             from \"user\" order by id",
        )
        .fetch_all(&self.db)
        .await
        .map_err(|e| MigrateError::read("user", e))
    }

    pub async fn fetch_guilds(&self) -> Result<Vec<SourceGuild>> {
        sqlx::query_as(
            "select id, snowflake, name, designated_channel_snowflake, last_updated \
             from discord_guild order by id",
        )
        .fetch_all(&self.db)
        .await
        .map_err(|e| MigrateError::read("discord_guild", e))
    }

    pub async fn fetch_internal_users(&self) -> Result<Vec<SourceInternalUser>> {
        sqlx::query_as("select id, identifier from internal_user order by id")
            .fetch_all(&self.db)
            .await
            .map_err(|e| MigrateError::read("internal_user", e))
    }

    pub async fn fetch_discord_users(&self) -> Result<Vec<SourceDiscordUser>> {
        sqlx::query_as("select id, snowflake, last_updated from discord_user order by id")
            .fetch_all(&self.db)
            .await
            .map_err(|e| MigrateError::read("discord_user", e))
    }

    pub async fn fetch_transactions(&self) -> Result<Vec<SourceTransaction>> {
        sqlx::query_as(
            "select id, from_id, from_new_balance, to_id, to_new_balance, amount, time, label \
             from \"transaction\" order by id",
        )
        .fetch_all(&self.db)
        .await
        .map_err(|e| MigrateError::read("transaction", e))
    }

    pub async fn fetch_pumps(&self) -> Result<Vec<SourcePump>> {
        sqlx::query_as(
            "select id, signee_id, to_id, to_new_balance, amount, time, label \
             from pump order by id",
        )
        .fetch_all(&self.db)
        .await
        .map_err(|e| MigrateError::read("pump", e))
    }

    /// Row count of one legacy table, used by verification.
    pub async fn count(&self, table: &'static str) -> Result<i64> {
        let sql = format!("select count(*) from \"{}\"", table);
        sqlx::query_scalar(&sql)
            .fetch_one(&self.db)
            .await
            .map_err(|e| MigrateError::read(table, e))
    }
}
