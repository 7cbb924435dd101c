use crate::{DiscordGuild, DiscordUser, InternalUser, Pump, Transaction, User};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Sqlite, SqliteConnection, SqlitePool};
use std::path::Path;

#[derive(Clone)]
pub struct StackCoinDb {
    db: SqlitePool,
}

impl StackCoinDb {
    /// Open an existing database file. The schema must already be in place,
    /// so a missing file is a connection error rather than a reason to
    /// create an empty one.
    pub async fn open(path: &Path) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .foreign_keys(true);
        let db = SqlitePool::connect_with(options).await?;
        Ok(StackCoinDb { db })
    }

    /// Begin a transaction; all writes inside it commit or roll back as a unit.
    pub async fn begin(&self) -> Result<sqlx::Transaction<'_, Sqlite>, sqlx::Error> {
        self.db.begin().await
    }

    pub async fn close(&self) {
        self.db.close().await;
    }

    /// Row count of one table, read outside any transaction.
    pub async fn count(&self, table: &str) -> Result<i64, sqlx::Error> {
        let sql = format!("select count(*) from \"{}\"", table);
        sqlx::query_scalar(&sql).fetch_one(&self.db).await
    }
}

/// Insert a user and return the id SQLite assigned.
pub async fn insert_user(conn: &mut SqliteConnection, user: &User) -> Result<i64, sqlx::Error> {
    let res = sqlx::query(
        "insert into user (username, balance, last_given_dole, admin, banned, inserted_at, updated_at) \
         values (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&user.username)
    .bind(user.balance)
    .bind(&user.last_given_dole)
    .bind(user.admin)
    .bind(user.banned)
    .bind(&user.inserted_at)
    .bind(&user.updated_at)
    .execute(conn)
    .await?;
    Ok(res.last_insert_rowid())
}

/// Insert a guild and return the id SQLite assigned.
pub async fn insert_discord_guild(
    conn: &mut SqliteConnection,
    guild: &DiscordGuild,
) -> Result<i64, sqlx::Error> {
    let res = sqlx::query(
        "insert into discord_guild (snowflake, name, designated_channel_snowflake, last_updated) \
         values (?, ?, ?, ?)",
    )
    .bind(guild.snowflake)
    .bind(&guild.name)
    .bind(guild.designated_channel_snowflake)
    .bind(&guild.last_updated)
    .execute(conn)
    .await?;
    Ok(res.last_insert_rowid())
}

/// Insert an internal user under its owning user's id.
pub async fn insert_internal_user(
    conn: &mut SqliteConnection,
    internal_user: &InternalUser,
) -> Result<(), sqlx::Error> {
    sqlx::query("insert into internal_user (id, identifier) values (?, ?)")
        .bind(internal_user.id)
        .bind(&internal_user.identifier)
        .execute(conn)
        .await?;
    Ok(())
}

/// Insert a discord user under its owning user's id.
pub async fn insert_discord_user(
    conn: &mut SqliteConnection,
    discord_user: &DiscordUser,
) -> Result<(), sqlx::Error> {
    sqlx::query("insert into discord_user (id, snowflake, last_updated) values (?, ?, ?)")
        .bind(discord_user.id)
        .bind(discord_user.snowflake)
        .bind(&discord_user.last_updated)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn insert_transaction(
    conn: &mut SqliteConnection,
    transaction: &Transaction,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "insert into \"transaction\" (from_id, from_new_balance, to_id, to_new_balance, amount, time, label) \
         values (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(transaction.from_id)
    .bind(transaction.from_new_balance)
    .bind(transaction.to_id)
    .bind(transaction.to_new_balance)
    .bind(transaction.amount)
    .bind(&transaction.time)
    .bind(&transaction.label)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn insert_pump(conn: &mut SqliteConnection, pump: &Pump) -> Result<(), sqlx::Error> {
    sqlx::query(
        "insert into pump (signee_id, to_id, to_new_balance, amount, time, label) \
         values (?, ?, ?, ?, ?, ?)",
    )
    .bind(pump.signee_id)
    .bind(pump.to_id)
    .bind(pump.to_new_balance)
    .bind(pump.amount)
    .bind(&pump.time)
    .bind(&pump.label)
    .execute(conn)
    .await?;
    Ok(())
}

/// Row count of one destination table. Works inside an open transaction, so
/// the orchestrator can check its own uncommitted writes.
pub async fn table_count(conn: &mut SqliteConnection, table: &str) -> Result<i64, sqlx::Error> {
    let sql = format!("select count(*) from \"{}\"", table);
    sqlx::query_scalar(&sql).fetch_one(conn).await
}
