//! Pipeline tests: synthetic legacy rows driven through the insert half of
//! each stage against an in-memory SQLite destination.

use chrono::{DateTime, TimeZone, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use stackcoin_migrate::source::{
    SourceDiscordUser, SourceGuild, SourceInternalUser, SourcePump, SourceTransaction, SourceUser,
};
use stackcoin_migrate::stages::{
    insert_discord_users, insert_guilds, insert_internal_users, insert_pumps, insert_transactions,
    insert_users,
};
use stackcoin_migrate::{EntityKind, MappingRegistry, MigrateError};
use std::str::FromStr;

const SCHEMA: &str = r#"
create table user (
    id integer primary key autoincrement,
    username text not null,
    balance integer not null,
    last_given_dole text,
    admin integer not null,
    banned integer not null,
    inserted_at text,
    updated_at text
);
create table discord_guild (
    id integer primary key autoincrement,
    snowflake integer not null,
    name text not null,
    designated_channel_snowflake integer,
    last_updated text
);
create table internal_user (
    id integer primary key references user(id),
    identifier text not null
);
create table discord_user (
    id integer primary key references user(id),
    snowflake integer not null,
    last_updated text
);
create table "transaction" (
    id integer primary key autoincrement,
    from_id integer not null references user(id),
    from_new_balance integer not null,
    to_id integer not null references user(id),
    to_new_balance integer not null,
    amount integer not null,
    time text,
    label text
);
create table pump (
    id integer primary key autoincrement,
    signee_id integer not null references user(id),
    to_id integer not null references internal_user(id),
    to_new_balance integer not null,
    amount integer not null,
    time text,
    label text
);
"#;

/// One-connection pool so the in-memory database is shared between the run
/// transaction and the assertions that follow it.
async fn dest_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    sqlx::raw_sql(SCHEMA).execute(&pool).await.unwrap();
    pool
}

fn created() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap()
}

fn source_user(id: i64, username: &str) -> SourceUser {
    SourceUser {
        id,
        created_at: Some(created()),
        username: username.to_string(),
        balance: 100,
        last_given_dole: None,
        admin: Some(false),
        banned: Some(false),
    }
}

#[tokio::test]
async fn test_users_get_fresh_sequential_ids() {
    let pool = dest_pool().await;
    let mut registry = MappingRegistry::new();
    let users = [
        source_user(10, "alice"),
        source_user(11, "bob"),
        source_user(12, "carol"),
    ];

    let mut tx = pool.begin().await.unwrap();
    let count = insert_users(&mut tx, &users, &mut registry).await.unwrap();
    tx.commit().await.unwrap();

    assert_eq!(count, 3);
    assert_eq!(registry.resolve(EntityKind::User, 10).unwrap(), 1);
    assert_eq!(registry.resolve(EntityKind::User, 11).unwrap(), 2);
    assert_eq!(registry.resolve(EntityKind::User, 12).unwrap(), 3);

    let rows: i64 = sqlx::query_scalar("select count(*) from user")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 3);
}

#[tokio::test]
async fn test_transaction_references_are_rewritten() {
    let pool = dest_pool().await;
    let mut registry = MappingRegistry::new();
    let users = [
        source_user(10, "alice"),
        source_user(11, "bob"),
        source_user(12, "carol"),
    ];
    let transactions = [SourceTransaction {
        id: 1,
        from_id: 10,
        from_new_balance: 95,
        to_id: 11,
        to_new_balance: 105,
        amount: 5,
        time: Some(created()),
        label: Some("lunch".to_string()),
    }];

    let mut tx = pool.begin().await.unwrap();
    insert_users(&mut tx, &users, &mut registry).await.unwrap();
    let count = insert_transactions(&mut tx, &transactions, &registry)
        .await
        .unwrap();
    tx.commit().await.unwrap();
    assert_eq!(count, 1);

    let (from_id, to_id, amount): (i64, i64, i64) =
        sqlx::query_as("select from_id, to_id, amount from \"transaction\"")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(from_id, 1);
    assert_eq!(to_id, 2);
    assert_eq!(amount, 5);
}

#[tokio::test]
async fn test_dangling_reference_rolls_back_everything() {
    let pool = dest_pool().await;
    let mut registry = MappingRegistry::new();
    let users = [source_user(10, "alice"), source_user(11, "bob")];
    // 99 was never a user
    let transactions = [SourceTransaction {
        id: 1,
        from_id: 10,
        from_new_balance: 95,
        to_id: 99,
        to_new_balance: 105,
        amount: 5,
        time: None,
        label: None,
    }];

    let mut tx = pool.begin().await.unwrap();
    insert_users(&mut tx, &users, &mut registry).await.unwrap();
    let err = insert_transactions(&mut tx, &transactions, &registry)
        .await
        .unwrap_err();
    match err {
        MigrateError::MissingMapping { kind, old_id } => {
            assert_eq!(kind, EntityKind::User);
            assert_eq!(old_id, 99);
        }
        other => panic!("expected a missing mapping, got {other}"),
    }
    tx.rollback().await.unwrap();

    // The run aborted, so not even the users survive
    for table in ["user", "\"transaction\""] {
        let rows: i64 = sqlx::query_scalar(&format!("select count(*) from {table}"))
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(rows, 0, "{table} should be empty after rollback");
    }
}

#[tokio::test]
async fn test_null_last_dole_stays_null() {
    let pool = dest_pool().await;
    let mut registry = MappingRegistry::new();
    let users = [source_user(10, "alice")];

    let mut tx = pool.begin().await.unwrap();
    insert_users(&mut tx, &users, &mut registry).await.unwrap();
    tx.commit().await.unwrap();

    let last_given_dole: Option<String> =
        sqlx::query_scalar("select last_given_dole from user where id = 1")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(last_given_dole, None);
}

#[tokio::test]
async fn test_timestamps_seed_both_audit_columns() {
    let pool = dest_pool().await;
    let mut registry = MappingRegistry::new();
    let users = [source_user(10, "alice")];

    let mut tx = pool.begin().await.unwrap();
    insert_users(&mut tx, &users, &mut registry).await.unwrap();
    tx.commit().await.unwrap();

    let (inserted_at, updated_at): (Option<String>, Option<String>) =
        sqlx::query_as("select inserted_at, updated_at from user where id = 1")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(inserted_at.as_deref(), Some("2021-03-04T05:06:07+00:00"));
    assert_eq!(inserted_at, updated_at);
}

#[tokio::test]
async fn test_extension_tables_reuse_user_ids() {
    let pool = dest_pool().await;
    let mut registry = MappingRegistry::new();
    let users = [source_user(10, "stackcoin bank"), source_user(11, "alice")];
    let internal_users = [SourceInternalUser {
        id: 10,
        identifier: "bank".to_string(),
    }];
    let discord_users = [SourceDiscordUser {
        id: 11,
        snowflake: 123456789012345678,
        last_updated: Some(created()),
    }];

    let mut tx = pool.begin().await.unwrap();
    insert_users(&mut tx, &users, &mut registry).await.unwrap();
    insert_internal_users(&mut tx, &internal_users, &mut registry)
        .await
        .unwrap();
    insert_discord_users(&mut tx, &discord_users, &registry)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    // Extension rows carry the new user id, not a generated one
    let internal_id: i64 = sqlx::query_scalar("select id from internal_user")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(internal_id, registry.resolve(EntityKind::User, 10).unwrap());
    assert_eq!(
        registry.resolve(EntityKind::InternalUser, 10).unwrap(),
        internal_id
    );

    let discord_id: i64 = sqlx::query_scalar("select id from discord_user")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(discord_id, registry.resolve(EntityKind::User, 11).unwrap());
}

#[tokio::test]
async fn test_pump_resolves_signee_and_target() {
    let pool = dest_pool().await;
    let mut registry = MappingRegistry::new();
    let users = [source_user(10, "alice"), source_user(11, "stackcoin bank")];
    let internal_users = [SourceInternalUser {
        id: 11,
        identifier: "bank".to_string(),
    }];
    let pumps = [SourcePump {
        id: 1,
        signee_id: 10,
        to_id: 11,
        to_new_balance: 1000,
        amount: 500,
        time: Some(created()),
        label: Some("initial supply".to_string()),
    }];

    let mut tx = pool.begin().await.unwrap();
    insert_users(&mut tx, &users, &mut registry).await.unwrap();
    insert_internal_users(&mut tx, &internal_users, &mut registry)
        .await
        .unwrap();
    let count = insert_pumps(&mut tx, &pumps, &registry).await.unwrap();
    tx.commit().await.unwrap();
    assert_eq!(count, 1);

    let (signee_id, to_id): (i64, i64) = sqlx::query_as("select signee_id, to_id from pump")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(signee_id, 1);
    assert_eq!(to_id, 2);
}

#[tokio::test]
async fn test_absent_boolean_aborts() {
    let pool = dest_pool().await;
    let mut registry = MappingRegistry::new();
    let mut user = source_user(10, "alice");
    user.admin = None;

    let mut tx = pool.begin().await.unwrap();
    let err = insert_users(&mut tx, &[user], &mut registry)
        .await
        .unwrap_err();
    match err {
        MigrateError::Conversion { field, .. } => assert_eq!(field, "user.admin"),
        other => panic!("expected a conversion error, got {other}"),
    }
}

#[tokio::test]
async fn test_guilds_migrate_independently() {
    let pool = dest_pool().await;
    let mut registry = MappingRegistry::new();
    let guilds = [
        SourceGuild {
            id: 3,
            snowflake: 111111111111111111,
            name: "stackcoin hq".to_string(),
            designated_channel_snowflake: Some(222222222222222222),
            last_updated: Some(created()),
        },
        SourceGuild {
            id: 7,
            snowflake: 333333333333333333,
            name: "test server".to_string(),
            designated_channel_snowflake: None,
            last_updated: None,
        },
    ];

    // No user stage ran; guilds must not need any prior namespace
    let mut tx = pool.begin().await.unwrap();
    let count = insert_guilds(&mut tx, &guilds, &mut registry).await.unwrap();
    tx.commit().await.unwrap();

    assert_eq!(count, 2);
    assert_eq!(registry.resolve(EntityKind::Guild, 3).unwrap(), 1);
    assert_eq!(registry.resolve(EntityKind::Guild, 7).unwrap(), 2);
}
