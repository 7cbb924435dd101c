use sqlx::FromRow;

/// A StackCoin account holder. Timestamps are ISO-8601 text, flags are 0/1
/// integers, matching what the SQLite schema stores.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    /// Display name of the account
    pub username: String,
    /// Current balance in STK
    pub balance: i64,
    /// When the user last received their dole, if ever
    pub last_given_dole: Option<String>,
    /// 1 if the user is an admin
    pub admin: i64,
    /// 1 if the user is banned
    pub banned: i64,
    /// When the account was created
    pub inserted_at: Option<String>,
    /// When the account was last modified
    pub updated_at: Option<String>,
}

/// A Discord guild the bot operates in.
#[derive(Debug, Clone, FromRow)]
pub struct DiscordGuild {
    /// Discord snowflake of the guild
    pub snowflake: i64,
    /// Guild name at last sync
    pub name: String,
    /// Channel the bot is restricted to, if designated
    pub designated_channel_snowflake: Option<i64>,
    /// When the guild record was last refreshed
    pub last_updated: Option<String>,
}

/// Bot/system account extending a [User] row 1:1. The `id` is the owning
/// user's id, not a generated one.
#[derive(Debug, Clone, FromRow)]
pub struct InternalUser {
    /// Owning user id
    pub id: i64,
    /// Stable identifier string for the internal account
    pub identifier: String,
}

/// Discord account extending a [User] row 1:1.
#[derive(Debug, Clone, FromRow)]
pub struct DiscordUser {
    /// Owning user id
    pub id: i64,
    /// Discord snowflake of the account
    pub snowflake: i64,
    /// When the account record was last refreshed
    pub last_updated: Option<String>,
}

/// A transfer of STK between two users.
#[derive(Debug, Clone, FromRow)]
pub struct Transaction {
    /// Sending user id
    pub from_id: i64,
    /// Sender's balance after the transfer
    pub from_new_balance: i64,
    /// Receiving user id
    pub to_id: i64,
    /// Receiver's balance after the transfer
    pub to_new_balance: i64,
    /// Amount transferred in STK
    pub amount: i64,
    /// When the transfer happened
    pub time: Option<String>,
    /// Free-form label
    pub label: Option<String>,
}

/// STK minted into an internal account, signed off by a user.
#[derive(Debug, Clone, FromRow)]
pub struct Pump {
    /// User who signed the pump
    pub signee_id: i64,
    /// Receiving internal user id
    pub to_id: i64,
    /// Receiver's balance after the pump
    pub to_new_balance: i64,
    /// Amount minted in STK
    pub amount: i64,
    /// When the pump happened
    pub time: Option<String>,
    /// Free-form label
    pub label: Option<String>,
}
