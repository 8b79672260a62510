use axum::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};

pub mod memory;
pub mod postgres;

time::serde::format_description!(date_format, Date, "[year]-[month]-[day]");

/// Kind of entity an audit entry refers to. Only users are tracked today;
/// the tag exists so other record kinds can join the log later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i16)]
pub enum EntityType {
    User = 0,
}

/// Action recorded against an entity. `None` is a legacy schema value
/// that no service produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i16)]
pub enum ActionType {
    None = 0,
    Create = 1,
    Update = 2,
    Delete = 3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub forename: String,
    pub surname: String,
    pub email: String,
    pub is_active: bool,
    #[serde(with = "date_format")]
    pub date_of_birth: Date,
}

/// A user as handed to the store for creation; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub forename: String,
    pub surname: String,
    pub email: String,
    pub is_active: bool,
    pub date_of_birth: Date,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct LogEntry {
    pub id: i64,
    pub entity_ref: i64,
    pub entity_type: EntityType,
    pub action_type: ActionType,
    pub details: String,
    pub from: Option<String>,
    pub to: Option<String>,
    pub by: String,
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
}

/// An audit entry as handed to the store for creation; the store assigns
/// the id.
#[derive(Debug, Clone)]
pub struct NewLogEntry {
    pub entity_ref: i64,
    pub entity_type: EntityType,
    pub action_type: ActionType,
    pub details: String,
    pub from: Option<String>,
    pub to: Option<String>,
    pub by: String,
    pub at: OffsetDateTime,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_all(&self) -> anyhow::Result<Vec<User>>;
    async fn get_by_id(&self, id: i64) -> anyhow::Result<Option<User>>;
    async fn create(&self, user: NewUser) -> anyhow::Result<User>;
    async fn update(&self, user: &User) -> anyhow::Result<()>;
    async fn delete(&self, id: i64) -> anyhow::Result<()>;
}

/// Log rows are append-only: the trait exposes no update or delete.
#[async_trait]
pub trait LogStore: Send + Sync {
    async fn get_all(&self) -> anyhow::Result<Vec<LogEntry>>;
    async fn get_by_id(&self, id: i64) -> anyhow::Result<Option<LogEntry>>;
    async fn create(&self, entry: NewLogEntry) -> anyhow::Result<LogEntry>;
}
