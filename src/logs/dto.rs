use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::store::{ActionType, EntityType, LogEntry};

/// Read-facing view of an audit entry; all fields verbatim from the record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRead {
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

impl From<LogEntry> for LogRead {
    fn from(entry: LogEntry) -> Self {
        Self {
            id: entry.id,
            entity_ref: entry.entity_ref,
            entity_type: entry.entity_type,
            action_type: entry.action_type,
            details: entry.details,
            from: entry.from,
            to: entry.to,
            by: entry.by,
            at: entry.at,
        }
    }
}

/// What a caller supplies to append an audit entry. The timestamp is not
/// part of the request: the engine stamps it at append time.
#[derive(Debug, Clone)]
pub struct LogWrite {
    pub entity_ref: i64,
    pub entity_type: EntityType,
    pub action_type: ActionType,
    pub details: String,
    pub from: Option<String>,
    pub to: Option<String>,
    pub by: String,
}

/// Single-entry detail view: same fields as `LogRead`, with the `from`/`to`
/// snapshots pretty-printed for display.
#[derive(Debug, Serialize)]
pub struct LogDetail {
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

#[derive(Debug, Deserialize)]
pub struct LogGridQuery {
    #[serde(default)]
    pub start: usize,
    #[serde(default = "default_length")]
    pub length: usize,
    #[serde(default)]
    pub sort: SortColumn,
    #[serde(default)]
    pub dir: SortDir,
    pub action_type: Option<ActionType>,
    pub entity_type: Option<EntityType>,
}

fn default_length() -> usize {
    20
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    #[default]
    Id,
    EntityRef,
    EntityType,
    ActionType,
    By,
    At,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Serialize)]
pub struct LogGridResponse {
    pub records_total: usize,
    pub records_filtered: usize,
    pub data: Vec<LogRead>,
}
