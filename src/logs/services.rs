use std::sync::Arc;

use time::OffsetDateTime;
use tracing::debug;

use crate::error::ServiceError;
use crate::store::{LogStore, NewLogEntry};

use super::dto::{LogRead, LogWrite};

/// Records and retrieves the immutable history of actions taken against
/// tracked entities. Sole writer of log records.
#[derive(Clone)]
pub struct LogService {
    store: Arc<dyn LogStore>,
}

impl LogService {
    pub fn new(store: Arc<dyn LogStore>) -> Self {
        Self { store }
    }

    pub async fn get_all(&self) -> Result<Vec<LogRead>, ServiceError> {
        let entries = self.store.get_all().await?;
        Ok(entries.into_iter().map(LogRead::from).collect())
    }

    /// Appends one audit entry. The timestamp is stamped here, at append
    /// time; the store assigns the id. Awaited to completion so the
    /// caller's enclosing operation cannot finish before the entry lands.
    pub async fn append(&self, entry: LogWrite) -> Result<(), ServiceError> {
        let entry = self
            .store
            .create(NewLogEntry {
                entity_ref: entry.entity_ref,
                entity_type: entry.entity_type,
                action_type: entry.action_type,
                details: entry.details,
                from: entry.from,
                to: entry.to,
                by: entry.by,
                at: OffsetDateTime::now_utc(),
            })
            .await?;
        debug!(
            log_id = entry.id,
            entity_ref = entry.entity_ref,
            action = ?entry.action_type,
            "audit entry appended"
        );
        Ok(())
    }

    pub async fn get_log(&self, id: i64) -> Result<LogRead, ServiceError> {
        self.store
            .get_by_id(id)
            .await?
            .map(LogRead::from)
            .ok_or_else(|| ServiceError::NotFound(format!("Log with Id {id} not found")))
    }
}
