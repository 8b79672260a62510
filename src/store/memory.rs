use std::sync::{Mutex, MutexGuard};

use axum::async_trait;

use super::{LogEntry, LogStore, NewLogEntry, NewUser, User, UserStore};

/// In-memory entity store used by tests and `AppState::fake()`.
///
/// Ids are assigned from a per-kind counter, simulating the database's
/// auto-increment: each create hands out the next id past everything seen
/// so far.
#[derive(Debug, Default)]
pub struct MemStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    users: Vec<User>,
    logs: Vec<LogEntry>,
    last_user_id: i64,
    last_log_id: i64,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the given users; the id counter resumes
    /// past the highest seeded id.
    pub fn with_users(users: Vec<User>) -> Self {
        let last_user_id = users.iter().map(|u| u.id).max().unwrap_or(0);
        Self {
            inner: Mutex::new(Inner {
                users,
                last_user_id,
                ..Inner::default()
            }),
        }
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("mem store mutex poisoned")
    }
}

#[async_trait]
impl UserStore for MemStore {
    async fn get_all(&self) -> anyhow::Result<Vec<User>> {
        Ok(self.inner().users.clone())
    }

    async fn get_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        Ok(self.inner().users.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, user: NewUser) -> anyhow::Result<User> {
        let mut inner = self.inner();
        inner.last_user_id += 1;
        let user = User {
            id: inner.last_user_id,
            forename: user.forename,
            surname: user.surname,
            email: user.email,
            is_active: user.is_active,
            date_of_birth: user.date_of_birth,
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> anyhow::Result<()> {
        let mut inner = self.inner();
        if let Some(slot) = inner.users.iter_mut().find(|u| u.id == user.id) {
            *slot = user.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> anyhow::Result<()> {
        self.inner().users.retain(|u| u.id != id);
        Ok(())
    }
}

#[async_trait]
impl LogStore for MemStore {
    async fn get_all(&self) -> anyhow::Result<Vec<LogEntry>> {
        Ok(self.inner().logs.clone())
    }

    async fn get_by_id(&self, id: i64) -> anyhow::Result<Option<LogEntry>> {
        Ok(self.inner().logs.iter().find(|l| l.id == id).cloned())
    }

    async fn create(&self, entry: NewLogEntry) -> anyhow::Result<LogEntry> {
        let mut inner = self.inner();
        inner.last_log_id += 1;
        let entry = LogEntry {
            id: inner.last_log_id,
            entity_ref: entry.entity_ref,
            entity_type: entry.entity_type,
            action_type: entry.action_type,
            details: entry.details,
            from: entry.from,
            to: entry.to,
            by: entry.by,
            at: entry.at,
        };
        inner.logs.push(entry.clone());
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};

    use super::super::{ActionType, EntityType};
    use super::*;

    fn new_user(forename: &str) -> NewUser {
        NewUser {
            forename: forename.into(),
            surname: "User".into(),
            email: "user@example.com".into(),
            is_active: true,
            date_of_birth: date!(1990 - 01 - 01),
        }
    }

    fn new_log(entity_ref: i64) -> NewLogEntry {
        NewLogEntry {
            entity_ref,
            entity_type: EntityType::User,
            action_type: ActionType::Create,
            details: format!("Created user {entity_ref}"),
            from: None,
            to: None,
            by: "System".into(),
            at: datetime!(2024-01-01 10:00 UTC),
        }
    }

    #[tokio::test]
    async fn user_ids_increase_monotonically() {
        let store = MemStore::new();
        let a = UserStore::create(&store, new_user("A")).await.unwrap();
        let b = UserStore::create(&store, new_user("B")).await.unwrap();
        let c = UserStore::create(&store, new_user("C")).await.unwrap();
        assert_eq!((a.id, b.id, c.id), (1, 2, 3));
    }

    #[tokio::test]
    async fn seeded_store_resumes_past_highest_id() {
        let seeded = User {
            id: 7,
            forename: "Seed".into(),
            surname: "User".into(),
            email: "seed@example.com".into(),
            is_active: true,
            date_of_birth: date!(1990 - 01 - 01),
        };
        let store = MemStore::with_users(vec![seeded]);
        let next = UserStore::create(&store, new_user("Next")).await.unwrap();
        assert_eq!(next.id, 8);
    }

    #[tokio::test]
    async fn log_ids_are_counted_separately_from_users() {
        let store = MemStore::new();
        UserStore::create(&store, new_user("A")).await.unwrap();
        UserStore::create(&store, new_user("B")).await.unwrap();
        let entry = LogStore::create(&store, new_log(1)).await.unwrap();
        assert_eq!(entry.id, 1);
    }

    #[tokio::test]
    async fn update_replaces_the_matching_row() {
        let store = MemStore::new();
        let created = UserStore::create(&store, new_user("Before")).await.unwrap();
        let updated = User {
            forename: "After".into(),
            ..created
        };
        UserStore::update(&store, &updated).await.unwrap();
        let found = UserStore::get_by_id(&store, updated.id).await.unwrap();
        assert_eq!(found.map(|u| u.forename), Some("After".to_string()));
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let store = MemStore::new();
        let created = UserStore::create(&store, new_user("Gone")).await.unwrap();
        UserStore::delete(&store, created.id).await.unwrap();
        assert!(UserStore::get_by_id(&store, created.id)
            .await
            .unwrap()
            .is_none());
    }
}
