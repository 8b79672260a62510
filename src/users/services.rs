use std::sync::Arc;

use tracing::info;

use crate::error::ServiceError;
use crate::logs::dto::LogWrite;
use crate::logs::services::LogService;
use crate::store::{ActionType, EntityType, NewUser, User, UserStore};

use super::dto::{UserRead, UserWrite};

/// CRUD over the user roster. Every mutation writes exactly one audit
/// entry through the log service; there is no transaction spanning the
/// two writes, so a failure between them leaves the primary mutation in
/// place unaudited rather than rolling it back.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    audit: LogService,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, audit: LogService) -> Self {
        Self { store, audit }
    }

    pub async fn get_all(&self) -> Result<Vec<UserRead>, ServiceError> {
        let users = self.store.get_all().await?;
        Ok(users.into_iter().map(UserRead::from).collect())
    }

    /// Users whose active flag equals the argument.
    pub async fn filter_by_active(&self, is_active: bool) -> Result<Vec<UserRead>, ServiceError> {
        let users = self.store.get_all().await?;
        Ok(users
            .into_iter()
            .filter(|u| u.is_active == is_active)
            .map(UserRead::from)
            .collect())
    }

    pub async fn get_user(&self, id: i64) -> Result<UserRead, ServiceError> {
        self.store
            .get_by_id(id)
            .await?
            .map(UserRead::from)
            .ok_or_else(|| ServiceError::NotFound(format!("User with Id {id} not found")))
    }

    /// Persists a new user (the store assigns the id), audits the create,
    /// and returns the new id.
    pub async fn create_user(&self, req: UserWrite) -> Result<i64, ServiceError> {
        let user = self
            .store
            .create(NewUser {
                forename: req.forename,
                surname: req.surname,
                email: req.email,
                is_active: req.is_active,
                date_of_birth: req.date_of_birth,
            })
            .await?;

        self.audit
            .append(LogWrite {
                entity_ref: user.id,
                entity_type: EntityType::User,
                action_type: ActionType::Create,
                details: format!("Created user {}", user.id),
                from: None,
                to: None,
                by: req.by,
            })
            .await?;

        info!(user_id = user.id, "user created");
        Ok(user.id)
    }

    /// Overwrites every writable field of an existing user, audits the
    /// update with before/after snapshots, and returns the updated view.
    pub async fn update_user(&self, req: UserWrite) -> Result<UserRead, ServiceError> {
        let id = req.id.ok_or_else(|| {
            ServiceError::InvalidArgument("User ID must be provided for update.".into())
        })?;

        let existing = self
            .store
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User with ID {id} not found.")))?;
        let before = serde_json::to_string(&UserRead::from(existing))?;

        let updated = User {
            id,
            forename: req.forename,
            surname: req.surname,
            email: req.email,
            is_active: req.is_active,
            date_of_birth: req.date_of_birth,
        };
        self.store.update(&updated).await?;

        let view = UserRead::from(updated);
        let after = serde_json::to_string(&view)?;

        self.audit
            .append(LogWrite {
                entity_ref: id,
                entity_type: EntityType::User,
                action_type: ActionType::Update,
                details: format!("Updated user {id}"),
                from: Some(before),
                to: Some(after),
                by: req.by,
            })
            .await?;

        info!(user_id = id, "user updated");
        Ok(view)
    }

    /// Removes a user. The audit entry is written before the store delete;
    /// create and update audit after their mutation instead.
    pub async fn delete_user(&self, id: i64, by: &str) -> Result<(), ServiceError> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User with ID {id} not found.")))?;

        self.audit
            .append(LogWrite {
                entity_ref: id,
                entity_type: EntityType::User,
                action_type: ActionType::Delete,
                details: format!("Deleted user {id}"),
                from: None,
                to: None,
                by: by.to_string(),
            })
            .await?;

        self.store.delete(id).await?;

        info!(user_id = id, "user deleted");
        Ok(())
    }
}

#[cfg(test)]
mod service_tests {
    use axum::async_trait;
    use time::macros::date;

    use crate::store::memory::MemStore;
    use crate::store::{LogEntry, LogStore, NewUser};

    use super::*;

    fn roster() -> Vec<User> {
        vec![
            User {
                id: 1,
                forename: "Johnny".into(),
                surname: "User".into(),
                email: "juser@example.com".into(),
                is_active: true,
                date_of_birth: date!(1990 - 01 - 01),
            },
            User {
                id: 2,
                forename: "Jane".into(),
                surname: "Doe".into(),
                email: "jdoe@example.com".into(),
                is_active: false,
                date_of_birth: date!(1985 - 05 - 05),
            },
        ]
    }

    fn service() -> (UserService, Arc<MemStore>) {
        let store = Arc::new(MemStore::with_users(roster()));
        let audit = LogService::new(store.clone());
        (UserService::new(store.clone(), audit), store)
    }

    async fn audit_rows(store: &MemStore) -> Vec<LogEntry> {
        LogStore::get_all(store).await.expect("log store get_all")
    }

    fn write(id: Option<i64>) -> UserWrite {
        UserWrite {
            id,
            forename: "John".into(),
            surname: "Doe".into(),
            email: "john@example.com".into(),
            is_active: true,
            date_of_birth: date!(1990 - 01 - 01),
            by: "Tester".into(),
        }
    }

    #[tokio::test]
    async fn get_all_returns_the_whole_roster() {
        let (service, _) = service();
        let users = service.get_all().await.unwrap();
        assert_eq!(
            users,
            roster().into_iter().map(UserRead::from).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn filter_by_active_partitions_the_roster() {
        let (service, _) = service();

        let active = service.filter_by_active(true).await.unwrap();
        let inactive = service.filter_by_active(false).await.unwrap();

        assert_eq!(active.iter().map(|u| u.id).collect::<Vec<_>>(), vec![1]);
        assert_eq!(inactive.iter().map(|u| u.id).collect::<Vec<_>>(), vec![2]);
        assert_eq!(
            active.len() + inactive.len(),
            service.get_all().await.unwrap().len()
        );
    }

    #[tokio::test]
    async fn get_user_returns_the_matching_view() {
        let (service, _) = service();
        let user = service.get_user(1).await.unwrap();
        assert_eq!(user, UserRead::from(roster().remove(0)));
    }

    #[tokio::test]
    async fn get_user_unknown_id_is_not_found() {
        let (service, _) = service();
        let err = service.get_user(123).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(err.to_string(), "User with Id 123 not found");
    }

    #[tokio::test]
    async fn create_user_assigns_the_next_id() {
        let (service, _) = service();
        let id = service.create_user(write(None)).await.unwrap();
        assert_eq!(id, 3);

        let created = service.get_user(3).await.unwrap();
        assert_eq!(created.forename, "John");
        assert_eq!(created.email, "john@example.com");
    }

    #[tokio::test]
    async fn create_user_audits_exactly_one_create_entry() {
        let (service, store) = service();
        let id = service.create_user(write(None)).await.unwrap();

        let rows = audit_rows(&store).await;
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.action_type, ActionType::Create);
        assert_eq!(row.entity_type, EntityType::User);
        assert_eq!(row.entity_ref, id);
        assert_eq!(row.details, format!("Created user {id}"));
        assert_eq!(row.from, None);
        assert_eq!(row.to, None);
        assert_eq!(row.by, "Tester");
    }

    #[tokio::test]
    async fn update_user_overwrites_every_writable_field() {
        let (service, _) = service();
        let updated = UserWrite {
            id: Some(1),
            forename: "Updated".into(),
            surname: "Name".into(),
            email: "updated@example.com".into(),
            is_active: false,
            date_of_birth: date!(1995 - 05 - 05),
            by: "Tester".into(),
        };

        let view = service.update_user(updated).await.unwrap();

        assert_eq!(view.id, 1);
        assert_eq!(view.forename, "Updated");
        assert_eq!(view.surname, "Name");
        assert_eq!(view.email, "updated@example.com");
        assert!(!view.is_active);
        assert_eq!(view.date_of_birth, date!(1995 - 05 - 05));
        assert_eq!(service.get_user(1).await.unwrap(), view);
    }

    #[tokio::test]
    async fn update_user_audits_before_and_after_snapshots() {
        let (service, store) = service();
        let updated = UserWrite {
            id: Some(1),
            forename: "Updated".into(),
            surname: "Name".into(),
            email: "updated@example.com".into(),
            is_active: false,
            date_of_birth: date!(1995 - 05 - 05),
            by: "Tester".into(),
        };
        service.update_user(updated).await.unwrap();

        let rows = audit_rows(&store).await;
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.action_type, ActionType::Update);
        assert_eq!(row.entity_ref, 1);

        let from: serde_json::Value =
            serde_json::from_str(row.from.as_deref().unwrap()).unwrap();
        let to: serde_json::Value = serde_json::from_str(row.to.as_deref().unwrap()).unwrap();
        assert_eq!(from["forename"], "Johnny");
        assert_eq!(to["forename"], "Updated");
        assert_eq!(from["is_active"], true);
        assert_eq!(to["is_active"], false);
    }

    #[tokio::test]
    async fn update_user_without_id_is_invalid() {
        let (service, store) = service();
        let err = service.update_user(write(None)).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));
        assert_eq!(err.to_string(), "User ID must be provided for update.");
        assert!(audit_rows(&store).await.is_empty());
    }

    #[tokio::test]
    async fn update_user_unknown_id_is_not_found() {
        let (service, store) = service();
        let err = service.update_user(write(Some(999))).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(err.to_string(), "User with ID 999 not found.");
        assert!(audit_rows(&store).await.is_empty());
    }

    #[tokio::test]
    async fn delete_user_removes_the_user_and_audits() {
        let (service, store) = service();
        service.delete_user(1, "Tester").await.unwrap();

        let remaining = service.get_all().await.unwrap();
        assert_eq!(remaining.iter().map(|u| u.id).collect::<Vec<_>>(), vec![2]);

        let rows = audit_rows(&store).await;
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.action_type, ActionType::Delete);
        assert_eq!(row.entity_type, EntityType::User);
        assert_eq!(row.entity_ref, 1);
        assert_eq!(row.details, "Deleted user 1");
        assert_eq!(row.from, None);
        assert_eq!(row.to, None);
        assert_eq!(row.by, "Tester");
    }

    #[tokio::test]
    async fn delete_user_unknown_id_writes_no_log() {
        let (service, store) = service();
        let err = service.delete_user(123, "Tester").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(err.to_string(), "User with ID 123 not found.");
        assert!(audit_rows(&store).await.is_empty());
    }

    /// Wrapper whose delete always fails, to observe the write order of
    /// the delete path.
    struct NoDeleteStore(Arc<MemStore>);

    #[async_trait]
    impl UserStore for NoDeleteStore {
        async fn get_all(&self) -> anyhow::Result<Vec<User>> {
            UserStore::get_all(self.0.as_ref()).await
        }
        async fn get_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
            UserStore::get_by_id(self.0.as_ref(), id).await
        }
        async fn create(&self, user: NewUser) -> anyhow::Result<User> {
            UserStore::create(self.0.as_ref(), user).await
        }
        async fn update(&self, user: &User) -> anyhow::Result<()> {
            UserStore::update(self.0.as_ref(), user).await
        }
        async fn delete(&self, _id: i64) -> anyhow::Result<()> {
            anyhow::bail!("delete rejected")
        }
    }

    #[tokio::test]
    async fn delete_user_audits_before_removing_the_user() {
        // The delete path writes its audit entry first, so a failed store
        // delete still leaves the Delete row behind.
        let mem = Arc::new(MemStore::with_users(roster()));
        let audit = LogService::new(mem.clone());
        let service = UserService::new(Arc::new(NoDeleteStore(mem.clone())), audit);

        let err = service.delete_user(1, "Tester").await.unwrap_err();
        assert!(matches!(err, ServiceError::Store(_)));

        let rows = audit_rows(&mem).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].action_type, ActionType::Delete);
        assert_eq!(rows[0].entity_ref, 1);
    }
}
