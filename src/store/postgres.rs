use axum::async_trait;
use sqlx::PgPool;

use super::{LogEntry, LogStore, NewLogEntry, NewUser, User, UserStore};

/// Postgres-backed entity store; the system of record.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn get_all(&self) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, forename, surname, email, is_active, date_of_birth
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, forename, surname, email, is_active, date_of_birth
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(&self, user: NewUser) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (forename, surname, email, is_active, date_of_birth)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, forename, surname, email, is_active, date_of_birth
            "#,
        )
        .bind(user.forename)
        .bind(user.surname)
        .bind(user.email)
        .bind(user.is_active)
        .bind(user.date_of_birth)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn update(&self, user: &User) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET forename = $2, surname = $3, email = $4, is_active = $5, date_of_birth = $6
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.forename)
        .bind(&user.surname)
        .bind(&user.email)
        .bind(user.is_active)
        .bind(user.date_of_birth)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> anyhow::Result<()> {
        sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl LogStore for PgStore {
    async fn get_all(&self) -> anyhow::Result<Vec<LogEntry>> {
        let rows = sqlx::query_as::<_, LogEntry>(
            r#"
            SELECT id, entity_ref, entity_type, action_type, details, "from", "to", by, at
            FROM logs
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_by_id(&self, id: i64) -> anyhow::Result<Option<LogEntry>> {
        let entry = sqlx::query_as::<_, LogEntry>(
            r#"
            SELECT id, entity_ref, entity_type, action_type, details, "from", "to", by, at
            FROM logs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(entry)
    }

    async fn create(&self, entry: NewLogEntry) -> anyhow::Result<LogEntry> {
        let entry = sqlx::query_as::<_, LogEntry>(
            r#"
            INSERT INTO logs (entity_ref, entity_type, action_type, details, "from", "to", by, at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, entity_ref, entity_type, action_type, details, "from", "to", by, at
            "#,
        )
        .bind(entry.entity_ref)
        .bind(entry.entity_type)
        .bind(entry.action_type)
        .bind(entry.details)
        .bind(entry.from)
        .bind(entry.to)
        .bind(entry.by)
        .bind(entry.at)
        .fetch_one(&self.pool)
        .await?;
        Ok(entry)
    }
}
