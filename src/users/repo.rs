use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::users::repo_types::{NewUser, UserChanges, UserRecord};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated")]
    UniqueViolation,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::UniqueViolation,
            _ => StoreError::Other(e.into()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence contract for user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: NewUser) -> StoreResult<UserRecord>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<UserRecord>>;
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>>;
    async fn update(&self, id: Uuid, changes: UserChanges) -> StoreResult<Option<UserRecord>>;
    async fn delete(&self, id: Uuid) -> StoreResult<Option<UserRecord>>;
    /// All users, newest first.
    async fn list_all(&self) -> StoreResult<Vec<UserRecord>>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: NewUser) -> StoreResult<UserRecord> {
        let row = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (id, email, password_hash, name)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password_hash, name, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, email, password_hash, name, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, email, password_hash, name, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> StoreResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRecord>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                password_hash = COALESCE($3, password_hash),
                updated_at = now()
            WHERE id = $1
            RETURNING id, email, password_hash, name, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.password_hash)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRecord>(
            r#"
            DELETE FROM users
            WHERE id = $1
            RETURNING id, email, password_hash, name, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn list_all(&self) -> StoreResult<Vec<UserRecord>> {
        let rows = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, email, password_hash, name, created_at, updated_at
            FROM users
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
