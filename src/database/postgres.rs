use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use super::manager::{DatabaseError, DatabaseManager};
use super::models::{DiaryEntry, EntryDraft, NewUser, User};
use super::store::{CredentialStore, EntryStore};

const USER_COLUMNS: &str =
    "id, full_name, email, password_hash, reminder, push_subscription, created_at";
const ENTRY_COLUMNS: &str = "id, owner_id, title, body, created_at, updated_at";

/// Postgres-backed implementation of both store ports
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_unique_violation(err: sqlx::Error, what: &str) -> DatabaseError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            DatabaseError::Conflict(format!("{} already exists", what))
        }
        _ => DatabaseError::Sqlx(err),
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (full_name, email, password_hash) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.full_name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "user"))
    }

    async fn update_reminder(
        &self,
        id: i64,
        reminder: bool,
        subscription: Option<Value>,
    ) -> Result<Option<User>, DatabaseError> {
        let sql = format!(
            "UPDATE users SET reminder = $2, push_subscription = $3 WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(reminder)
            .bind(subscription)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list_reminder_subscribers(&self) -> Result<Vec<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE reminder = TRUE ORDER BY id", USER_COLUMNS);
        let users = sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?;
        Ok(users)
    }
}

#[async_trait]
impl EntryStore for PgStore {
    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<DiaryEntry>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM diaries WHERE owner_id = $1 ORDER BY created_at DESC, id DESC",
            ENTRY_COLUMNS
        );
        let entries = sqlx::query_as::<_, DiaryEntry>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }

    async fn insert_entry(&self, owner_id: i64, draft: EntryDraft) -> Result<DiaryEntry, DatabaseError> {
        let sql = format!(
            "INSERT INTO diaries (owner_id, title, body) VALUES ($1, $2, $3) RETURNING {}",
            ENTRY_COLUMNS
        );
        let entry = sqlx::query_as::<_, DiaryEntry>(&sql)
            .bind(owner_id)
            .bind(&draft.title)
            .bind(&draft.body)
            .fetch_one(&self.pool)
            .await?;
        Ok(entry)
    }

    async fn find_by_id_and_owner(&self, id: i64, owner_id: i64) -> Result<Option<DiaryEntry>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM diaries WHERE id = $1 AND owner_id = $2",
            ENTRY_COLUMNS
        );
        let entry = sqlx::query_as::<_, DiaryEntry>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entry)
    }

    async fn update_entry(
        &self,
        id: i64,
        owner_id: i64,
        draft: EntryDraft,
    ) -> Result<Option<DiaryEntry>, DatabaseError> {
        let sql = format!(
            "UPDATE diaries SET title = $3, body = $4, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 RETURNING {}",
            ENTRY_COLUMNS
        );
        let entry = sqlx::query_as::<_, DiaryEntry>(&sql)
            .bind(id)
            .bind(owner_id)
            .bind(&draft.title)
            .bind(&draft.body)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entry)
    }

    async fn delete_entry(&self, id: i64, owner_id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM diaries WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
