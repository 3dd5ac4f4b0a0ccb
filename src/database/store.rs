//! Persistence ports consumed by the services.
//!
//! Services only see these traits, so handlers and services can be exercised
//! against [`MemoryStore`](super::memory::MemoryStore) or any other double.

use async_trait::async_trait;
use serde_json::Value;

use super::manager::DatabaseError;
use super::models::{DiaryEntry, EntryDraft, NewUser, User};

/// User records: signup, login lookups and reminder settings.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Cheap connectivity check for `/health`.
    async fn ping(&self) -> Result<(), DatabaseError>;

    /// `email` must already be normalized.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError>;

    /// Fails with [`DatabaseError::Conflict`] when the email is taken.
    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError>;

    /// Returns `None` when no user has this id.
    async fn update_reminder(
        &self,
        id: i64,
        reminder: bool,
        subscription: Option<Value>,
    ) -> Result<Option<User>, DatabaseError>;

    /// Users with `reminder = true`.
    async fn list_reminder_subscribers(&self) -> Result<Vec<User>, DatabaseError>;
}

/// Diary entries. Every lookup and mutation is scoped by owner.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Newest first.
    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<DiaryEntry>, DatabaseError>;

    async fn insert_entry(&self, owner_id: i64, draft: EntryDraft) -> Result<DiaryEntry, DatabaseError>;

    async fn find_by_id_and_owner(&self, id: i64, owner_id: i64) -> Result<Option<DiaryEntry>, DatabaseError>;

    /// `None` when the entry is missing or belongs to someone else.
    async fn update_entry(
        &self,
        id: i64,
        owner_id: i64,
        draft: EntryDraft,
    ) -> Result<Option<DiaryEntry>, DatabaseError>;

    /// `false` when the entry is missing or belongs to someone else.
    async fn delete_entry(&self, id: i64, owner_id: i64) -> Result<bool, DatabaseError>;
}
