use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Diary entry as stored in `diaries`. `owner_id` never changes after insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct DiaryEntry {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated entry content, used for both create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDraft {
    pub title: String,
    pub body: String,
}
