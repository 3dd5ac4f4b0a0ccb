use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;

/// Registered diary owner as stored in `users`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub reminder: bool,
    /// Web Push subscription as handed over by the browser.
    #[serde(skip_serializing)]
    pub push_subscription: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// Row to insert on signup. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
}
