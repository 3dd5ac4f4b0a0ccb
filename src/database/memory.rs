use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;

use super::manager::DatabaseError;
use super::models::{DiaryEntry, EntryDraft, NewUser, User};
use super::store::{CredentialStore, EntryStore};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    entries: BTreeMap<i64, DiaryEntry>,
    last_user_id: i64,
    last_entry_id: i64,
}

/// In-process store for development runs and tests.
///
/// Cloning shares the same tables. [`MemoryStore::set_offline`] makes every
/// call fail with [`DatabaseError::Unavailable`], standing in for a lost
/// database connection.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    offline: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<(), DatabaseError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(DatabaseError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        self.ensure_online()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        self.ensure_online()?;
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        self.ensure_online()?;
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.email == user.email) {
            return Err(DatabaseError::Conflict("user already exists".to_string()));
        }

        tables.last_user_id += 1;
        let record = User {
            id: tables.last_user_id,
            full_name: user.full_name,
            email: user.email,
            password_hash: user.password_hash,
            reminder: false,
            push_subscription: None,
            created_at: Utc::now(),
        };
        tables.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_reminder(
        &self,
        id: i64,
        reminder: bool,
        subscription: Option<Value>,
    ) -> Result<Option<User>, DatabaseError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;
        Ok(tables.users.get_mut(&id).map(|user| {
            user.reminder = reminder;
            user.push_subscription = subscription;
            user.clone()
        }))
    }

    async fn list_reminder_subscribers(&self) -> Result<Vec<User>, DatabaseError> {
        self.ensure_online()?;
        let tables = self.tables.read().await;
        Ok(tables.users.values().filter(|u| u.reminder).cloned().collect())
    }
}

#[async_trait]
impl EntryStore for MemoryStore {
    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<DiaryEntry>, DatabaseError> {
        self.ensure_online()?;
        let tables = self.tables.read().await;
        // ids grow with insertion time, so reverse id order is newest first
        Ok(tables
            .entries
            .values()
            .rev()
            .filter(|e| e.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn insert_entry(&self, owner_id: i64, draft: EntryDraft) -> Result<DiaryEntry, DatabaseError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;

        tables.last_entry_id += 1;
        let now = Utc::now();
        let entry = DiaryEntry {
            id: tables.last_entry_id,
            owner_id,
            title: draft.title,
            body: draft.body,
            created_at: now,
            updated_at: now,
        };
        tables.entries.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn find_by_id_and_owner(&self, id: i64, owner_id: i64) -> Result<Option<DiaryEntry>, DatabaseError> {
        self.ensure_online()?;
        let tables = self.tables.read().await;
        Ok(tables.entries.get(&id).filter(|e| e.owner_id == owner_id).cloned())
    }

    async fn update_entry(
        &self,
        id: i64,
        owner_id: i64,
        draft: EntryDraft,
    ) -> Result<Option<DiaryEntry>, DatabaseError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;
        Ok(tables
            .entries
            .get_mut(&id)
            .filter(|e| e.owner_id == owner_id)
            .map(|entry| {
                entry.title = draft.title;
                entry.body = draft.body;
                entry.updated_at = Utc::now();
                entry.clone()
            }))
    }

    async fn delete_entry(&self, id: i64, owner_id: i64) -> Result<bool, DatabaseError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;
        let owned = tables.entries.get(&id).is_some_and(|e| e.owner_id == owner_id);
        if owned {
            tables.entries.remove(&id);
        }
        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            full_name: "Ada Lovelace".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
        }
    }

    fn draft(title: &str) -> EntryDraft {
        EntryDraft {
            title: title.to_string(),
            body: "Dear diary".to_string(),
        }
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = MemoryStore::new();
        let first = store.insert_user(new_user("ada@example.com")).await.unwrap();
        assert_eq!(first.id, 1);
        assert!(!first.reminder);

        let err = store.insert_user(new_user("ada@example.com")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));
    }

    #[tokio::test]
    async fn entries_are_scoped_to_owner() {
        let store = MemoryStore::new();
        let mine = store.insert_entry(1, draft("mine")).await.unwrap();
        let theirs = store.insert_entry(2, draft("theirs")).await.unwrap();

        assert!(store.find_by_id_and_owner(mine.id, 1).await.unwrap().is_some());
        assert!(store.find_by_id_and_owner(theirs.id, 1).await.unwrap().is_none());
        assert!(store.update_entry(theirs.id, 1, draft("hijack")).await.unwrap().is_none());
        assert!(!store.delete_entry(theirs.id, 1).await.unwrap());
        assert_eq!(
            store.find_by_id_and_owner(theirs.id, 2).await.unwrap().unwrap().title,
            "theirs"
        );
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = MemoryStore::new();
        store.insert_entry(1, draft("first")).await.unwrap();
        store.insert_entry(1, draft("second")).await.unwrap();

        let titles: Vec<String> = store
            .list_by_owner(1)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn offline_store_fails_every_call() {
        let store = MemoryStore::new();
        store.set_offline(true);
        assert!(matches!(store.ping().await, Err(DatabaseError::Unavailable(_))));
        assert!(matches!(store.list_by_owner(1).await, Err(DatabaseError::Unavailable(_))));

        store.set_offline(false);
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn reminder_subscribers_only() {
        let store = MemoryStore::new();
        let a = store.insert_user(new_user("a@example.com")).await.unwrap();
        store.insert_user(new_user("b@example.com")).await.unwrap();
        store
            .update_reminder(a.id, true, Some(serde_json::json!({"endpoint": "https://push.example/a"})))
            .await
            .unwrap();

        let subscribers = store.list_reminder_subscribers().await.unwrap();
        assert_eq!(subscribers.len(), 1);
        assert_eq!(subscribers[0].email, "a@example.com");
    }
}
