use std::sync::Arc;

use crate::database::models::DiaryEntry;
use crate::database::EntryStore;
use crate::validation::{self, EntryRequest};

use super::ServiceError;

const ENTRY_NOT_FOUND: &str = "Diary entry not found";

/// Ownership-scoped CRUD over diary entries.
///
/// A foreign entry is reported exactly like a missing one, so callers cannot
/// discover which ids exist.
pub struct EntryService {
    entries: Arc<dyn EntryStore>,
}

impl EntryService {
    pub fn new(entries: Arc<dyn EntryStore>) -> Self {
        Self { entries }
    }

    /// All entries of `user_id`, newest first. Having none is `NotFound`.
    pub async fn list(&self, user_id: i64) -> Result<Vec<DiaryEntry>, ServiceError> {
        let entries = self.entries.list_by_owner(user_id).await?;
        if entries.is_empty() {
            return Err(ServiceError::NotFound("You have no diary entries yet".to_string()));
        }
        Ok(entries)
    }

    pub async fn create(&self, user_id: i64, request: EntryRequest) -> Result<DiaryEntry, ServiceError> {
        let draft = validation::entry(request)?;
        let entry = self.entries.insert_entry(user_id, draft).await?;
        tracing::debug!("User {} created entry {}", user_id, entry.id);
        Ok(entry)
    }

    pub async fn get(&self, user_id: i64, id: i64) -> Result<DiaryEntry, ServiceError> {
        self.entries
            .find_by_id_and_owner(id, user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(ENTRY_NOT_FOUND.to_string()))
    }

    pub async fn update(&self, user_id: i64, id: i64, request: EntryRequest) -> Result<DiaryEntry, ServiceError> {
        let draft = validation::entry(request)?;
        self.entries
            .update_entry(id, user_id, draft)
            .await?
            .ok_or_else(|| ServiceError::NotFound(ENTRY_NOT_FOUND.to_string()))
    }

    pub async fn delete(&self, user_id: i64, id: i64) -> Result<(), ServiceError> {
        if self.entries.delete_entry(id, user_id).await? {
            tracing::debug!("User {} deleted entry {}", user_id, id);
            Ok(())
        } else {
            Err(ServiceError::NotFound(ENTRY_NOT_FOUND.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    fn request(title: &str, body: &str) -> EntryRequest {
        EntryRequest {
            title: Some(title.to_string()),
            body: Some(body.to_string()),
        }
    }

    #[tokio::test]
    async fn empty_diary_is_not_found() {
        let service = EntryService::new(Arc::new(MemoryStore::new()));
        assert!(matches!(service.list(1).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let service = EntryService::new(Arc::new(MemoryStore::new()));
        let created = service.create(1, request("Day one", "Started a diary.")).await.unwrap();
        assert_eq!(created.owner_id, 1);

        let fetched = service.get(1, created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(service.get(1, created.id).await.unwrap(), fetched);
        assert!(matches!(service.get(1, created.id + 1).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn foreign_entry_looks_missing() {
        let service = EntryService::new(Arc::new(MemoryStore::new()));
        let theirs = service.create(2, request("Secret", "Not yours.")).await.unwrap();

        assert!(matches!(service.get(1, theirs.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(
            service.update(1, theirs.id, request("Mine now", "Nope")).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(service.delete(1, theirs.id).await, Err(ServiceError::NotFound(_))));
        assert_eq!(service.get(2, theirs.id).await.unwrap().title, "Secret");
    }

    #[tokio::test]
    async fn update_validates_before_lookup() {
        let service = EntryService::new(Arc::new(MemoryStore::new()));
        let err = service.update(1, 999, EntryRequest::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn update_and_delete_own_entry() {
        let service = EntryService::new(Arc::new(MemoryStore::new()));
        let entry = service.create(1, request("Draft", "First take")).await.unwrap();

        let updated = service.update(1, entry.id, request("Final", "Second take")).await.unwrap();
        assert_eq!(updated.id, entry.id);
        assert_eq!(updated.title, "Final");
        assert_eq!(updated.created_at, entry.created_at);

        service.delete(1, entry.id).await.unwrap();
        assert!(matches!(service.get(1, entry.id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn store_outage_is_not_a_miss() {
        let store = MemoryStore::new();
        let service = EntryService::new(Arc::new(store.clone()));
        store.set_offline(true);

        assert!(matches!(service.list(1).await, Err(ServiceError::Store(_))));
        assert!(matches!(service.get(1, 1).await, Err(ServiceError::Store(_))));
    }
}
