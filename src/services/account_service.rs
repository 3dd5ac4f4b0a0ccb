use std::sync::Arc;

use serde::Serialize;

use crate::database::models::User;
use crate::database::CredentialStore;
use crate::validation::{self, ReminderRequest};

use super::ServiceError;

/// Reminder preferences as shown to the account owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReminderStatus {
    pub reminder: bool,
    pub has_subscription: bool,
}

impl From<&User> for ReminderStatus {
    fn from(user: &User) -> Self {
        Self {
            reminder: user.reminder,
            has_subscription: user.push_subscription.is_some(),
        }
    }
}

/// Per-account settings for the daily reminder
pub struct AccountService {
    users: Arc<dyn CredentialStore>,
}

impl AccountService {
    pub fn new(users: Arc<dyn CredentialStore>) -> Self {
        Self { users }
    }

    pub async fn reminder_settings(&self, user_id: i64) -> Result<ReminderStatus, ServiceError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Account not found".to_string()))?;
        Ok(ReminderStatus::from(&user))
    }

    pub async fn update_reminder(
        &self,
        user_id: i64,
        request: ReminderRequest,
    ) -> Result<ReminderStatus, ServiceError> {
        let settings = validation::reminder(request)?;
        let user = self
            .users
            .update_reminder(user_id, settings.reminder, settings.subscription)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Account not found".to_string()))?;

        tracing::info!("User {} set reminder to {}", user_id, user.reminder);
        Ok(ReminderStatus::from(&user))
    }
}
